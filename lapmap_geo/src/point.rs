// Copyright 2025 the Lapmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

/// A geographic coordinate in degrees.
///
/// `GeoPoint` is an immutable value type. The special value
/// [`GeoPoint::EMPTY`] represents "no position": it is never projected and
/// never becomes a line-segment endpoint. Because the sentinel is encoded
/// with NaN coordinates, use [`GeoPoint::is_empty`] rather than `==` to
/// test for it.
#[derive(Copy, Clone, PartialEq)]
pub struct GeoPoint {
    /// Latitude in degrees, positive north.
    pub latitude: f64,
    /// Longitude in degrees, positive east.
    pub longitude: f64,
}

impl GeoPoint {
    /// The "no position" sentinel.
    pub const EMPTY: Self = Self {
        latitude: f64::NAN,
        longitude: f64::NAN,
    };

    /// Creates a point from latitude and longitude in degrees.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns `true` if this point carries no usable position.
    ///
    /// Any non-finite coordinate counts as empty, so values coming out of a
    /// failed sensor read degrade to the sentinel instead of projecting to
    /// a bogus pixel.
    #[must_use]
    pub fn is_empty(self) -> bool {
        !(self.latitude.is_finite() && self.longitude.is_finite())
    }
}

impl fmt::Debug for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("GeoPoint::EMPTY")
        } else {
            write!(f, "GeoPoint({}, {})", self.latitude, self.longitude)
        }
    }
}
