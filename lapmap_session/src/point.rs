// Copyright 2025 the Lapmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::time::Duration;

use lapmap_geo::GeoPoint;
use peniko::Color;

/// One recorded sample of a session.
///
/// A session point pairs a position with its offset since session start and
/// the color the map path takes at that point (typically speed-derived).
/// Elevation and speed ride along for the host's info panels; the renderer
/// itself only consumes position, time, and color.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SessionPoint {
    /// Recorded position; may be [`GeoPoint::EMPTY`] for a dropped fix.
    pub position: GeoPoint,
    /// Offset since session start. Monotonic within a track.
    pub time: Duration,
    /// Elevation in meters above sea level.
    pub elevation: f64,
    /// Ground speed in meters per second.
    pub speed: f64,
    /// Display color of the path at this point.
    pub color: Color,
}

impl SessionPoint {
    /// Creates a session point.
    #[must_use]
    pub const fn new(
        position: GeoPoint,
        time: Duration,
        elevation: f64,
        speed: f64,
        color: Color,
    ) -> Self {
        Self {
            position,
            time,
            elevation,
            speed,
            color,
        }
    }
}
