// Copyright 2025 the Lapmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::time::Duration;

use lapmap_geo::GeoPoint;

use crate::point::SessionPoint;
use crate::track::SessionTrack;

/// Aggregate a session-map view binds to.
///
/// Owns the recorded [`SessionTrack`] plus the viewport region spanning it
/// (top-right / bottom-left corners and center) and the total duration. The
/// region is computed once from the points present at construction; live
/// appends extend the track and the duration but deliberately do not move
/// the region, so a recording view does not re-fit the camera on every fix.
#[derive(Debug)]
pub struct SessionMapInfo {
    track: SessionTrack,
    top_right: GeoPoint,
    bottom_left: GeoPoint,
    center: GeoPoint,
}

impl SessionMapInfo {
    /// Builds the aggregate from an ordered point sequence.
    ///
    /// Empty positions are excluded from the region computation. With no
    /// usable position the region corners stay [`GeoPoint::EMPTY`].
    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = SessionPoint>) -> Self {
        let track = SessionTrack::from_points(points);
        let (top_right, bottom_left, center) = compute_region(&track);
        Self {
            track,
            top_right,
            bottom_left,
            center,
        }
    }

    /// Creates an empty aggregate for a recording that starts from scratch.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_points([])
    }

    /// The recorded point sequence.
    #[must_use]
    pub fn track(&self) -> &SessionTrack {
        &self.track
    }

    /// North-east corner of the region, or [`GeoPoint::EMPTY`].
    #[must_use]
    pub fn top_right(&self) -> GeoPoint {
        self.top_right
    }

    /// South-west corner of the region, or [`GeoPoint::EMPTY`].
    #[must_use]
    pub fn bottom_left(&self) -> GeoPoint {
        self.bottom_left
    }

    /// Center of the region, or [`GeoPoint::EMPTY`].
    #[must_use]
    pub fn center(&self) -> GeoPoint {
        self.center
    }

    /// Total elapsed duration, i.e. the last point's time offset.
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.track.last().map_or(Duration::ZERO, |p| p.time)
    }
}

fn compute_region(track: &SessionTrack) -> (GeoPoint, GeoPoint, GeoPoint) {
    let points = track.read();
    let mut bounds: Option<(f64, f64, f64, f64)> = None;

    for point in points.iter() {
        if point.position.is_empty() {
            continue;
        }
        let (lat, lon) = (point.position.latitude, point.position.longitude);
        bounds = Some(match bounds {
            None => (lat, lon, lat, lon),
            Some((min_lat, min_lon, max_lat, max_lon)) => (
                min_lat.min(lat),
                min_lon.min(lon),
                max_lat.max(lat),
                max_lon.max(lon),
            ),
        });
    }

    match bounds {
        Some((min_lat, min_lon, max_lat, max_lon)) => (
            GeoPoint::new(max_lat, max_lon),
            GeoPoint::new(min_lat, min_lon),
            GeoPoint::new((min_lat + max_lat) / 2.0, (min_lon + max_lon) / 2.0),
        ),
        None => (GeoPoint::EMPTY, GeoPoint::EMPTY, GeoPoint::EMPTY),
    }
}
