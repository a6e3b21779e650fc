// Copyright 2025 the Lapmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use crate::point::SessionPoint;

/// Append-only, time-ordered sequence of [`SessionPoint`]s.
///
/// During an active recording new points arrive at the tail from the
/// location callback while the paint callback may be scanning the sequence.
/// Both go through `&self`: appends and reads are serialized on an internal
/// reader-writer lock, so a render pass sees a consistent prefix and an
/// append landing right after its scan began is simply picked up by the
/// next frame.
///
/// Timestamps are monotonic by construction — [`SessionTrack::push`]
/// rejects a point whose time is earlier than the current tail.
#[derive(Debug, Default)]
pub struct SessionTrack {
    points: RwLock<Vec<SessionPoint>>,
}

impl SessionTrack {
    /// Creates an empty track.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a track from an already ordered sequence (a loaded session).
    ///
    /// Out-of-order points are dropped rather than reordered, preserving
    /// the append-only invariant for data read back from storage.
    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = SessionPoint>) -> Self {
        let track = Self::new();
        for point in points {
            track.push(point);
        }
        track
    }

    /// Appends a point at the tail.
    ///
    /// Returns `false` (and drops the point) if its timestamp is earlier
    /// than the last appended point.
    pub fn push(&self, point: SessionPoint) -> bool {
        let mut points = self.points.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(last) = points.last()
            && point.time < last.time
        {
            return false;
        }
        points.push(point);
        true
    }

    /// Takes a read view for one scan.
    ///
    /// The guard blocks appends for its lifetime; callers hold it for a
    /// single synchronous pass and drop it before returning to the event
    /// loop.
    pub fn read(&self) -> RwLockReadGuard<'_, Vec<SessionPoint>> {
        self.points.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of recorded points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns `true` if no points have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// The first recorded point, if any.
    #[must_use]
    pub fn first(&self) -> Option<SessionPoint> {
        self.read().first().copied()
    }

    /// The last recorded point, if any.
    #[must_use]
    pub fn last(&self) -> Option<SessionPoint> {
        self.read().last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::time::Duration;
    use lapmap_geo::GeoPoint;
    use peniko::Color;

    fn point_at(secs: u64) -> SessionPoint {
        SessionPoint::new(
            GeoPoint::new(48.0, 11.0),
            Duration::from_secs(secs),
            0.0,
            0.0,
            Color::from_rgb8(0xff, 0, 0),
        )
    }

    #[test]
    fn appends_in_order() {
        let track = SessionTrack::new();
        assert!(track.push(point_at(0)));
        assert!(track.push(point_at(5)));
        assert!(track.push(point_at(5)));
        assert_eq!(track.len(), 3);
    }

    #[test]
    fn rejects_non_monotonic_timestamp() {
        let track = SessionTrack::new();
        assert!(track.push(point_at(10)));
        assert!(!track.push(point_at(4)));
        assert_eq!(track.len(), 1);
        assert_eq!(track.last().unwrap().time, Duration::from_secs(10));
    }

    #[test]
    fn from_points_drops_out_of_order_input() {
        let track = SessionTrack::from_points([point_at(0), point_at(8), point_at(3)]);
        assert_eq!(track.len(), 2);
    }

    #[test]
    fn read_view_sees_a_consistent_prefix() {
        let track = SessionTrack::new();
        track.push(point_at(0));
        track.push(point_at(1));

        let view = track.read();
        assert_eq!(view.len(), 2);
        assert_eq!(view[1].time, Duration::from_secs(1));
    }

    #[test]
    fn append_from_another_thread() {
        let track = std::sync::Arc::new(SessionTrack::new());
        track.push(point_at(0));

        let writer = std::sync::Arc::clone(&track);
        let handle = std::thread::spawn(move || {
            for t in 1..=100 {
                writer.push(point_at(t));
            }
        });

        // Interleaved reads always observe a monotonic prefix.
        for _ in 0..50 {
            let view = track.read();
            for pair in view.windows(2) {
                assert!(pair[0].time <= pair[1].time);
            }
        }

        handle.join().unwrap();
        assert_eq!(track.len(), 101);
    }
}
