// Copyright 2025 the Lapmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::Point;
use lapmap_geo::{GeoPoint, GeoProjector};

/// Derived, comparable snapshot of the current projection basis.
///
/// The signature captures where the session region lands on the surface:
/// the projected region center plus the squared pixel distance between the
/// projected region corners. Two frames with equal signatures see the same
/// pixels for every track point, so equality is a sufficient condition for
/// the *projection* being unchanged — it is only a *necessary* condition
/// for skipping a redraw, because data or configuration may have changed
/// (the force flag covers those).
///
/// Comparison is bit-exact: the basis is recomputed deterministically from
/// the camera state, so identical cameras produce identical signatures.
/// Signatures are never persisted.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ProjectionSignature {
    /// Projected region center, `None` when the region has no position.
    pub center: Option<Point>,
    /// Squared pixel distance between the projected region corners.
    pub corner_distance_squared: f64,
}

impl ProjectionSignature {
    /// Captures the signature of the current projector basis for a region.
    #[must_use]
    pub fn capture(
        projector: &GeoProjector,
        center: GeoPoint,
        top_right: GeoPoint,
        bottom_left: GeoPoint,
    ) -> Self {
        let corner_distance_squared = match (
            projector.project(top_right),
            projector.project(bottom_left),
        ) {
            (Some(a), Some(b)) => (a - b).hypot2(),
            _ => 0.0,
        };
        Self {
            center: projector.project(center),
            corner_distance_squared,
        }
    }
}

/// Decides whether a paint cycle needs to redraw.
///
/// The detector stores the signature of the last frame that actually drew.
/// The decision ([`ChangeDetector::should_redraw`]) is a pure comparison;
/// the baseline update ([`ChangeDetector::commit`]) is a separate step the
/// controller performs only when the frame proceeds. A skipped frame never
/// silently updates the baseline.
#[derive(Clone, Debug, Default)]
pub struct ChangeDetector {
    previous: Option<ProjectionSignature>,
}

impl ChangeDetector {
    /// Creates a detector with no baseline; the first evaluation always
    /// requests a redraw.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if a redraw is needed.
    ///
    /// The force flag always wins; otherwise the signature must be
    /// pixel-identical to the committed baseline for the frame to skip.
    #[must_use]
    pub fn should_redraw(&self, signature: &ProjectionSignature, force: bool) -> bool {
        force || self.previous.as_ref() != Some(signature)
    }

    /// Stores the new baseline. Call only when the frame proceeds.
    pub fn commit(&mut self, signature: ProjectionSignature) {
        self.previous = Some(signature);
    }

    /// Clears the baseline, e.g. when session data is (re)loaded.
    pub fn reset(&mut self) {
        self.previous = None;
    }
}
