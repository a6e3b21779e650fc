// Copyright 2025 the Lapmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::f64::consts::PI;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _; // for `powf`, `tan`, `cos`, `ln`
use kurbo::{Affine, Point, Size};

use crate::point::GeoPoint;

/// Side length in pixels of one Web-Mercator world tile at zoom 0.
pub const TILE_SIZE: f64 = 256.0;

/// Latitude limit of the Web-Mercator projection, in degrees.
const MAX_LATITUDE: f64 = 85.051_13;

/// The host map widget's camera, captured once per paint cycle.
///
/// The camera is an opaque projection basis: the overlay never inspects it
/// beyond handing it to [`GeoProjector::update_camera`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CameraState {
    /// Geographic point currently at the center of the viewport.
    pub target: GeoPoint,
    /// Map zoom level; world pixel extent is `TILE_SIZE * 2^zoom`.
    pub zoom: f64,
}

impl CameraState {
    /// Creates a camera state from a center point and zoom level.
    #[must_use]
    pub const fn new(target: GeoPoint, zoom: f64) -> Self {
        Self { target, zoom }
    }
}

/// Per-frame affine mapping from geographic coordinates to surface pixels.
///
/// The projector recomputes an affine approximation of the map widget's own
/// projection from the camera center and zoom, once per frame, instead of
/// asking the widget to project every point. For the track extents involved
/// here (single sessions, city-scale) this is pixel-identical to the widget
/// projection at the viewport center and indistinguishable at the edges.
///
/// ```
/// use kurbo::Size;
/// use lapmap_geo::{CameraState, GeoPoint, GeoProjector};
///
/// let mut projector = GeoProjector::new();
/// let camera = CameraState::new(GeoPoint::new(48.137, 11.575), 15.0);
/// projector.update_camera(camera, Size::new(800.0, 600.0), 2.0);
///
/// // The camera target lands on the surface center.
/// let center = projector.project(camera.target).unwrap();
/// assert!((center.x - 400.0).abs() < 1e-9);
/// assert!((center.y - 300.0).abs() < 1e-9);
///
/// // The empty sentinel never projects.
/// assert!(projector.project(GeoPoint::EMPTY).is_none());
/// ```
#[derive(Clone, Debug)]
pub struct GeoProjector {
    world_to_surface: Affine,
    surface: Size,
    pixels_per_dip: f64,
}

impl Default for GeoProjector {
    fn default() -> Self {
        Self::new()
    }
}

impl GeoProjector {
    /// Creates a projector with an identity basis.
    ///
    /// Until [`GeoProjector::update_camera`] is called, projections are
    /// defined but meaningless (the basis maps world space 1:1).
    #[must_use]
    pub fn new() -> Self {
        Self {
            world_to_surface: Affine::IDENTITY,
            surface: Size::ZERO,
            pixels_per_dip: 1.0,
        }
    }

    /// Recomputes the projection basis from the widget camera.
    ///
    /// `surface` is the overlay surface size in device pixels and
    /// `pixels_per_dip` the device-pixel count per device-independent unit.
    /// The camera target maps to the surface center. A degenerate camera
    /// (empty target, zero surface) yields a degenerate but defined basis.
    pub fn update_camera(&mut self, camera: CameraState, surface: Size, pixels_per_dip: f64) {
        self.surface = surface;
        self.pixels_per_dip = pixels_per_dip;

        let Some(center_world) = world_coords(camera.target) else {
            self.world_to_surface = Affine::IDENTITY;
            return;
        };

        let scale = TILE_SIZE * 2.0_f64.powf(camera.zoom);
        let surface_center = Point::new(surface.width / 2.0, surface.height / 2.0);

        // World → surface: shift the camera target to the world origin,
        // scale to pixels, then translate onto the surface center.
        self.world_to_surface = Affine::translate(surface_center.to_vec2())
            * Affine::scale(scale)
            * Affine::translate(-center_world.to_vec2());
    }

    /// Projects a geographic point onto the surface.
    ///
    /// Returns `None` for [`GeoPoint::EMPTY`] (or any non-finite
    /// coordinate); an empty position never maps to a computed pixel.
    #[must_use]
    pub fn project(&self, point: GeoPoint) -> Option<Point> {
        let world = world_coords(point)?;
        Some(self.world_to_surface * world)
    }

    /// Converts a length in device-independent units to device pixels.
    #[must_use]
    pub fn dips_to_pixels(&self, dips: f64) -> f64 {
        dips * self.pixels_per_dip
    }

    /// Returns the surface size the basis was computed for.
    #[must_use]
    pub fn surface(&self) -> Size {
        self.surface
    }
}

/// Normalized Web-Mercator world coordinates in `[0, 1] x [0, 1]`.
///
/// Latitude is clamped to the Mercator domain so polar coordinates stay
/// finite. Returns `None` for the empty sentinel.
fn world_coords(point: GeoPoint) -> Option<Point> {
    if point.is_empty() {
        return None;
    }
    let lat = point.latitude.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (point.longitude + 180.0) / 360.0;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0;
    Some(Point::new(x, y))
}
