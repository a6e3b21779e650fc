// Copyright 2025 the Lapmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lapmap Geo: geographic value types and camera-to-pixel projection.
//!
//! This crate defines the small, plain-old-data geographic vocabulary used
//! by the session-map overlay:
//!
//! - [`GeoPoint`]: a latitude/longitude pair with an explicit
//!   [`GeoPoint::EMPTY`] sentinel meaning "no position".
//! - [`CameraState`]: the host map widget's current center and zoom,
//!   treated as an opaque projection basis.
//! - [`GeoProjector`]: a per-frame affine Web-Mercator approximation that
//!   maps geographic coordinates to surface pixels without querying the map
//!   widget per point.
//!
//! The projector is deliberately stateless between frames except for its
//! basis: [`GeoProjector::update_camera`] recomputes the basis once per
//! paint cycle and [`GeoProjector::project`] is then a pure affine mapping.
//!
//! This crate is `no_std`.

#![no_std]

mod point;
mod projector;

pub use point::GeoPoint;
pub use projector::{CameraState, GeoProjector, TILE_SIZE};
