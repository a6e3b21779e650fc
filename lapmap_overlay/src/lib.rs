// Copyright 2025 the Lapmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lapmap Overlay: the session-map rendering engine.
//!
//! This crate draws a recorded GPS session over an interactive map widget:
//! a time-gradient path of projected track points, start/end marker glyphs,
//! and a live position marker. It is the latency-sensitive core of the
//! application — it runs on every camera-idle and location event — so its
//! design centers on *not* drawing:
//!
//! - The [`ChangeDetector`] compares a [`ProjectionSignature`] of the
//!   current camera basis against the previous frame and skips the paint
//!   cycle when the visible region did not actually change.
//! - The [`OverlayController`] serializes paint requests with a re-entrancy
//!   guard: a request arriving mid-cycle is dropped, never queued.
//! - [`RenderResources`] scopes transient backend paint handles to one
//!   drawing epoch, releasing them unconditionally before a frame's picture
//!   is committed.
//!
//! Drawing itself goes through the [`OverlayBackend`] trait: a small,
//! handle-based seam between the engine and a concrete renderer (see the
//! `lapmap_overlay_skia` crate). Resource IDs are opaque and environment-
//! bound — handles created on one backend must only be used with that
//! backend.
//!
//! # Paint cycle
//!
//! ```text
//! paint request
//!   ├─ no session data ──────────────► skipped (no-op)
//!   ├─ already drawing ──────────────► skipped (dropped, debug log)
//!   ├─ signature unchanged, no force ► skipped (baseline untouched)
//!   └─ otherwise: commit signature → begin frame → ensure resources
//!        → render path + markers → release resources → end frame
//! ```

mod backend;
mod controller;
mod detect;
mod render;
mod resources;

#[cfg(test)]
pub(crate) mod recording;

pub use backend::{GlyphId, MarkerPaintDesc, OverlayBackend, OverlayError, PaintId, StrokePaintDesc};
pub use controller::{
    CameraEvent, ConfigChange, LocationOutcome, MapKind, OverlayConfig, OverlayController,
    PaintOutcome, PointColorSource, SkipReason, SolidColorSource, SpeedColorSource,
};
pub use detect::{ChangeDetector, ProjectionSignature};
pub use render::{PathStyle, RenderFrame, render_path};
pub use resources::RenderResources;
