// Copyright 2025 the Lapmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Affine, Point, Size};
use peniko::Color;
use thiserror::Error;

/// Identifier for a paint resource.
///
/// This is a small, opaque handle that is stable for the lifetime of the
/// resource. Paints are created lazily at the start of a drawing epoch and
/// destroyed before the frame is committed, so a given ID never outlives
/// one paint cycle.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PaintId(pub u32);

/// Identifier for a marker glyph resource.
///
/// Glyphs are decoded once at overlay initialization and are immutable for
/// the lifetime of the backend; tinting happens per draw via a color
/// filter, never by mutating the glyph.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct GlyphId(pub u32);

/// Description of the gradient stroke paint used for path segments.
///
/// The paint is antialiased with butt caps; each segment supplies its own
/// two-stop linear gradient at draw time via
/// [`OverlayBackend::draw_gradient_segment`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StrokePaintDesc {
    /// Stroke width in device pixels.
    pub width: f64,
    /// Standard deviation of the solid blur applied to the stroke, in
    /// device pixels. Zero disables the blur.
    pub blur_sigma: f64,
}

/// Description of the solid marker paint (live position circle).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MarkerPaintDesc {
    /// Stroke color.
    pub color: Color,
    /// Stroke width in device pixels.
    pub width: f64,
}

/// Error raised by overlay initialization.
///
/// Rendering itself has no error conditions — skipped frames and empty
/// data are outcomes, not failures — but the overlay cannot exist without
/// its marker glyphs, so asset decoding failures surface here at
/// construction time.
#[derive(Debug, Error)]
pub enum OverlayError {
    /// A marker glyph asset failed to decode.
    #[error("marker glyph failed to decode: {reason}")]
    Asset {
        /// Backend-specific description of the decode failure.
        reason: String,
    },
}

/// Drawing backend the overlay renders through.
///
/// The trait covers the three concerns of one paint cycle:
///
/// - **Resources**: paints and glyphs are handle-based, mirroring native
///   renderer objects. IDs are environment-bound: a handle must only be
///   used with the backend that created it.
/// - **Frames**: [`OverlayBackend::begin_frame`] opens an offscreen
///   recording surface and [`OverlayBackend::end_frame`] commits it — the
///   visible surface is cleared and redrawn from the finished recording in
///   one step, and the recording is disposed. A frame abandoned without
///   `end_frame` is discarded wholesale.
/// - **Draw operations**: the minimal vocabulary the path renderer needs.
///   All coordinates are device pixels on the current frame.
///
/// All methods are synchronous; implementations must leave the surface
/// fully drawn when `end_frame` returns.
pub trait OverlayBackend {
    /// Creates the gradient stroke paint for path segments.
    fn create_stroke_paint(&mut self, desc: StrokePaintDesc) -> PaintId;

    /// Creates the solid marker paint.
    fn create_marker_paint(&mut self, desc: MarkerPaintDesc) -> PaintId;

    /// Destroys a previously created paint.
    ///
    /// Destroying an already destroyed ID is a no-op.
    fn destroy_paint(&mut self, id: PaintId);

    /// Decodes a vector glyph from embedded asset bytes.
    ///
    /// Called once per glyph at overlay initialization; a failure here is
    /// fatal for the component.
    fn load_glyph(&mut self, bytes: &[u8]) -> Result<GlyphId, OverlayError>;

    /// Natural (untransformed) size of a loaded glyph.
    fn glyph_size(&self, id: GlyphId) -> Size;

    /// Opens an offscreen recording surface of the given pixel size.
    fn begin_frame(&mut self, size: Size);

    /// Finalizes the recording and swaps it onto the visible surface.
    fn end_frame(&mut self);

    /// Strokes one path segment with a two-stop linear gradient
    /// (`from_color` at `from`, `to_color` at `to`, clamped at the edges).
    fn draw_gradient_segment(
        &mut self,
        from: Point,
        to: Point,
        from_color: Color,
        to_color: Color,
        paint: PaintId,
    );

    /// Draws a glyph under the given transform, tinted with `tint`.
    fn draw_glyph(&mut self, glyph: GlyphId, transform: Affine, tint: Color);

    /// Strokes a circle with the given paint.
    fn draw_circle(&mut self, center: Point, radius: f64, paint: PaintId);
}
