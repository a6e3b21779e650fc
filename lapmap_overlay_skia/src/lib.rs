// Copyright 2025 the Lapmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Skia backend implementation of the `lapmap_overlay` drawing seam.
//!
//! This crate provides a thin adapter that maps the backend-agnostic
//! overlay operations defined in `lapmap_overlay` onto Skia, using the
//! `skia-safe` wrapper crate. Frames are recorded into an offscreen
//! [`skia_safe::Picture`]; the host widget blits the finished picture onto
//! its surface, so a frame abandoned mid-recording never reaches the
//! screen.

use core::fmt;

use kurbo::{Affine, Point, Size};
use lapmap_overlay::{
    GlyphId, MarkerPaintDesc, OverlayBackend, OverlayError, PaintId, StrokePaintDesc,
};
use skia_safe as sk;

/// Marker glyph assets are authored on a 512-unit canvas.
const GLYPH_CANVAS: f32 = 512.0;

/// Embedded start-marker glyph (stopwatch).
pub const START_MARKER_SVG: &[u8] = include_bytes!("../assets/start_marker.svg");

/// Embedded end-marker glyph (finish flag).
pub const END_MARKER_SVG: &[u8] = include_bytes!("../assets/end_marker.svg");

/// Skia-backed implementation of the overlay backend.
///
/// Owns resource tables that mirror the handle-based resources in
/// `lapmap_overlay` and records draw operations into a Skia picture per
/// frame.
pub struct SkiaOverlayBackend {
    paints: Vec<Option<sk::Paint>>,
    glyphs: Vec<Option<GlyphEntry>>,
    recorder: Option<sk::PictureRecorder>,
    picture: Option<sk::Picture>,
}

struct GlyphEntry {
    picture: sk::Picture,
    size: Size,
}

impl fmt::Debug for SkiaOverlayBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SkiaOverlayBackend { .. }")
    }
}

impl Default for SkiaOverlayBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SkiaOverlayBackend {
    /// Creates a backend with empty resource tables and no active frame.
    #[must_use]
    pub fn new() -> Self {
        Self {
            paints: Vec::new(),
            glyphs: Vec::new(),
            recorder: None,
            picture: None,
        }
    }

    /// The most recently committed frame, if any.
    ///
    /// The host draws this onto its surface after each committed paint
    /// cycle; it stays valid until the next [`OverlayBackend::end_frame`].
    #[must_use]
    pub fn finished_picture(&self) -> Option<&sk::Picture> {
        self.picture.as_ref()
    }

    fn store_paint(&mut self, paint: sk::Paint) -> PaintId {
        let id = u32::try_from(self.paints.len())
            .expect("SkiaOverlayBackend: too many paints for u32 PaintId");
        self.paints.push(Some(paint));
        PaintId(id)
    }
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "Skia APIs consume f32; truncation from f64 geometry is acceptable"
)]
fn f64_to_f32(v: f64) -> f32 {
    v as f32
}

fn affine_to_matrix(xf: Affine) -> sk::Matrix {
    let a = xf.as_coeffs();
    // kurbo::Affine stores [a, b, c, d, e, f] as:
    // [sx, ky, kx, sy, tx, ty] in row-major form:
    // [a c e]
    // [b d f]
    // [0 0 1]
    //
    // Skia uses:
    // [sx kx tx]
    // [ky sy ty]
    // [p0 p1 p2]
    sk::Matrix::new_all(
        f64_to_f32(a[0]),
        f64_to_f32(a[2]),
        f64_to_f32(a[4]),
        f64_to_f32(a[1]),
        f64_to_f32(a[3]),
        f64_to_f32(a[5]),
        0.0,
        0.0,
        1.0,
    )
}

fn color_to_sk_color(color: peniko::Color) -> sk::Color {
    let rgba = color.to_rgba8();
    sk::Color::from_argb(rgba.a, rgba.r, rgba.g, rgba.b)
}

fn point_to_sk_point(point: Point) -> sk::Point {
    sk::Point::new(f64_to_f32(point.x), f64_to_f32(point.y))
}

impl OverlayBackend for SkiaOverlayBackend {
    fn create_stroke_paint(&mut self, desc: StrokePaintDesc) -> PaintId {
        let mut paint = sk::Paint::default();
        paint.set_anti_alias(true);
        paint.set_style(sk::PaintStyle::Stroke);
        paint.set_stroke_width(f64_to_f32(desc.width));
        paint.set_stroke_cap(sk::PaintCap::Butt);
        if desc.blur_sigma > 0.0
            && let Some(filter) =
                sk::MaskFilter::blur(sk::BlurStyle::Solid, f64_to_f32(desc.blur_sigma), None)
        {
            paint.set_mask_filter(filter);
        }
        self.store_paint(paint)
    }

    fn create_marker_paint(&mut self, desc: MarkerPaintDesc) -> PaintId {
        let mut paint = sk::Paint::default();
        paint.set_anti_alias(true);
        paint.set_style(sk::PaintStyle::Stroke);
        paint.set_stroke_width(f64_to_f32(desc.width));
        paint.set_color(color_to_sk_color(desc.color));
        self.store_paint(paint)
    }

    fn destroy_paint(&mut self, id: PaintId) {
        if let Some(slot) = self.paints.get_mut(id.0 as usize) {
            *slot = None;
        }
    }

    fn load_glyph(&mut self, bytes: &[u8]) -> Result<GlyphId, OverlayError> {
        let font_mgr = sk::FontMgr::new();
        let mut dom = sk::svg::Dom::from_bytes(bytes, font_mgr).map_err(|err| {
            OverlayError::Asset {
                reason: err.to_string(),
            }
        })?;
        dom.set_container_size((GLYPH_CANVAS, GLYPH_CANVAS));

        // Render the DOM once into a reusable picture; per-draw tinting
        // happens through a color filter, never by re-rendering the SVG.
        let mut recorder = sk::PictureRecorder::new();
        let cull = sk::Rect::new(0.0, 0.0, GLYPH_CANVAS, GLYPH_CANVAS);
        let canvas = recorder.begin_recording(cull, false);
        dom.render(canvas);
        let picture =
            recorder
                .finish_recording_as_picture(None)
                .ok_or_else(|| OverlayError::Asset {
                    reason: "empty glyph recording".into(),
                })?;

        let id = u32::try_from(self.glyphs.len())
            .expect("SkiaOverlayBackend: too many glyphs for u32 GlyphId");
        self.glyphs.push(Some(GlyphEntry {
            picture,
            size: Size::new(f64::from(GLYPH_CANVAS), f64::from(GLYPH_CANVAS)),
        }));
        Ok(GlyphId(id))
    }

    fn glyph_size(&self, id: GlyphId) -> Size {
        self.glyphs
            .get(id.0 as usize)
            .and_then(|slot| slot.as_ref())
            .map_or(Size::ZERO, |entry| entry.size)
    }

    fn begin_frame(&mut self, size: Size) {
        let mut recorder = sk::PictureRecorder::new();
        let cull = sk::Rect::new(0.0, 0.0, f64_to_f32(size.width), f64_to_f32(size.height));
        recorder.begin_recording(cull, false);
        self.recorder = Some(recorder);
    }

    fn end_frame(&mut self) {
        if let Some(mut recorder) = self.recorder.take() {
            self.picture = recorder.finish_recording_as_picture(None);
        }
    }

    fn draw_gradient_segment(
        &mut self,
        from: Point,
        to: Point,
        from_color: peniko::Color,
        to_color: peniko::Color,
        paint: PaintId,
    ) {
        let Some(Some(base)) = self.paints.get(paint.0 as usize) else {
            return;
        };
        let Some(canvas) = self.recorder.as_mut().and_then(|r| r.recording_canvas()) else {
            return;
        };

        let mut paint = base.clone();
        let colors = [color_to_sk_color(from_color), color_to_sk_color(to_color)];
        if let Some(shader) = sk::Shader::linear_gradient(
            (point_to_sk_point(from), point_to_sk_point(to)),
            sk::gradient_shader::GradientShaderColors::Colors(&colors),
            None,
            sk::TileMode::Clamp,
            None,
            None,
        ) {
            paint.set_shader(shader);
        }

        canvas.draw_line(point_to_sk_point(from), point_to_sk_point(to), &paint);
    }

    fn draw_glyph(&mut self, glyph: GlyphId, transform: Affine, tint: peniko::Color) {
        let Some(Some(entry)) = self.glyphs.get(glyph.0 as usize) else {
            return;
        };
        let Some(canvas) = self.recorder.as_mut().and_then(|r| r.recording_canvas()) else {
            return;
        };

        // SrcIn keeps the glyph's shape and alpha, replacing its color.
        let mut paint = sk::Paint::default();
        paint.set_anti_alias(true);
        if let Some(filter) =
            sk::color_filters::blend(color_to_sk_color(tint), sk::BlendMode::SrcIn)
        {
            paint.set_color_filter(filter);
        }

        let matrix = affine_to_matrix(transform);
        canvas.draw_picture(&entry.picture, Some(&matrix), Some(&paint));
    }

    fn draw_circle(&mut self, center: Point, radius: f64, paint: PaintId) {
        let Some(Some(paint)) = self.paints.get(paint.0 as usize) else {
            return;
        };
        let Some(canvas) = self.recorder.as_mut().and_then(|r| r.recording_canvas()) else {
            return;
        };

        canvas.draw_circle(point_to_sk_point(center), f64_to_f32(radius), paint);
    }
}
