// Copyright 2025 the Lapmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use peniko::Color;

use crate::backend::{
    GlyphId, MarkerPaintDesc, OverlayBackend, OverlayError, PaintId, StrokePaintDesc,
};

/// Solid blur applied to the gradient stroke, in device pixels.
const STROKE_BLUR_SIGMA: f64 = 2.0;

/// Position-marker stroke width relative to the path thickness.
const MARKER_WIDTH_FACTOR: f64 = 1.5;

/// Owns the transient drawing resources of one paint cycle.
///
/// The two marker glyphs are decoded once at construction and live for the
/// lifetime of the overlay. The two paints are epoch-scoped:
/// [`RenderResources::ensure`] creates them lazily at most once per epoch,
/// and [`RenderResources::release`] destroys them and ends the epoch. The
/// controller calls `release` unconditionally before committing a frame,
/// so no native paint handle survives across re-entrant invalidations.
#[derive(Debug)]
pub struct RenderResources {
    start_glyph: GlyphId,
    end_glyph: GlyphId,
    stroke_paint: Option<PaintId>,
    marker_paint: Option<PaintId>,
}

impl RenderResources {
    /// Decodes the start/end marker glyphs from embedded asset bytes.
    ///
    /// A decode failure is fatal for the overlay component and is returned
    /// here rather than surfacing mid-frame.
    pub fn new<B: OverlayBackend>(
        backend: &mut B,
        start_glyph: &[u8],
        end_glyph: &[u8],
    ) -> Result<Self, OverlayError> {
        let start_glyph = backend.load_glyph(start_glyph)?;
        let end_glyph = backend.load_glyph(end_glyph)?;
        Ok(Self {
            start_glyph,
            end_glyph,
            stroke_paint: None,
            marker_paint: None,
        })
    }

    /// Lazily creates the stroke and marker paints for the current epoch.
    ///
    /// `thickness_dips` is the configured path thickness in device-
    /// independent units; `pixels_per_dip` converts it to device pixels.
    /// Calling `ensure` again within the same epoch is a no-op, so a
    /// thickness change takes effect at the next epoch.
    pub fn ensure<B: OverlayBackend>(
        &mut self,
        backend: &mut B,
        thickness_dips: f64,
        pixels_per_dip: f64,
    ) {
        if self.stroke_paint.is_some() {
            return;
        }

        self.stroke_paint = Some(backend.create_stroke_paint(StrokePaintDesc {
            width: thickness_dips * pixels_per_dip,
            blur_sigma: STROKE_BLUR_SIGMA,
        }));
        self.marker_paint = Some(backend.create_marker_paint(MarkerPaintDesc {
            color: Color::WHITE,
            width: thickness_dips * MARKER_WIDTH_FACTOR * pixels_per_dip,
        }));
    }

    /// Destroys both paints and ends the epoch. Idempotent.
    pub fn release<B: OverlayBackend>(&mut self, backend: &mut B) {
        if let Some(paint) = self.stroke_paint.take() {
            backend.destroy_paint(paint);
        }
        if let Some(paint) = self.marker_paint.take() {
            backend.destroy_paint(paint);
        }
    }

    /// The gradient stroke paint, if the epoch is live.
    #[must_use]
    pub fn stroke_paint(&self) -> Option<PaintId> {
        self.stroke_paint
    }

    /// The position-marker paint, if the epoch is live.
    #[must_use]
    pub fn marker_paint(&self) -> Option<PaintId> {
        self.marker_paint
    }

    /// The start-marker glyph (immutable for the overlay's lifetime).
    #[must_use]
    pub fn start_glyph(&self) -> GlyphId {
        self.start_glyph
    }

    /// The end-marker glyph (immutable for the overlay's lifetime).
    #[must_use]
    pub fn end_glyph(&self) -> GlyphId {
        self.end_glyph
    }
}
