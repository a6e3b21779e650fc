// Copyright 2025 the Lapmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory backend that records operations, for tests.

use kurbo::{Affine, Point, Size};
use peniko::Color;

use crate::backend::{
    GlyphId, MarkerPaintDesc, OverlayBackend, OverlayError, PaintId, StrokePaintDesc,
};

/// One recorded draw operation.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum DrawRecord {
    Segment {
        from: Point,
        to: Point,
        from_color: Color,
        to_color: Color,
        paint: PaintId,
    },
    Glyph {
        glyph: GlyphId,
        transform: Affine,
        tint: Color,
    },
    Circle {
        center: Point,
        radius: f64,
        paint: PaintId,
    },
}

/// Trivial backend that records every resource and draw call.
#[derive(Debug, Default)]
pub(crate) struct RecordingBackend {
    next_paint: u32,
    paints_live: Vec<bool>,
    paints_created: usize,
    paints_destroyed: usize,
    stroke_desc: Option<StrokePaintDesc>,
    marker_desc: Option<MarkerPaintDesc>,

    glyphs: Vec<Size>,
    fail_glyphs: bool,

    ops: Vec<DrawRecord>,
    frames_begun: usize,
    frames_ended: usize,
    last_frame_size: Option<Size>,
}

impl RecordingBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent glyph load fail, for asset-error tests.
    pub(crate) fn fail_glyph_loads(&mut self) {
        self.fail_glyphs = true;
    }

    pub(crate) fn glyphs_loaded(&self) -> usize {
        self.glyphs.len()
    }

    pub(crate) fn paints_created(&self) -> usize {
        self.paints_created
    }

    pub(crate) fn paints_destroyed(&self) -> usize {
        self.paints_destroyed
    }

    pub(crate) fn all_paints_released(&self) -> bool {
        self.paints_live.iter().all(|live| !live)
    }

    pub(crate) fn stroke_desc(&self) -> Option<StrokePaintDesc> {
        self.stroke_desc
    }

    pub(crate) fn marker_desc(&self) -> Option<MarkerPaintDesc> {
        self.marker_desc
    }

    pub(crate) fn ops(&self) -> &[DrawRecord] {
        &self.ops
    }

    pub(crate) fn segments(&self) -> Vec<DrawRecord> {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawRecord::Segment { .. }))
            .cloned()
            .collect()
    }

    pub(crate) fn glyph_draws(&self) -> Vec<DrawRecord> {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawRecord::Glyph { .. }))
            .cloned()
            .collect()
    }

    pub(crate) fn circles(&self) -> Vec<DrawRecord> {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawRecord::Circle { .. }))
            .cloned()
            .collect()
    }

    pub(crate) fn frames_begun(&self) -> usize {
        self.frames_begun
    }

    pub(crate) fn frames_ended(&self) -> usize {
        self.frames_ended
    }

    pub(crate) fn last_frame_size(&self) -> Option<Size> {
        self.last_frame_size
    }

    pub(crate) fn clear_ops(&mut self) {
        self.ops.clear();
    }
}

impl OverlayBackend for RecordingBackend {
    fn create_stroke_paint(&mut self, desc: StrokePaintDesc) -> PaintId {
        self.stroke_desc = Some(desc);
        let id = self.next_paint;
        self.next_paint += 1;
        self.paints_live.push(true);
        self.paints_created += 1;
        PaintId(id)
    }

    fn create_marker_paint(&mut self, desc: MarkerPaintDesc) -> PaintId {
        self.marker_desc = Some(desc);
        let id = self.next_paint;
        self.next_paint += 1;
        self.paints_live.push(true);
        self.paints_created += 1;
        PaintId(id)
    }

    fn destroy_paint(&mut self, id: PaintId) {
        if let Some(live) = self.paints_live.get_mut(id.0 as usize)
            && *live
        {
            *live = false;
            self.paints_destroyed += 1;
        }
    }

    fn load_glyph(&mut self, _bytes: &[u8]) -> Result<GlyphId, OverlayError> {
        if self.fail_glyphs {
            return Err(OverlayError::Asset {
                reason: "decode failure injected by test".into(),
            });
        }
        let id = u32::try_from(self.glyphs.len()).expect("test glyph table fits in u32");
        self.glyphs.push(Size::new(512.0, 512.0));
        Ok(GlyphId(id))
    }

    fn glyph_size(&self, id: GlyphId) -> Size {
        self.glyphs
            .get(id.0 as usize)
            .copied()
            .unwrap_or(Size::ZERO)
    }

    fn begin_frame(&mut self, size: Size) {
        self.frames_begun += 1;
        self.last_frame_size = Some(size);
    }

    fn end_frame(&mut self) {
        self.frames_ended += 1;
    }

    fn draw_gradient_segment(
        &mut self,
        from: Point,
        to: Point,
        from_color: Color,
        to_color: Color,
        paint: PaintId,
    ) {
        self.ops.push(DrawRecord::Segment {
            from,
            to,
            from_color,
            to_color,
            paint,
        });
    }

    fn draw_glyph(&mut self, glyph: GlyphId, transform: Affine, tint: Color) {
        self.ops.push(DrawRecord::Glyph {
            glyph,
            transform,
            tint,
        });
    }

    fn draw_circle(&mut self, center: Point, radius: f64, paint: PaintId) {
        self.ops.push(DrawRecord::Circle {
            center,
            radius,
            paint,
        });
    }
}
