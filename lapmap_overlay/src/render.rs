// Copyright 2025 the Lapmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::time::Duration;

use kurbo::{Affine, Point, Vec2};
use lapmap_geo::GeoProjector;
use lapmap_session::SessionPoint;
use peniko::Color;

use crate::backend::{GlyphId, OverlayBackend};
use crate::resources::RenderResources;

/// Minimum per-axis distance between two drawn path vertices, in
/// device-independent units. Points closer than this to the current anchor
/// are folded into the next segment.
const MIN_SEGMENT_DISTANCE_DIPS: f64 = 4.0;

/// Rendered edge length of the start/end marker glyphs, in
/// device-independent units.
const GLYPH_SIZE_DIPS: f64 = 20.0;

/// Radius of the live position marker, in device-independent units.
const POSITION_MARKER_RADIUS_DIPS: f64 = 3.0;

/// How far the cutoff may sit from the track's end before the path is
/// considered "still moving" and the end marker is withheld.
const END_MARKER_TOLERANCE: Duration = Duration::from_secs(20);

/// Per-frame rendering options, resolved by the controller from its
/// configuration.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PathStyle {
    /// Live-location mode: the track is the user's current trace, not a
    /// replayed recording. Start/end marker glyphs are suppressed.
    pub live_location: bool,
    /// In live mode, whether new fixes are currently extending the route.
    pub route_extending: bool,
    /// Overrides the glyph tint; `None` tints from the track point colors.
    pub info_color: Option<Color>,
}

/// Summary of what one paint cycle actually drew.
///
/// Returned to the controller for logging and surfaced to tests; the
/// backend recording is the authoritative output.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderFrame {
    /// Gradient segments stroked.
    pub segments_drawn: usize,
    /// Track points scanned (those at or before the cutoff).
    pub points_visited: usize,
    /// Whether the start marker glyph was drawn.
    pub start_marker_drawn: bool,
    /// Whether the end marker glyph was drawn.
    pub end_marker_drawn: bool,
    /// Whether the position marker circle was drawn.
    pub position_marker_drawn: bool,
    /// Whether the cutoff sits mid-track (end marker withheld).
    pub still_moving: bool,
}

/// Draws the session path up to `cutoff`, plus its markers.
///
/// The scan walks the time-ordered prefix of `points` at or before the
/// cutoff and maintains a pixel *anchor*: the last vertex actually drawn.
/// A point advances the anchor (emitting one gradient segment from the old
/// anchor) only when it projects to a pixel at least
/// [`MIN_SEGMENT_DISTANCE_DIPS`] away on some axis. Points with an empty
/// position or within the threshold never move the anchor, so GPS jitter
/// and dropped fixes cannot corrupt the path.
///
/// Marker policy, evaluated against the final anchor:
///
/// - replay: start glyph centered on the first anchor; end glyph at the
///   final anchor unless the track end is more than
///   [`END_MARKER_TOLERANCE`] from the cutoff, in which case the position
///   marker circle is drawn instead;
/// - live location: no glyphs; the position marker is drawn unless the
///   route is currently extending (the path tip already is the position).
///
/// Expects a live resource epoch; with no paints created this is a no-op.
pub fn render_path<B: OverlayBackend>(
    backend: &mut B,
    resources: &RenderResources,
    points: &[SessionPoint],
    cutoff: Duration,
    projector: &GeoProjector,
    style: &PathStyle,
) -> RenderFrame {
    let mut frame = RenderFrame::default();

    let (Some(stroke_paint), Some(marker_paint)) =
        (resources.stroke_paint(), resources.marker_paint())
    else {
        return frame;
    };

    let min_distance = projector.dips_to_pixels(MIN_SEGMENT_DISTANCE_DIPS);

    // (pixel, color) of the path head and of the last drawn vertex.
    let mut first: Option<(Point, Color)> = None;
    let mut anchor: Option<(Point, Color)> = None;

    for point in points {
        if point.time > cutoff {
            break;
        }
        frame.points_visited += 1;

        let Some(pixel) = projector.project(point.position) else {
            continue;
        };

        match anchor {
            None => {
                first = Some((pixel, point.color));
                anchor = Some((pixel, point.color));
            }
            Some((from, from_color)) => {
                let delta = pixel - from;
                if delta.x.abs() > min_distance || delta.y.abs() > min_distance {
                    backend.draw_gradient_segment(
                        from,
                        pixel,
                        from_color,
                        point.color,
                        stroke_paint,
                    );
                    frame.segments_drawn += 1;
                    anchor = Some((pixel, point.color));
                }
            }
        }
    }

    let (Some((first_pixel, first_color)), Some((last_pixel, last_color))) = (first, anchor) else {
        return frame;
    };

    frame.still_moving = points
        .last()
        .is_some_and(|last| last.time.abs_diff(cutoff) > END_MARKER_TOLERANCE);

    if style.live_location {
        if !style.route_extending {
            backend.draw_circle(
                last_pixel,
                projector.dips_to_pixels(POSITION_MARKER_RADIUS_DIPS),
                marker_paint,
            );
            frame.position_marker_drawn = true;
        }
        return frame;
    }

    let size = projector.dips_to_pixels(GLYPH_SIZE_DIPS);

    draw_marker_glyph(
        backend,
        resources.start_glyph(),
        Point::new(first_pixel.x - size / 2.0, first_pixel.y - size / 2.0),
        size,
        style.info_color.unwrap_or(first_color),
    );
    frame.start_marker_drawn = true;

    if frame.still_moving {
        backend.draw_circle(
            last_pixel,
            projector.dips_to_pixels(POSITION_MARKER_RADIUS_DIPS),
            marker_paint,
        );
        frame.position_marker_drawn = true;
    } else {
        // Flag pole planted on the point: the glyph sits above it.
        draw_marker_glyph(
            backend,
            resources.end_glyph(),
            Point::new(last_pixel.x, last_pixel.y - size),
            size,
            style.info_color.unwrap_or(last_color),
        );
        frame.end_marker_drawn = true;
    }

    frame
}

/// Draws a glyph scaled to fit a `size`-sided square at `origin`.
fn draw_marker_glyph<B: OverlayBackend>(
    backend: &mut B,
    glyph: GlyphId,
    origin: Point,
    size: f64,
    tint: Color,
) {
    let natural = backend.glyph_size(glyph);
    let longest = natural.width.max(natural.height);
    let scale = if longest > 0.0 { size / longest } else { 1.0 };
    let transform = Affine::translate(Vec2::new(origin.x, origin.y)) * Affine::scale(scale);
    backend.draw_glyph(glyph, transform, tint);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{DrawRecord, RecordingBackend};
    use kurbo::Size;
    use lapmap_geo::{CameraState, GeoPoint};

    const RED: Color = Color::from_rgb8(0xff, 0, 0);
    const GREEN: Color = Color::from_rgb8(0, 0xff, 0);
    const BLUE: Color = Color::from_rgb8(0, 0, 0xff);

    fn point(lat: f64, lon: f64, secs: u64, color: Color) -> SessionPoint {
        SessionPoint::new(GeoPoint::new(lat, lon), Duration::from_secs(secs), 0.0, 0.0, color)
    }

    /// Three points roughly 1 km apart, well past the 4-dip threshold at
    /// this zoom.
    fn spread_points() -> Vec<SessionPoint> {
        vec![
            point(48.00, 11.00, 0, RED),
            point(48.01, 11.00, 5, GREEN),
            point(48.02, 11.00, 10, BLUE),
        ]
    }

    fn projector() -> GeoProjector {
        let mut p = GeoProjector::new();
        p.update_camera(
            CameraState::new(GeoPoint::new(48.01, 11.00), 15.0),
            Size::new(800.0, 600.0),
            1.0,
        );
        p
    }

    fn ready() -> (RecordingBackend, RenderResources) {
        let mut backend = RecordingBackend::new();
        let mut resources = RenderResources::new(&mut backend, b"start", b"end").unwrap();
        resources.ensure(&mut backend, 2.0, 1.0);
        (backend, resources)
    }

    #[test]
    fn full_replay_draws_segments_and_both_glyphs() {
        let (mut backend, resources) = ready();
        let frame = render_path(
            &mut backend,
            &resources,
            &spread_points(),
            Duration::from_secs(10),
            &projector(),
            &PathStyle::default(),
        );

        assert_eq!(frame.segments_drawn, 2);
        assert_eq!(frame.points_visited, 3);
        assert!(frame.start_marker_drawn);
        assert!(frame.end_marker_drawn);
        assert!(!frame.position_marker_drawn);
        assert!(!frame.still_moving);
        assert_eq!(backend.segments().len(), 2);
        assert_eq!(backend.glyph_draws().len(), 2);
        assert!(backend.circles().is_empty());
    }

    #[test]
    fn cutoff_far_past_track_end_withholds_the_end_marker() {
        let (mut backend, resources) = ready();
        let frame = render_path(
            &mut backend,
            &resources,
            &spread_points(),
            Duration::from_secs(100),
            &projector(),
            &PathStyle::default(),
        );

        assert!(frame.still_moving);
        assert!(frame.start_marker_drawn);
        assert!(!frame.end_marker_drawn);
        assert!(frame.position_marker_drawn);
        assert_eq!(backend.glyph_draws().len(), 1);
        assert_eq!(backend.circles().len(), 1);
    }

    #[test]
    fn cutoff_within_tolerance_of_track_end_keeps_the_end_marker() {
        let (mut backend, resources) = ready();
        // Scrubbed to t=5: the last drawn vertex is the second point, but
        // the track end at t=10 is within 20 s of the cutoff.
        let frame = render_path(
            &mut backend,
            &resources,
            &spread_points(),
            Duration::from_secs(5),
            &projector(),
            &PathStyle::default(),
        );

        assert_eq!(frame.points_visited, 2);
        assert_eq!(frame.segments_drawn, 1);
        assert!(!frame.still_moving);
        assert!(frame.end_marker_drawn);
    }

    #[test]
    fn empty_position_never_advances_the_anchor() {
        let (mut backend, resources) = ready();
        let mut points = spread_points();
        points[1].position = GeoPoint::EMPTY;

        let frame = render_path(
            &mut backend,
            &resources,
            &points,
            Duration::from_secs(10),
            &projector(),
            &PathStyle::default(),
        );

        // One segment, first point straight to the third.
        assert_eq!(frame.segments_drawn, 1);
        assert_eq!(frame.points_visited, 3);
        let p = projector();
        let expected_from = p.project(points[0].position).unwrap();
        let expected_to = p.project(points[2].position).unwrap();
        match &backend.segments()[0] {
            DrawRecord::Segment { from, to, from_color, to_color, .. } => {
                assert_eq!(*from, expected_from);
                assert_eq!(*to, expected_to);
                assert_eq!(*from_color, RED);
                assert_eq!(*to_color, BLUE);
            }
            other => panic!("expected a segment, got {other:?}"),
        }
    }

    #[test]
    fn jitter_below_the_threshold_is_folded_into_one_segment() {
        let (mut backend, resources) = ready();
        // The second point is a few centimeters from the first.
        let points = vec![
            point(48.00, 11.00, 0, RED),
            point(48.000_001, 11.00, 5, GREEN),
            point(48.01, 11.00, 10, BLUE),
        ];

        let frame = render_path(
            &mut backend,
            &resources,
            &points,
            Duration::from_secs(10),
            &projector(),
            &PathStyle::default(),
        );

        assert_eq!(frame.segments_drawn, 1);
        match &backend.segments()[0] {
            DrawRecord::Segment { from_color, to_color, .. } => {
                assert_eq!(*from_color, RED);
                assert_eq!(*to_color, BLUE);
            }
            other => panic!("expected a segment, got {other:?}"),
        }
    }

    #[test]
    fn single_visible_point_draws_markers_but_no_segments() {
        let (mut backend, resources) = ready();
        let points = vec![point(48.00, 11.00, 0, RED)];

        let frame = render_path(
            &mut backend,
            &resources,
            &points,
            Duration::from_secs(0),
            &projector(),
            &PathStyle::default(),
        );

        assert_eq!(frame.segments_drawn, 0);
        assert!(frame.start_marker_drawn);
        assert!(frame.end_marker_drawn);
        assert!(backend.segments().is_empty());
    }

    #[test]
    fn all_empty_positions_draw_nothing() {
        let (mut backend, resources) = ready();
        let mut points = spread_points();
        for p in &mut points {
            p.position = GeoPoint::EMPTY;
        }

        let frame = render_path(
            &mut backend,
            &resources,
            &points,
            Duration::from_secs(10),
            &projector(),
            &PathStyle::default(),
        );

        assert_eq!(frame, RenderFrame {
            points_visited: 3,
            ..RenderFrame::default()
        });
        assert!(backend.ops().is_empty());
    }

    #[test]
    fn info_color_overrides_glyph_tints() {
        let (mut backend, resources) = ready();
        let style = PathStyle {
            info_color: Some(Color::from_rgb8(0x12, 0x34, 0x56)),
            ..PathStyle::default()
        };

        render_path(
            &mut backend,
            &resources,
            &spread_points(),
            Duration::from_secs(10),
            &projector(),
            &style,
        );

        for draw in backend.glyph_draws() {
            match draw {
                DrawRecord::Glyph { tint, .. } => {
                    assert_eq!(tint, Color::from_rgb8(0x12, 0x34, 0x56));
                }
                other => panic!("expected a glyph, got {other:?}"),
            }
        }
    }

    #[test]
    fn glyphs_scale_to_twenty_dips() {
        let (mut backend, resources) = ready();
        render_path(
            &mut backend,
            &resources,
            &spread_points(),
            Duration::from_secs(10),
            &projector(),
            &PathStyle::default(),
        );

        // Natural glyph size in the recording backend is 512; 20 dips at
        // one pixel per dip gives a 20/512 scale.
        match &backend.glyph_draws()[0] {
            DrawRecord::Glyph { transform, .. } => {
                let coeffs = transform.as_coeffs();
                assert!((coeffs[0] - 20.0 / 512.0).abs() < 1e-12);
            }
            other => panic!("expected a glyph, got {other:?}"),
        }
    }

    #[test]
    fn identical_input_renders_identically() {
        let (mut backend, resources) = ready();
        let points = spread_points();
        let cutoff = Duration::from_secs(10);
        let projector = projector();

        let first = render_path(
            &mut backend,
            &resources,
            &points,
            cutoff,
            &projector,
            &PathStyle::default(),
        );
        let first_ops = backend.ops().to_vec();
        backend.clear_ops();

        let second = render_path(
            &mut backend,
            &resources,
            &points,
            cutoff,
            &projector,
            &PathStyle::default(),
        );

        assert_eq!(first, second);
        assert_eq!(first_ops.as_slice(), backend.ops());
    }

    #[test]
    fn live_mode_draws_no_glyphs() {
        let (mut backend, resources) = ready();
        let style = PathStyle {
            live_location: true,
            route_extending: false,
            info_color: None,
        };

        let frame = render_path(
            &mut backend,
            &resources,
            &spread_points(),
            Duration::from_secs(10),
            &projector(),
            &style,
        );

        assert!(!frame.start_marker_drawn);
        assert!(!frame.end_marker_drawn);
        assert!(frame.position_marker_drawn);
        assert!(backend.glyph_draws().is_empty());
        assert_eq!(backend.circles().len(), 1);
    }

    #[test]
    fn live_mode_while_extending_suppresses_the_position_marker() {
        let (mut backend, resources) = ready();
        let style = PathStyle {
            live_location: true,
            route_extending: true,
            info_color: None,
        };

        let frame = render_path(
            &mut backend,
            &resources,
            &spread_points(),
            Duration::from_secs(10),
            &projector(),
            &style,
        );

        assert!(!frame.position_marker_drawn);
        assert!(backend.circles().is_empty());
        assert_eq!(frame.segments_drawn, 2);
    }

    #[test]
    fn position_marker_radius_scales_with_pixel_density() {
        let (mut backend, resources) = ready();
        let mut p = GeoProjector::new();
        p.update_camera(
            CameraState::new(GeoPoint::new(48.01, 11.00), 15.0),
            Size::new(800.0, 600.0),
            3.0,
        );

        render_path(
            &mut backend,
            &resources,
            &spread_points(),
            Duration::from_secs(100),
            &p,
            &PathStyle::default(),
        );

        match &backend.circles()[0] {
            DrawRecord::Circle { radius, .. } => assert_eq!(*radius, 9.0),
            other => panic!("expected a circle, got {other:?}"),
        }
    }
}
