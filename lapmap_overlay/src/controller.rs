// Copyright 2025 the Lapmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;
use core::time::Duration;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use kurbo::Size;
use lapmap_geo::{CameraState, GeoPoint, GeoProjector};
use lapmap_session::{LocationFix, SessionMapInfo, SessionPoint};
use peniko::Color;
use tracing::debug;

use crate::backend::{OverlayBackend, OverlayError};
use crate::detect::{ChangeDetector, ProjectionSignature};
use crate::render::{PathStyle, RenderFrame, render_path};
use crate::resources::RenderResources;

/// Base layer the host map widget displays under the overlay.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum MapKind {
    /// Vector street map.
    Street,
    /// Aerial imagery.
    #[default]
    Satellite,
    /// Aerial imagery with street labels.
    Hybrid,
}

/// View-level configuration of the overlay.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OverlayConfig {
    /// Base map layer (forwarded to the host widget, not drawn here).
    pub map_kind: MapKind,
    /// Path stroke thickness in device-independent units.
    pub path_thickness_dips: f64,
    /// Live-location mode: show the user's current trace instead of a
    /// replayed recording.
    pub my_location_enabled: bool,
    /// In live mode, whether incoming fixes extend the session route.
    pub route_drawing: bool,
    /// Replay cutoff: only points at or before this offset are drawn.
    pub max_time: Duration,
    /// Optional single tint for the marker glyphs.
    pub info_color: Option<Color>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            map_kind: MapKind::default(),
            path_thickness_dips: 2.0,
            my_location_enabled: false,
            route_drawing: false,
            max_time: Duration::MAX,
            info_color: None,
        }
    }
}

/// One configuration mutation, applied through
/// [`OverlayController::apply`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ConfigChange {
    /// Switch the base map layer.
    MapKind(MapKind),
    /// Change the path stroke thickness (device-independent units).
    PathThickness(f64),
    /// Toggle live-location mode.
    MyLocation(bool),
    /// Toggle route extension from incoming fixes.
    RouteDrawing(bool),
    /// Move the replay cutoff (scrubbing).
    MaxTime(Duration),
    /// Set or clear the marker tint override.
    InfoColor(Option<Color>),
}

/// Why a paint request did not draw.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// No session is bound to the overlay.
    NoSession,
    /// A paint cycle is already running; the request was dropped.
    AlreadyDrawing,
    /// The projection signature matched the previous frame.
    ViewUnchanged,
}

/// Outcome of one paint request.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PaintOutcome {
    /// The frame was drawn and committed.
    Drawn(RenderFrame),
    /// The frame was skipped; the previous picture remains visible.
    Skipped(SkipReason),
}

/// Camera notification from the host map widget.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum CameraEvent {
    /// The camera came to rest.
    Idled(CameraState),
    /// The camera started moving; `is_gesture` is `true` for user pans.
    MoveStarted {
        /// Whether the move was user-initiated.
        is_gesture: bool,
    },
    /// The user tapped the my-location button.
    MyLocationButtonClicked,
}

/// What the host should do after a location fix was handled.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct LocationOutcome {
    /// The overlay content changed; request a repaint.
    pub needs_repaint: bool,
    /// Move the camera here (follow mode), or leave it alone.
    pub recenter: Option<GeoPoint>,
}

/// Maps a location fix to the path color at that point.
pub trait PointColorSource: Send {
    /// Color of the path at this fix.
    fn color_for(&self, fix: &LocationFix) -> Color;
}

/// Constant path color.
#[derive(Copy, Clone, Debug)]
pub struct SolidColorSource {
    color: Color,
}

impl SolidColorSource {
    /// Creates a source that always yields `color`.
    #[must_use]
    pub const fn new(color: Color) -> Self {
        Self { color }
    }
}

impl PointColorSource for SolidColorSource {
    fn color_for(&self, _fix: &LocationFix) -> Color {
        self.color
    }
}

/// Path color interpolated from ground speed.
#[derive(Copy, Clone, Debug)]
pub struct SpeedColorSource {
    slow: Color,
    fast: Color,
    /// Speed at which the color saturates to `fast`, in m/s.
    max_speed: f64,
}

impl SpeedColorSource {
    /// Creates a source ramping from `slow` at standstill to `fast` at
    /// `max_speed` meters per second.
    #[must_use]
    pub const fn new(slow: Color, fast: Color, max_speed: f64) -> Self {
        Self {
            slow,
            fast,
            max_speed,
        }
    }
}

impl PointColorSource for SpeedColorSource {
    fn color_for(&self, fix: &LocationFix) -> Color {
        let t = if self.max_speed > 0.0 {
            (fix.speed / self.max_speed).clamp(0.0, 1.0) as f32
        } else {
            1.0
        };
        let a = self.slow.components;
        let b = self.fast.components;
        Color::new([
            a[0] + (b[0] - a[0]) * t,
            a[1] + (b[1] - a[1]) * t,
            a[2] + (b[2] - a[2]) * t,
            a[3] + (b[3] - a[3]) * t,
        ])
    }
}

/// Resets the drawing flag when a paint cycle unwinds.
struct DrawGuard<'a>(&'a AtomicBool);

impl Drop for DrawGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Orchestrates the overlay: owns the projector, the change detector, the
/// resources, and the bound session, and turns host events into paint
/// cycles.
///
/// Paint requests are serialized, not queued: a request arriving while a
/// cycle runs is dropped ([`SkipReason::AlreadyDrawing`]), because the
/// running cycle is already drawing the current state. Events that change
/// what a frame would show (scrubbing, thickness, appended fixes) raise a
/// *force* flag that overrides the change detector exactly once.
pub struct OverlayController {
    config: OverlayConfig,
    session: Option<Arc<SessionMapInfo>>,
    projector: GeoProjector,
    detector: ChangeDetector,
    resources: RenderResources,
    point_color: Box<dyn PointColorSource>,
    display_scale: f64,
    camera: Option<CameraState>,
    follow_location: bool,
    drawing: AtomicBool,
    force: AtomicBool,
}

impl fmt::Debug for OverlayController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayController")
            .field("config", &self.config)
            .field("has_session", &self.session.is_some())
            .field("follow_location", &self.follow_location)
            .finish_non_exhaustive()
    }
}

impl OverlayController {
    /// Creates the controller and decodes the marker glyphs.
    ///
    /// `display_scale` is the device-pixel count per device-independent
    /// unit; `point_color` colors fixes appended in live mode.
    pub fn new<B: OverlayBackend>(
        backend: &mut B,
        config: OverlayConfig,
        display_scale: f64,
        point_color: Box<dyn PointColorSource>,
        start_glyph: &[u8],
        end_glyph: &[u8],
    ) -> Result<Self, OverlayError> {
        let resources = RenderResources::new(backend, start_glyph, end_glyph)?;
        Ok(Self {
            config,
            session: None,
            projector: GeoProjector::new(),
            detector: ChangeDetector::new(),
            resources,
            point_color,
            display_scale,
            camera: None,
            follow_location: false,
            drawing: AtomicBool::new(false),
            force: AtomicBool::new(false),
        })
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// The bound session, if any.
    #[must_use]
    pub fn session(&self) -> Option<&Arc<SessionMapInfo>> {
        self.session.as_ref()
    }

    /// Binds (or unbinds) the session to draw.
    ///
    /// Resets the change detector, snaps the replay cutoff to the session's
    /// full duration, and forces the next frame.
    pub fn set_session(&mut self, session: Option<Arc<SessionMapInfo>>) {
        self.config.max_time = session
            .as_ref()
            .map_or(Duration::MAX, |info| info.total_duration());
        self.session = session;
        self.detector.reset();
        self.force.store(true, Ordering::Release);
    }

    /// Applies one configuration change.
    ///
    /// Changes that alter frame content force the next paint cycle past the
    /// change detector; the base map layer is the host widget's concern and
    /// does not.
    pub fn apply(&mut self, change: ConfigChange) {
        match change {
            ConfigChange::MapKind(kind) => {
                self.config.map_kind = kind;
                return;
            }
            ConfigChange::PathThickness(dips) => self.config.path_thickness_dips = dips,
            ConfigChange::MyLocation(enabled) => self.config.my_location_enabled = enabled,
            ConfigChange::RouteDrawing(enabled) => self.config.route_drawing = enabled,
            ConfigChange::MaxTime(cutoff) => self.config.max_time = cutoff,
            ConfigChange::InfoColor(color) => self.config.info_color = color,
        }
        self.force.store(true, Ordering::Release);
    }

    /// Handles a camera notification. Returns `true` if the host should
    /// request a paint cycle.
    pub fn handle_camera(&mut self, event: CameraEvent) -> bool {
        match event {
            CameraEvent::Idled(camera) => {
                self.camera = Some(camera);
                !self.drawing.load(Ordering::Acquire)
            }
            CameraEvent::MoveStarted { is_gesture } => {
                // A user pan takes over; stop chasing the location.
                if is_gesture {
                    self.follow_location = false;
                }
                false
            }
            CameraEvent::MyLocationButtonClicked => {
                self.follow_location = true;
                false
            }
        }
    }

    /// Handles one location fix.
    ///
    /// In route-drawing mode the fix is appended to the bound session's
    /// track and the next frame is forced. In follow mode the outcome asks
    /// the host to recenter on the fix.
    pub fn handle_location(&mut self, fix: &LocationFix) -> LocationOutcome {
        let mut outcome = LocationOutcome {
            needs_repaint: false,
            recenter: self
                .follow_location
                .then(|| GeoPoint::new(fix.latitude, fix.longitude)),
        };

        if self.config.route_drawing
            && let Some(session) = &self.session
        {
            let point = SessionPoint::new(
                GeoPoint::new(fix.latitude, fix.longitude),
                fix.timestamp,
                fix.altitude,
                fix.speed,
                self.point_color.color_for(fix),
            );
            if session.track().push(point) {
                self.force.store(true, Ordering::Release);
                outcome.needs_repaint = true;
            }
        }

        outcome
    }

    /// The camera stored by the last [`CameraEvent::Idled`].
    #[must_use]
    pub fn last_camera(&self) -> Option<CameraState> {
        self.camera
    }

    /// Runs one paint cycle.
    ///
    /// `surface` is the overlay surface size in device pixels. The cycle
    /// either draws a complete frame (projector update, change detection,
    /// resource epoch, path render, resource release, frame commit) or
    /// skips without touching the visible picture.
    pub fn paint<B: OverlayBackend>(
        &mut self,
        backend: &mut B,
        camera: CameraState,
        surface: Size,
    ) -> PaintOutcome {
        let Some(session) = self.session.clone() else {
            debug!("paint skipped: no session bound");
            return PaintOutcome::Skipped(SkipReason::NoSession);
        };

        if self.drawing.swap(true, Ordering::AcqRel) {
            debug!("paint skipped: cycle already running");
            return PaintOutcome::Skipped(SkipReason::AlreadyDrawing);
        }
        let _guard = DrawGuard(&self.drawing);

        self.camera = Some(camera);
        self.projector
            .update_camera(camera, surface, self.display_scale);

        let signature = ProjectionSignature::capture(
            &self.projector,
            session.center(),
            session.top_right(),
            session.bottom_left(),
        );
        let force = self.force.load(Ordering::Acquire);
        if !self.detector.should_redraw(&signature, force) {
            debug!("paint skipped: view unchanged");
            return PaintOutcome::Skipped(SkipReason::ViewUnchanged);
        }
        self.detector.commit(signature);

        backend.begin_frame(surface);
        self.resources.ensure(
            backend,
            self.config.path_thickness_dips,
            self.display_scale,
        );

        let style = PathStyle {
            live_location: self.config.my_location_enabled,
            route_extending: self.config.route_drawing,
            info_color: self.config.info_color,
        };
        let frame = {
            let points = session.track().read();
            render_path(
                backend,
                &self.resources,
                &points,
                self.config.max_time,
                &self.projector,
                &style,
            )
        };

        // Paints must be gone before the recording is committed.
        self.resources.release(backend);
        backend.end_frame();

        self.force.store(false, Ordering::Release);
        debug!(
            segments = frame.segments_drawn,
            points = frame.points_visited,
            "paint cycle committed"
        );
        PaintOutcome::Drawn(frame)
    }

    #[cfg(test)]
    pub(crate) fn set_drawing_for_test(&self, value: bool) {
        self.drawing.store(value, Ordering::Release);
    }
}
