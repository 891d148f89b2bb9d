use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::error::{Result, RulerError};
use crate::geometry::{ContainerFrame, PointPx};
use crate::logging::{LogLevel, Logger, event_with_fields, json_kv};
use crate::metrics::SessionMetrics;
use crate::pointer::{self, PointerSample};
use crate::surface::{
    LabelShape, LineShape, LineStyle, Orientation, RecordedShape, RectShape, ShapeId,
    SurfaceRenderer,
};
use crate::ticks::{TickWeight, plan_axis};
use crate::units::{DpiProbe, ScaleFactor, Unit, resolve_pixels_per_unit};

/// Fill used for the rule bands and the corner square.
const RULE_BACKGROUND: &str = "#e5e5e5";
/// Tick lengths in pixels for the two minor weights. Major ticks span the
/// full rule band.
const SMALL_TICK_PX: f64 = 4.0;
const MEDIUM_TICK_PX: f64 = 6.0;
/// Offset of the mouse readout box from the pointer.
const READOUT_OFFSET_X: f64 = 12.0;
const READOUT_OFFSET_Y: f64 = 16.0;
/// Inset of tick labels from their tick mark.
const LABEL_INSET_PX: f64 = 2.0;

const LOG_TARGET: &str = "ruler::session";

/// Event streams a session subscribes to on its host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Resize,
    PointerMove,
}

/// Handle to one installed subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Host collaborator wiring resize and pointer-move notifications.
///
/// The session installs exactly one subscription per event kind when it
/// activates and removes exactly those on teardown; the host delivers the
/// actual events by calling [`RulerSession::on_resize`] and
/// [`RulerSession::on_pointer_move`].
pub trait EventSource {
    fn subscribe(&mut self, kind: EventKind) -> Result<SubscriptionId>;
    fn unsubscribe(&mut self, id: SubscriptionId);
}

#[derive(Debug, Default)]
struct LedgerState {
    next_id: u64,
    active: HashMap<u64, EventKind>,
}

/// Shared-handle [`EventSource`] that tracks which subscriptions are live.
///
/// Hosts use it as their wiring record; tests use it to assert that a
/// create/teardown cycle leaves nothing behind.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionLedger {
    inner: Arc<Mutex<LedgerState>>,
}

impl SubscriptionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_count(&self) -> usize {
        self.inner.lock().expect("ledger mutex poisoned").active.len()
    }

    pub fn active_count_of(&self, kind: EventKind) -> usize {
        self.inner
            .lock()
            .expect("ledger mutex poisoned")
            .active
            .values()
            .filter(|k| **k == kind)
            .count()
    }
}

impl EventSource for SubscriptionLedger {
    fn subscribe(&mut self, kind: EventKind) -> Result<SubscriptionId> {
        let mut state = self.inner.lock().expect("ledger mutex poisoned");
        state.next_id += 1;
        let id = state.next_id;
        state.active.insert(id, kind);
        Ok(SubscriptionId(id))
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.inner
            .lock()
            .expect("ledger mutex poisoned")
            .active
            .remove(&id.0);
    }
}

/// Session configuration. Fixed for the lifetime of one active period;
/// changing unit, precision or colors requires a fresh create cycle.
#[derive(Clone)]
pub struct RulerConfig {
    /// Width in pixels of the vertical rule band along the left edge.
    pub v_rule_size: u16,
    /// Height in pixels of the horizontal rule band along the top edge.
    pub h_rule_size: u16,
    pub show_crosshair: bool,
    pub show_mouse_pos: bool,
    pub tick_color: String,
    pub crosshair_color: String,
    pub crosshair_style: LineStyle,
    pub mouse_box_bg: String,
    pub mouse_box_color: String,
    pub unit: Unit,
    /// Decimal places for tick labels and the readout.
    pub unit_precision: usize,
    /// Tick spacing in unit space. `None` selects the unit's default.
    pub step: Option<f64>,
    /// Optional structured logger for lifecycle events.
    pub logger: Option<Logger>,
    /// Optional shared metrics accumulator.
    pub metrics: Option<Arc<Mutex<SessionMetrics>>>,
}

impl Default for RulerConfig {
    fn default() -> Self {
        Self {
            v_rule_size: 18,
            h_rule_size: 18,
            show_crosshair: true,
            show_mouse_pos: true,
            tick_color: "#323232".to_string(),
            crosshair_color: "#000".to_string(),
            crosshair_style: LineStyle::Dotted,
            mouse_box_bg: "#323232".to_string(),
            mouse_box_color: "#fff".to_string(),
            unit: Unit::Inch,
            unit_precision: 1,
            step: None,
            logger: None,
            metrics: None,
        }
    }
}

impl RulerConfig {
    /// Validate and resolve the effective tick step.
    fn validate(&self) -> Result<f64> {
        if self.v_rule_size == 0 || self.h_rule_size == 0 {
            return Err(RulerError::InvalidConfiguration(
                "rule band thickness must be positive".to_string(),
            ));
        }
        let step = self.step.unwrap_or_else(|| self.unit.default_step());
        if !step.is_finite() || step <= 0.0 {
            return Err(RulerError::InvalidConfiguration(format!(
                "tick step must be finite and positive, got {step}"
            )));
        }
        Ok(step)
    }
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Inactive,
    Active,
}

/// Orchestrator tying the unit scale, tick planner and pointer tracker to the
/// host's surface renderer and event source.
pub struct RulerSession {
    config: RulerConfig,
    step: f64,
    scale: ScaleFactor,
    frame: ContainerFrame,
    surface: Box<dyn SurfaceRenderer>,
    events: Box<dyn EventSource>,
    state: SessionState,
    subscriptions: Vec<SubscriptionId>,
    chrome_ids: Vec<ShapeId>,
    crosshair_ids: Vec<ShapeId>,
    readout_id: Option<ShapeId>,
    scene_hash: Option<blake3::Hash>,
    started: Instant,
}

impl std::fmt::Debug for RulerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RulerSession")
            .field("step", &self.step)
            .field("scale", &self.scale)
            .field("frame", &self.frame)
            .field("state", &self.state)
            .field("subscriptions", &self.subscriptions)
            .field("chrome_ids", &self.chrome_ids)
            .field("crosshair_ids", &self.crosshair_ids)
            .field("readout_id", &self.readout_id)
            .field("scene_hash", &self.scene_hash)
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}

impl RulerSession {
    /// Build and activate a session.
    ///
    /// The scale factor is resolved once through `probe`; the initial layout
    /// is emitted to `surface` and the resize/pointer subscriptions are
    /// installed before the session reports Active. Any failure unwinds the
    /// partial wiring and leaves nothing running.
    pub fn create(
        config: RulerConfig,
        frame: ContainerFrame,
        probe: &mut dyn DpiProbe,
        surface: Box<dyn SurfaceRenderer>,
        events: Box<dyn EventSource>,
    ) -> Result<Self> {
        let step = config.validate()?;
        let scale = resolve_pixels_per_unit(config.unit, probe)?;

        let mut session = Self {
            config,
            step,
            scale,
            frame,
            surface,
            events,
            state: SessionState::Inactive,
            subscriptions: Vec::new(),
            chrome_ids: Vec::new(),
            crosshair_ids: Vec::new(),
            readout_id: None,
            scene_hash: None,
            started: Instant::now(),
        };

        if let Err(err) = session.activate() {
            session.teardown();
            return Err(err);
        }
        Ok(session)
    }

    fn activate(&mut self) -> Result<()> {
        self.relayout()?;

        let resize = self.events.subscribe(EventKind::Resize)?;
        self.subscriptions.push(resize);
        let pointer = self.events.subscribe(EventKind::PointerMove)?;
        self.subscriptions.push(pointer);

        self.state = SessionState::Active;
        self.with_metrics(|m| m.record_session_created());
        self.log(
            LogLevel::Info,
            "session_created",
            [
                json_kv("unit", self.config.unit.symbol()),
                json_kv("width_px", self.frame.size.width),
                json_kv("height_px", self.frame.size.height),
            ],
        );
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn scale(&self) -> ScaleFactor {
        self.scale
    }

    pub fn frame(&self) -> ContainerFrame {
        self.frame
    }

    /// The container geometry changed: re-plan both axes and re-emit.
    ///
    /// Safe to call in rapid succession; an unchanged scene is detected by
    /// content hash and not re-emitted.
    pub fn on_resize(&mut self, frame: ContainerFrame) -> Result<()> {
        if self.state != SessionState::Active {
            return Ok(());
        }
        self.frame = frame;
        self.relayout()
    }

    /// The pointer moved: update the crosshair and readout.
    ///
    /// Returns the computed sample, or `None` when the session is inactive or
    /// both overlays are disabled (the whole pass is suppressed).
    pub fn on_pointer_move(&mut self, client: PointPx) -> Result<Option<PointerSample>> {
        if self.state != SessionState::Active {
            return Ok(None);
        }
        if !self.config.show_crosshair && !self.config.show_mouse_pos {
            self.with_metrics(|m| m.record_suppressed_move());
            return Ok(None);
        }

        let reading = pointer::sample(
            client,
            self.frame.origin,
            f64::from(self.config.v_rule_size),
            f64::from(self.config.h_rule_size),
            self.scale,
            self.config.unit_precision,
        );

        if self.config.show_crosshair {
            for id in self.crosshair_ids.drain(..) {
                self.surface.remove(id)?;
            }
            let horizontal = self.surface.add_line(LineShape {
                x: 0.0,
                y: reading.y_px,
                length: self.frame.size.width,
                orientation: Orientation::Horizontal,
                color: self.config.crosshair_color.clone(),
                style: self.config.crosshair_style,
            })?;
            let vertical = self.surface.add_line(LineShape {
                x: reading.x_px,
                y: 0.0,
                length: self.frame.size.height,
                orientation: Orientation::Vertical,
                color: self.config.crosshair_color.clone(),
                style: self.config.crosshair_style,
            })?;
            self.crosshair_ids.push(horizontal);
            self.crosshair_ids.push(vertical);
        }

        if self.config.show_mouse_pos {
            if let Some(id) = self.readout_id.take() {
                self.surface.remove(id)?;
            }
            let symbol = self.config.unit.symbol();
            let precision = self.config.unit_precision;
            let text = format!(
                "x: {:.*} {symbol}\ny: {:.*} {symbol}",
                precision, reading.x_unit, precision, reading.y_unit,
            );
            let id = self.surface.add_label(LabelShape {
                x: reading.x_px + READOUT_OFFSET_X,
                y: reading.y_px + READOUT_OFFSET_Y,
                text,
                color: self.config.mouse_box_color.clone(),
                background: Some(self.config.mouse_box_bg.clone()),
            })?;
            self.readout_id = Some(id);
        }

        self.with_metrics(|m| m.record_pointer_sample());
        Ok(Some(reading))
    }

    /// Release subscriptions and every ruler-owned visual. Idempotent.
    pub fn teardown(&mut self) {
        let was_active = self.state == SessionState::Active;
        let has_shapes = !self.chrome_ids.is_empty()
            || !self.crosshair_ids.is_empty()
            || self.readout_id.is_some();
        if !was_active && self.subscriptions.is_empty() && !has_shapes {
            return;
        }

        for id in self.subscriptions.drain(..) {
            self.events.unsubscribe(id);
        }
        if let Err(err) = self.surface.remove_all() {
            self.log(
                LogLevel::Warn,
                "teardown_surface_error",
                [json_kv("error", err.to_string())],
            );
        }
        self.chrome_ids.clear();
        self.crosshair_ids.clear();
        self.readout_id = None;
        self.scene_hash = None;
        self.state = SessionState::Inactive;

        if was_active {
            self.with_metrics(|m| m.record_teardown());
            if let (Some(logger), Some(metrics)) =
                (self.config.logger.as_ref(), self.config.metrics.as_ref())
            {
                if let Ok(guard) = metrics.lock() {
                    let snapshot = guard.snapshot(self.started.elapsed());
                    let _ = logger.log_event(snapshot.to_log_event(LOG_TARGET));
                }
            }
            self.log(LogLevel::Info, "session_teardown", std::iter::empty());
        }
    }

    fn relayout(&mut self) -> Result<()> {
        let (scene, tick_count) = self.build_scene()?;
        let hash = hash_scene(&scene)?;
        if self.scene_hash == Some(hash) {
            self.with_metrics(|m| m.record_scene_skipped());
            self.log(LogLevel::Debug, "scene_unchanged", std::iter::empty());
            return Ok(());
        }

        for id in self.chrome_ids.drain(..) {
            self.surface.remove(id)?;
        }
        for shape in scene {
            let id = match shape {
                RecordedShape::Rect(rect) => self.surface.add_rect(rect)?,
                RecordedShape::Line(line) => self.surface.add_line(line)?,
                RecordedShape::Label(label) => self.surface.add_label(label)?,
            };
            self.chrome_ids.push(id);
        }
        self.scene_hash = Some(hash);
        self.with_metrics(|m| m.record_layout(tick_count));
        self.log(
            LogLevel::Debug,
            "relayout",
            [
                json_kv("ticks", tick_count),
                json_kv("shapes", self.chrome_ids.len()),
            ],
        );
        Ok(())
    }

    /// Rule bands, corner, tick marks and labels for the current frame.
    fn build_scene(&self) -> Result<(Vec<RecordedShape>, usize)> {
        let v_rule = f64::from(self.config.v_rule_size);
        let h_rule = f64::from(self.config.h_rule_size);
        let size = self.frame.size;
        let mut scene = Vec::new();

        scene.push(RecordedShape::Rect(RectShape {
            x: 0.0,
            y: 0.0,
            width: size.width,
            height: h_rule,
            fill: RULE_BACKGROUND.to_string(),
        }));
        scene.push(RecordedShape::Rect(RectShape {
            x: 0.0,
            y: 0.0,
            width: v_rule,
            height: size.height,
            fill: RULE_BACKGROUND.to_string(),
        }));
        scene.push(RecordedShape::Rect(RectShape {
            x: 0.0,
            y: 0.0,
            width: v_rule,
            height: h_rule,
            fill: RULE_BACKGROUND.to_string(),
        }));

        let h_ticks = plan_axis(
            size.width,
            v_rule,
            self.config.unit,
            self.scale,
            self.step,
            self.config.unit_precision,
        )?;
        let v_ticks = plan_axis(
            size.height,
            h_rule,
            self.config.unit,
            self.scale,
            self.step,
            self.config.unit_precision,
        )?;
        let tick_count = h_ticks.len() + v_ticks.len();

        // Horizontal rule: ticks hang from the band's bottom edge.
        for tick in &h_ticks {
            let len = tick_length(tick.weight, h_rule);
            scene.push(RecordedShape::Line(LineShape {
                x: tick.position_px,
                y: h_rule - len,
                length: len,
                orientation: Orientation::Vertical,
                color: self.config.tick_color.clone(),
                style: LineStyle::Solid,
            }));
            if let Some(label) = &tick.label {
                scene.push(RecordedShape::Label(LabelShape {
                    x: tick.position_px + LABEL_INSET_PX,
                    y: LABEL_INSET_PX,
                    text: label.clone(),
                    color: self.config.tick_color.clone(),
                    background: None,
                }));
            }
        }

        // Vertical rule: ticks grow from the band's right edge.
        for tick in &v_ticks {
            let len = tick_length(tick.weight, v_rule);
            scene.push(RecordedShape::Line(LineShape {
                x: v_rule - len,
                y: tick.position_px,
                length: len,
                orientation: Orientation::Horizontal,
                color: self.config.tick_color.clone(),
                style: LineStyle::Solid,
            }));
            if let Some(label) = &tick.label {
                scene.push(RecordedShape::Label(LabelShape {
                    x: LABEL_INSET_PX,
                    y: tick.position_px + LABEL_INSET_PX,
                    text: label.clone(),
                    color: self.config.tick_color.clone(),
                    background: None,
                }));
            }
        }

        Ok((scene, tick_count))
    }

    fn with_metrics(&self, f: impl FnOnce(&mut SessionMetrics)) {
        if let Some(metrics) = self.config.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                f(&mut guard);
            }
        }
    }

    fn log<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        if let Some(logger) = self.config.logger.as_ref() {
            let _ = logger.log_event(event_with_fields(level, LOG_TARGET, message, fields));
        }
    }
}

fn tick_length(weight: TickWeight, rule_size: f64) -> f64 {
    match weight {
        TickWeight::Small => SMALL_TICK_PX,
        TickWeight::Medium => MEDIUM_TICK_PX,
        TickWeight::Major => rule_size,
    }
}

fn hash_scene(scene: &[RecordedShape]) -> Result<blake3::Hash> {
    let bytes = serde_json::to_vec(scene)
        .map_err(|err| RulerError::Backend(format!("scene serialization failed: {err}")))?;
    Ok(blake3::hash(&bytes))
}
