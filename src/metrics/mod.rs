use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;
use std::time::Duration;

/// Counters accumulated across one or more ruler sessions.
#[derive(Debug, Default, Clone)]
pub struct SessionMetrics {
    sessions_created: u64,
    layouts: u64,
    ticks_emitted: u64,
    scenes_skipped: u64,
    pointer_samples: u64,
    suppressed_moves: u64,
    teardowns: u64,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_session_created(&mut self) {
        self.sessions_created = self.sessions_created.saturating_add(1);
    }

    pub fn record_layout(&mut self, tick_count: usize) {
        self.layouts = self.layouts.saturating_add(1);
        self.ticks_emitted = self.ticks_emitted.saturating_add(tick_count as u64);
    }

    pub fn record_scene_skipped(&mut self) {
        self.scenes_skipped = self.scenes_skipped.saturating_add(1);
    }

    pub fn record_pointer_sample(&mut self) {
        self.pointer_samples = self.pointer_samples.saturating_add(1);
    }

    pub fn record_suppressed_move(&mut self) {
        self.suppressed_moves = self.suppressed_moves.saturating_add(1);
    }

    pub fn record_teardown(&mut self) {
        self.teardowns = self.teardowns.saturating_add(1);
    }

    pub fn snapshot(&self, uptime: Duration) -> MetricSnapshot {
        MetricSnapshot {
            uptime_ms: uptime.as_millis() as u64,
            sessions_created: self.sessions_created,
            layouts: self.layouts,
            ticks_emitted: self.ticks_emitted,
            scenes_skipped: self.scenes_skipped,
            pointer_samples: self.pointer_samples,
            suppressed_moves: self.suppressed_moves,
            teardowns: self.teardowns,
        }
    }
}

/// Point-in-time view of [`SessionMetrics`].
#[derive(Debug, Clone)]
pub struct MetricSnapshot {
    pub uptime_ms: u64,
    pub sessions_created: u64,
    pub layouts: u64,
    pub ticks_emitted: u64,
    pub scenes_skipped: u64,
    pub pointer_samples: u64,
    pub suppressed_moves: u64,
    pub teardowns: u64,
}

impl MetricSnapshot {
    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("uptime_ms".to_string(), json!(self.uptime_ms));
        map.insert("sessions_created".to_string(), json!(self.sessions_created));
        map.insert("layouts".to_string(), json!(self.layouts));
        map.insert("ticks_emitted".to_string(), json!(self.ticks_emitted));
        map.insert("scenes_skipped".to_string(), json!(self.scenes_skipped));
        map.insert("pointer_samples".to_string(), json!(self.pointer_samples));
        map.insert("suppressed_moves".to_string(), json!(self.suppressed_moves));
        map.insert("teardowns".to_string(), json!(self.teardowns));
        map
    }

    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "session_metrics", self.as_fields())
    }
}
