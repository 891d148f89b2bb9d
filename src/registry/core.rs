use std::collections::HashMap;

use crate::error::Result;
use crate::geometry::ContainerFrame;
use crate::logging::{LogLevel, Logger, event_with_fields, json_kv};
use crate::session::{EventSource, RulerConfig, RulerSession};
use crate::surface::SurfaceRenderer;
use crate::units::DpiProbe;

pub type ContainerId = String;

const LOG_TARGET: &str = "ruler::registry";

/// Sessions keyed by container identity.
///
/// At most one active session exists per container: `create` on an occupied
/// container tears the prior session down first. The registry is plain host
/// state, not a global.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: HashMap<ContainerId, RulerSession>,
    logger: Option<Logger>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_logger(logger: Logger) -> Self {
        Self {
            sessions: HashMap::new(),
            logger: Some(logger),
        }
    }

    /// Create (or re-create) the ruler for `container`.
    ///
    /// On error no session remains registered for the container and nothing
    /// stays subscribed.
    pub fn create(
        &mut self,
        container: impl Into<ContainerId>,
        config: RulerConfig,
        frame: ContainerFrame,
        probe: &mut dyn DpiProbe,
        surface: Box<dyn SurfaceRenderer>,
        events: Box<dyn EventSource>,
    ) -> Result<()> {
        let container = container.into();
        if let Some(mut prior) = self.sessions.remove(&container) {
            prior.teardown();
            self.log(
                LogLevel::Info,
                "session_replaced",
                [json_kv("container", container.clone())],
            );
        }

        let session = RulerSession::create(config, frame, probe, surface, events)?;
        self.sessions.insert(container.clone(), session);
        self.log(
            LogLevel::Info,
            "session_registered",
            [json_kv("container", container)],
        );
        Ok(())
    }

    /// Tear down and forget the session for `container`. No-op when absent.
    pub fn clear(&mut self, container: &str) {
        if let Some(mut session) = self.sessions.remove(container) {
            session.teardown();
            self.log(
                LogLevel::Info,
                "session_cleared",
                [json_kv("container", container)],
            );
        }
    }

    /// Tear down every registered session.
    pub fn clear_all(&mut self) {
        let containers: Vec<_> = self.sessions.keys().cloned().collect();
        for container in containers {
            self.clear(&container);
        }
    }

    pub fn session_mut(&mut self, container: &str) -> Option<&mut RulerSession> {
        self.sessions.get_mut(container)
    }

    pub fn is_active(&self, container: &str) -> bool {
        self.sessions
            .get(container)
            .map(|s| s.is_active())
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn log<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        if let Some(logger) = self.logger.as_ref() {
            let _ = logger.log_event(event_with_fields(level, LOG_TARGET, message, fields));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{PointPx, SizePx};
    use crate::session::SubscriptionLedger;
    use crate::surface::NullSurface;
    use crate::units::{FixedProbe, Unit};

    fn frame() -> ContainerFrame {
        ContainerFrame::new(PointPx::new(0.0, 0.0), SizePx::new(518.0, 218.0))
    }

    fn pixel_config() -> RulerConfig {
        RulerConfig {
            unit: Unit::Pixel,
            ..RulerConfig::default()
        }
    }

    #[test]
    fn create_twice_leaves_one_session_and_one_subscription_set() {
        let mut registry = SessionRegistry::new();
        let ledger = SubscriptionLedger::new();
        let mut probe = FixedProbe::new(96.0);

        for _ in 0..2 {
            registry
                .create(
                    "panel",
                    pixel_config(),
                    frame(),
                    &mut probe,
                    Box::new(NullSurface::new()),
                    Box::new(ledger.clone()),
                )
                .unwrap();
        }

        assert_eq!(registry.len(), 1);
        assert!(registry.is_active("panel"));
        assert_eq!(ledger.active_count(), 2);
    }

    #[test]
    fn clear_without_session_is_a_no_op() {
        let mut registry = SessionRegistry::new();
        registry.clear("nothing-here");
        assert!(registry.is_empty());
    }

    #[test]
    fn clear_tears_down_and_forgets() {
        let mut registry = SessionRegistry::new();
        let ledger = SubscriptionLedger::new();
        let mut probe = FixedProbe::new(96.0);
        registry
            .create(
                "panel",
                pixel_config(),
                frame(),
                &mut probe,
                Box::new(NullSurface::new()),
                Box::new(ledger.clone()),
            )
            .unwrap();

        registry.clear("panel");
        assert!(!registry.is_active("panel"));
        assert!(registry.is_empty());
        assert_eq!(ledger.active_count(), 0);
    }

    #[test]
    fn failed_create_registers_nothing() {
        let mut registry = SessionRegistry::new();
        let ledger = SubscriptionLedger::new();
        let mut probe = crate::units::UnavailableProbe::new("headless");
        let err = registry.create(
            "panel",
            RulerConfig::default(),
            frame(),
            &mut probe,
            Box::new(NullSurface::new()),
            Box::new(ledger.clone()),
        );
        assert!(err.is_err());
        assert!(registry.is_empty());
        assert_eq!(ledger.active_count(), 0);
    }

    #[test]
    fn clear_all_empties_the_registry() {
        let mut registry = SessionRegistry::new();
        let mut probe = FixedProbe::new(96.0);
        for container in ["a", "b"] {
            registry
                .create(
                    container,
                    pixel_config(),
                    frame(),
                    &mut probe,
                    Box::new(NullSurface::new()),
                    Box::new(SubscriptionLedger::new()),
                )
                .unwrap();
        }
        assert_eq!(registry.len(), 2);
        registry.clear_all();
        assert!(registry.is_empty());
    }
}
