//! Terminal host driver.
//!
//! Wires a [`SessionRegistry`] to a real terminal: crossterm mouse and resize
//! events become pointer-move and resize notifications, and the shared
//! [`AnsiSurface`] is flushed after each change. `run_scripted` drives the
//! same path deterministically for tests and benches.

use std::io::Write;
use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, MouseEventKind};

use crate::error::Result;
use crate::geometry::{ContainerFrame, PointPx, SizePx};
use crate::registry::{ContainerId, SessionRegistry};
use crate::render::AnsiSurface;
use crate::session::{RulerConfig, SubscriptionLedger};
use crate::units::DpiProbe;

/// Host-level events after mapping from the terminal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    PointerMove(PointPx),
    Resize(SizePx),
    Exit,
}

/// Terminal host owning one ruler container.
pub struct TerminalHost {
    registry: SessionRegistry,
    container: ContainerId,
    surface: AnsiSurface,
    ledger: SubscriptionLedger,
    origin: PointPx,
    poll_interval: Duration,
}

impl TerminalHost {
    pub fn new(container: impl Into<ContainerId>, surface: AnsiSurface) -> Self {
        Self {
            registry: SessionRegistry::new(),
            container: container.into(),
            surface,
            ledger: SubscriptionLedger::new(),
            origin: PointPx::new(0.0, 0.0),
            poll_interval: Duration::from_millis(200),
        }
    }

    pub fn registry_mut(&mut self) -> &mut SessionRegistry {
        &mut self.registry
    }

    pub fn surface(&self) -> &AnsiSurface {
        &self.surface
    }

    /// Pixel size of the terminal container given the current grid.
    pub fn size_px(&self) -> SizePx {
        let settings = self.surface.settings();
        SizePx::new(
            f64::from(settings.cols) * settings.cell_width_px,
            f64::from(settings.rows) * settings.cell_height_px,
        )
    }

    /// Create (or re-create) the ruler on this host's container.
    pub fn create_ruler(&mut self, config: RulerConfig, probe: &mut dyn DpiProbe) -> Result<()> {
        let frame = ContainerFrame::new(self.origin, self.size_px());
        self.registry.create(
            self.container.clone(),
            config,
            frame,
            probe,
            Box::new(self.surface.clone()),
            Box::new(self.ledger.clone()),
        )
    }

    pub fn clear_ruler(&mut self) {
        self.registry.clear(&self.container);
    }

    /// Poll the terminal until an exit key arrives.
    pub fn run(&mut self, writer: &mut impl Write) -> Result<()> {
        self.surface.flush(writer)?;
        loop {
            if !event::poll(self.poll_interval)? {
                continue;
            }
            let Some(host_event) = self.map_event(event::read()?) else {
                continue;
            };
            if self.apply(host_event, writer)? {
                break;
            }
        }
        Ok(())
    }

    /// Drive the host from a predetermined event script.
    pub fn run_scripted<I>(&mut self, writer: &mut impl Write, events: I) -> Result<()>
    where
        I: IntoIterator<Item = HostEvent>,
    {
        self.surface.flush(writer)?;
        for host_event in events {
            if self.apply(host_event, writer)? {
                break;
            }
        }
        Ok(())
    }

    fn map_event(&self, event: CrosstermEvent) -> Option<HostEvent> {
        let settings = self.surface.settings();
        match event {
            CrosstermEvent::Key(KeyEvent { code, .. })
                if matches!(code, KeyCode::Esc | KeyCode::Char('q')) =>
            {
                Some(HostEvent::Exit)
            }
            CrosstermEvent::Mouse(mouse) if matches!(mouse.kind, MouseEventKind::Moved) => {
                Some(HostEvent::PointerMove(PointPx::new(
                    self.origin.x + f64::from(mouse.column) * settings.cell_width_px,
                    self.origin.y + f64::from(mouse.row) * settings.cell_height_px,
                )))
            }
            CrosstermEvent::Resize(cols, rows) => {
                self.surface.set_grid(cols, rows);
                Some(HostEvent::Resize(SizePx::new(
                    f64::from(cols) * settings.cell_width_px,
                    f64::from(rows) * settings.cell_height_px,
                )))
            }
            _ => None,
        }
    }

    /// Returns true when the host should stop.
    fn apply(&mut self, host_event: HostEvent, writer: &mut impl Write) -> Result<bool> {
        match host_event {
            HostEvent::Exit => return Ok(true),
            HostEvent::PointerMove(client) => {
                if let Some(session) = self.registry.session_mut(&self.container) {
                    session.on_pointer_move(client)?;
                }
            }
            HostEvent::Resize(size) => {
                let frame = ContainerFrame::new(self.origin, size);
                if let Some(session) = self.registry.session_mut(&self.container) {
                    session.on_resize(frame)?;
                }
            }
        }
        self.surface.flush(writer)?;
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::SurfaceSettings;
    use crate::units::{FixedProbe, Unit};

    fn pixel_host() -> TerminalHost {
        let surface = AnsiSurface::new(SurfaceSettings {
            cols: 60,
            rows: 20,
            cell_width_px: 1.0,
            cell_height_px: 1.0,
        });
        TerminalHost::new("terminal", surface)
    }

    #[test]
    fn scripted_run_drives_the_session() {
        let mut host = pixel_host();
        let config = RulerConfig {
            unit: Unit::Pixel,
            step: Some(10.0),
            ..RulerConfig::default()
        };
        host.create_ruler(config, &mut FixedProbe::new(96.0)).unwrap();
        let shapes_before = host.surface().shape_count();

        let mut out = Vec::new();
        host.run_scripted(
            &mut out,
            [
                HostEvent::PointerMove(PointPx::new(30.0, 10.0)),
                HostEvent::PointerMove(PointPx::new(31.0, 11.0)),
                HostEvent::Exit,
            ],
        )
        .unwrap();

        // Crosshair pair and readout, replaced not accumulated.
        assert_eq!(host.surface().shape_count(), shapes_before + 3);
        assert!(!out.is_empty());
    }

    #[test]
    fn resize_event_replans_the_ruler() {
        let mut host = pixel_host();
        host.create_ruler(
            RulerConfig {
                unit: Unit::Pixel,
                ..RulerConfig::default()
            },
            &mut FixedProbe::new(96.0),
        )
        .unwrap();
        let shapes_before = host.surface().shape_count();

        let mut out = Vec::new();
        host.run_scripted(&mut out, [HostEvent::Resize(SizePx::new(120.0, 20.0))])
            .unwrap();
        assert!(host.surface().shape_count() > shapes_before);
    }

    #[test]
    fn clear_ruler_removes_all_shapes() {
        let mut host = pixel_host();
        host.create_ruler(
            RulerConfig {
                unit: Unit::Pixel,
                ..RulerConfig::default()
            },
            &mut FixedProbe::new(96.0),
        )
        .unwrap();
        assert!(host.surface().shape_count() > 0);
        host.clear_ruler();
        assert_eq!(host.surface().shape_count(), 0);
    }
}
