// Per-monitor dim/tint state and the overlays that render it.
//
// Color and opacity are coupled: the overlay color is RGBA and its alpha is the
// overlay opacity, so every opacity write is followed by a color write that
// carries the same alpha.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::host::OverlaySurface;
use crate::model::{
    DimLevel, MonitorDescriptor, MonitorGeometry, MonitorId, OverlayState, Rgba, TintColor,
};

/// Single owner of overlay handles and of the per-monitor dim/tint records.
pub struct OverlayStateManager<S: OverlaySurface> {
    surface: S,
    monitors: Vec<MonitorDescriptor>,
    overlays: BTreeMap<MonitorId, S::Handle>,
    states: BTreeMap<MonitorId, OverlayState>,
    global_dim: DimLevel,
    tint: TintColor,
}

impl<S: OverlaySurface> OverlayStateManager<S> {
    pub fn new(surface: S, monitors: Vec<MonitorDescriptor>) -> Self {
        Self {
            surface,
            monitors,
            overlays: BTreeMap::new(),
            states: BTreeMap::new(),
            global_dim: DimLevel::OFF,
            tint: TintColor::DEFAULT,
        }
    }

    pub fn global_dim(&self) -> DimLevel {
        self.global_dim
    }

    pub fn tint(&self) -> TintColor {
        self.tint
    }

    pub fn monitors(&self) -> &[MonitorDescriptor] {
        &self.monitors
    }

    pub fn overlay_state(&self, monitor: MonitorId) -> Option<OverlayState> {
        self.states.get(&monitor).copied()
    }

    pub fn has_overlay(&self, monitor: MonitorId) -> bool {
        self.overlays.contains_key(&monitor)
    }

    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Pushes `value` to every monitor that already has an overlay. Monitors
    /// without one stay untouched.
    pub fn set_global_dim(&mut self, value: DimLevel) {
        self.global_dim = value;
        let dimmed: Vec<MonitorId> = self.overlays.keys().copied().collect();
        for monitor in dimmed {
            self.set_monitor_dim(monitor, value);
        }
    }

    pub fn set_monitor_dim(&mut self, monitor: MonitorId, value: DimLevel) {
        let Some(geometry) = self.geometry_of(monitor) else {
            debug!(%monitor, "dim requested for a monitor outside the current snapshot");
            return;
        };

        if !self.overlays.contains_key(&monitor) {
            match self.surface.create_overlay(&geometry, Rgba::black(u8::MAX)) {
                Ok(overlay) => {
                    debug!(%monitor, ?geometry, "overlay created");
                    self.overlays.insert(monitor, overlay);
                }
                Err(err) => warn!(%monitor, "failed to create overlay: {err:#}"),
            }
        }

        let opacity = value.alpha();
        self.states.entry(monitor).or_default().opacity = opacity;
        if let Some(overlay) = self.overlays.get(&monitor) {
            self.surface.set_opacity(overlay, opacity);
        }
        self.apply_color(monitor);
    }

    /// Flips the tint flag of every monitor that has a record.
    pub fn set_global_tint_enabled(&mut self, enabled: bool) {
        let touched: Vec<MonitorId> = self.states.keys().copied().collect();
        for monitor in touched {
            if let Some(state) = self.states.get_mut(&monitor) {
                state.tint_enabled = enabled;
            }
            self.apply_color(monitor);
        }
    }

    pub fn set_monitor_tint_enabled(&mut self, monitor: MonitorId, enabled: bool) {
        if self.geometry_of(monitor).is_none() {
            debug!(%monitor, "tint toggled for a monitor outside the current snapshot");
            return;
        }
        self.states.entry(monitor).or_default().tint_enabled = enabled;
        self.apply_color(monitor);
    }

    pub fn set_tint_color(&mut self, tint: TintColor) {
        self.tint = tint;
        let tinted: Vec<MonitorId> = self
            .states
            .iter()
            .filter(|(_, state)| state.tint_enabled)
            .map(|(monitor, _)| *monitor)
            .collect();
        for monitor in tinted {
            self.apply_color(monitor);
        }
    }

    /// Writes tint-or-black with the current opacity as alpha.
    pub(crate) fn apply_color(&mut self, monitor: MonitorId) {
        let Some(overlay) = self.overlays.get(&monitor) else {
            debug!(%monitor, "no overlay found, color not applied");
            return;
        };
        let state = self.states.get(&monitor).copied().unwrap_or_default();
        let color = if state.tint_enabled {
            self.tint.with_alpha(state.opacity)
        } else {
            Rgba::black(state.opacity)
        };
        self.surface.set_color(overlay, color);
    }

    /// Drops every overlay and record and adopts a new monitor snapshot.
    /// Global dim and tint carry over.
    pub fn rebuild(&mut self, monitors: Vec<MonitorDescriptor>) {
        self.destroy_overlays();
        self.states.clear();
        info!(
            monitors = monitors.len(),
            global_dim = self.global_dim.value(),
            "overlay state rebuilt"
        );
        self.monitors = monitors;
    }

    /// Destroys everything and restores the defaults. Safe to call twice.
    pub fn teardown(&mut self) {
        self.destroy_overlays();
        self.states.clear();
        self.global_dim = DimLevel::OFF;
        self.tint = TintColor::DEFAULT;
        info!("overlay state torn down");
    }

    fn geometry_of(&self, monitor: MonitorId) -> Option<MonitorGeometry> {
        self.monitors
            .iter()
            .find(|descriptor| descriptor.id == monitor)
            .map(|descriptor| descriptor.geometry)
    }

    fn destroy_overlays(&mut self) {
        let overlays = std::mem::take(&mut self.overlays);
        for (monitor, overlay) in overlays {
            debug!(%monitor, "overlay destroyed");
            self.surface.destroy_overlay(overlay);
        }
    }
}

impl<S: OverlaySurface> Drop for OverlayStateManager<S> {
    fn drop(&mut self) {
        self.destroy_overlays();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakeSurface {
        next: u32,
        live: HashMap<u32, (MonitorGeometry, u8, Rgba)>,
        color_writes: usize,
        fail_create: bool,
    }

    impl FakeSurface {
        fn color_at(&self, geometry: MonitorGeometry) -> Option<Rgba> {
            self.live
                .values()
                .find(|(g, _, _)| *g == geometry)
                .map(|(_, _, color)| *color)
        }
    }

    impl OverlaySurface for FakeSurface {
        type Handle = u32;

        fn create_overlay(
            &mut self,
            geometry: &MonitorGeometry,
            initial: Rgba,
        ) -> anyhow::Result<u32> {
            if self.fail_create {
                anyhow::bail!("no compositor");
            }
            self.next += 1;
            self.live.insert(self.next, (*geometry, 0, initial));
            Ok(self.next)
        }

        fn set_opacity(&mut self, overlay: &u32, opacity: u8) {
            self.live.get_mut(overlay).expect("live overlay").1 = opacity;
        }

        fn set_color(&mut self, overlay: &u32, color: Rgba) {
            self.color_writes += 1;
            self.live.get_mut(overlay).expect("live overlay").2 = color;
        }

        fn destroy_overlay(&mut self, overlay: u32) {
            self.live.remove(&overlay).expect("live overlay");
        }
    }

    fn two_monitors() -> Vec<MonitorDescriptor> {
        vec![
            MonitorDescriptor::new(0, 0, 0, 1920, 1080),
            MonitorDescriptor::new(1, 1920, 0, 2560, 1440),
        ]
    }

    fn manager() -> OverlayStateManager<FakeSurface> {
        OverlayStateManager::new(FakeSurface::default(), two_monitors())
    }

    #[test]
    fn monitor_dim_creates_overlay_with_floored_opacity() {
        let mut m = manager();
        m.set_monitor_dim(MonitorId(0), DimLevel::new(0.5));

        assert!(m.has_overlay(MonitorId(0)));
        assert!(!m.has_overlay(MonitorId(1)));
        let (geometry, opacity, color) = m.surface().live.values().next().copied().unwrap();
        assert_eq!(geometry, two_monitors()[0].geometry);
        assert_eq!(opacity, 127);
        assert_eq!(color, Rgba::black(127));
    }

    #[test]
    fn apply_color_twice_yields_the_same_color() {
        let mut m = manager();
        m.set_monitor_tint_enabled(MonitorId(1), true);
        m.set_monitor_dim(MonitorId(1), DimLevel::new(0.3));
        let geometry = two_monitors()[1].geometry;

        m.apply_color(MonitorId(1));
        let first = m.surface().color_at(geometry);
        m.apply_color(MonitorId(1));
        assert_eq!(m.surface().color_at(geometry), first);
        assert_eq!(first, Some(TintColor::DEFAULT.with_alpha(76)));
    }

    #[test]
    fn apply_color_without_overlay_is_a_noop() {
        let mut m = manager();
        m.apply_color(MonitorId(0));
        m.set_monitor_tint_enabled(MonitorId(0), true);

        assert_eq!(m.surface().color_writes, 0);
        assert_eq!(m.overlay_count(), 0);
        assert_eq!(
            m.overlay_state(MonitorId(0)),
            Some(OverlayState {
                opacity: 0,
                tint_enabled: true
            })
        );
    }

    #[test]
    fn stale_monitor_index_is_ignored() {
        let mut m = manager();
        m.set_monitor_dim(MonitorId(7), DimLevel::new(0.9));
        m.set_monitor_tint_enabled(MonitorId(7), true);

        assert_eq!(m.overlay_count(), 0);
        assert_eq!(m.overlay_state(MonitorId(7)), None);
    }

    #[test]
    fn failed_creation_keeps_the_record_but_no_overlay() {
        let surface = FakeSurface {
            fail_create: true,
            ..FakeSurface::default()
        };
        let mut m = OverlayStateManager::new(surface, two_monitors());
        m.set_monitor_dim(MonitorId(0), DimLevel::new(0.4));

        assert!(!m.has_overlay(MonitorId(0)));
        assert_eq!(m.overlay_state(MonitorId(0)).map(|s| s.opacity), Some(102));
    }

    #[test]
    fn rebuild_releases_every_overlay() {
        let mut m = manager();
        m.set_monitor_dim(MonitorId(0), DimLevel::new(0.2));
        m.set_monitor_dim(MonitorId(1), DimLevel::new(0.2));
        assert_eq!(m.surface().live.len(), 2);

        m.rebuild(two_monitors());
        assert!(m.surface().live.is_empty());
        assert_eq!(m.overlay_state(MonitorId(0)), None);
    }
}
