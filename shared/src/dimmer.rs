// Flat adapter between panel widgets, the topology provider and the overlay
// state manager. Holds no dim/tint state of its own.

use tracing::{debug, info};

use crate::host::{DisplayTopology, OverlaySurface, TopologySubscription};
use crate::manager::OverlayStateManager;
use crate::menu::{MenuEvent, MenuTarget, PanelMenu};
use crate::model::{fraction_to_byte, DimLevel, MonitorId};

pub struct Dimmer<T: DisplayTopology, S: OverlaySurface> {
    topology: T,
    manager: OverlayStateManager<S>,
    menu: PanelMenu,
    subscription: Option<TopologySubscription>,
}

impl<T: DisplayTopology, S: OverlaySurface> Dimmer<T, S> {
    /// Queries the monitors, builds the panel and starts listening for
    /// topology changes.
    pub fn enable(mut topology: T, surface: S) -> Self {
        let monitors = topology.list_monitors();
        let manager = OverlayStateManager::new(surface, monitors);
        let menu = PanelMenu::build(manager.monitors(), manager.global_dim(), manager.tint());
        let subscription = topology.subscribe();
        info!(monitors = manager.monitors().len(), "dimmer enabled");

        Self {
            topology,
            manager,
            menu,
            subscription: Some(subscription),
        }
    }

    pub fn menu(&self) -> &PanelMenu {
        &self.menu
    }

    pub fn manager(&self) -> &OverlayStateManager<S> {
        &self.manager
    }

    pub fn surface_mut(&mut self) -> &mut S {
        self.manager.surface_mut()
    }

    pub fn is_enabled(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn handle(&mut self, event: MenuEvent) {
        self.menu.record(&event);
        match event {
            MenuEvent::DimChanged {
                target: MenuTarget::Global,
                value,
            } => {
                let level = DimLevel::new(value);
                self.manager.set_global_dim(level);
                self.menu.reflect_global_dim(level);
            }
            MenuEvent::DimChanged {
                target: MenuTarget::Monitor(monitor),
                value,
            } => {
                self.adopt_switch_state(monitor);
                self.manager.set_monitor_dim(monitor, DimLevel::new(value));
            }
            MenuEvent::TintToggled {
                target: MenuTarget::Global,
                enabled,
            } => {
                self.manager.set_global_tint_enabled(enabled);
                self.menu.reflect_global_tint(enabled);
            }
            MenuEvent::TintToggled {
                target: MenuTarget::Monitor(monitor),
                enabled,
            } => self.manager.set_monitor_tint_enabled(monitor, enabled),
            MenuEvent::ChannelChanged { channel, value } => {
                let tint = self
                    .manager
                    .tint()
                    .with_channel(channel, fraction_to_byte(value));
                self.manager.set_tint_color(tint);
            }
        }
    }

    /// Host callback for monitors being added, removed or resized.
    pub fn topology_changed(&mut self) {
        if self.subscription.is_none() {
            debug!("topology change after teardown ignored");
            return;
        }
        let monitors = self.topology.list_monitors();
        self.manager.rebuild(monitors);
        self.rebuild_menu();
    }

    pub fn teardown(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            self.topology.unsubscribe(subscription);
        }
        self.manager.teardown();
        self.rebuild_menu();
    }

    /// A monitor without a record missed any global tint toggle; its switch
    /// still shows the toggled state, so the record starts from that.
    fn adopt_switch_state(&mut self, monitor: MonitorId) {
        if self.manager.overlay_state(monitor).is_some() {
            return;
        }
        if self.menu.tint_switch(MenuTarget::Monitor(monitor)) == Some(true) {
            self.manager.set_monitor_tint_enabled(monitor, true);
        }
    }

    fn rebuild_menu(&mut self) {
        self.menu = PanelMenu::build(
            self.manager.monitors(),
            self.manager.global_dim(),
            self.manager.tint(),
        );
    }
}
