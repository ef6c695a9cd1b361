use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use dimtint_shared::{
    Channel, DimLevel, Dimmer, DisplayTopology, MenuEvent, MenuItem, MenuTarget,
    MonitorDescriptor, MonitorGeometry, MonitorId, OverlayState, OverlaySurface, Rgba, TintColor,
    TopologySubscription,
};

#[derive(Clone, Default)]
struct FakeTopology {
    monitors: Rc<RefCell<Vec<MonitorDescriptor>>>,
    subscribed: Rc<Cell<bool>>,
}

impl FakeTopology {
    fn with_monitors(count: usize) -> Self {
        let topology = Self::default();
        topology.plug(count);
        topology
    }

    fn plug(&self, count: usize) {
        *self.monitors.borrow_mut() = (0..count)
            .map(|i| MonitorDescriptor::new(i, i as i32 * 1920, 0, 1920, 1080))
            .collect();
    }
}

impl DisplayTopology for FakeTopology {
    fn list_monitors(&self) -> Vec<MonitorDescriptor> {
        self.monitors.borrow().clone()
    }

    fn subscribe(&mut self) -> TopologySubscription {
        self.subscribed.set(true);
        TopologySubscription(1)
    }

    fn unsubscribe(&mut self, subscription: TopologySubscription) {
        assert_eq!(subscription, TopologySubscription(1));
        self.subscribed.set(false);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Layer {
    x: i32,
    opacity: u8,
    color: Rgba,
}

#[derive(Default)]
struct FakeSurface {
    next: u32,
    live: BTreeMap<u32, Layer>,
    destroyed: usize,
}

impl FakeSurface {
    /// Layer covering the monitor that starts at `x`.
    fn layer_at(&self, x: i32) -> Option<Layer> {
        self.live.values().find(|layer| layer.x == x).copied()
    }
}

impl OverlaySurface for FakeSurface {
    type Handle = u32;

    fn create_overlay(&mut self, geometry: &MonitorGeometry, initial: Rgba) -> anyhow::Result<u32> {
        self.next += 1;
        self.live.insert(
            self.next,
            Layer {
                x: geometry.x,
                opacity: 0,
                color: initial,
            },
        );
        Ok(self.next)
    }

    fn set_opacity(&mut self, overlay: &u32, opacity: u8) {
        self.live.get_mut(overlay).unwrap().opacity = opacity;
    }

    fn set_color(&mut self, overlay: &u32, color: Rgba) {
        self.live.get_mut(overlay).unwrap().color = color;
    }

    fn destroy_overlay(&mut self, overlay: u32) {
        self.live.remove(&overlay).unwrap();
        self.destroyed += 1;
    }
}

fn dim(monitor: usize, value: f64) -> MenuEvent {
    MenuEvent::DimChanged {
        target: MenuTarget::Monitor(MonitorId(monitor)),
        value,
    }
}

fn global_dim(value: f64) -> MenuEvent {
    MenuEvent::DimChanged {
        target: MenuTarget::Global,
        value,
    }
}

fn tint(target: MenuTarget, enabled: bool) -> MenuEvent {
    MenuEvent::TintToggled { target, enabled }
}

fn channel(channel: Channel, byte: u8) -> MenuEvent {
    MenuEvent::ChannelChanged {
        channel,
        value: f64::from(byte) / 255.0,
    }
}

fn set_tint_color(dimmer: &mut Dimmer<FakeTopology, FakeSurface>, r: u8, g: u8, b: u8) {
    dimmer.handle(channel(Channel::Red, r));
    dimmer.handle(channel(Channel::Green, g));
    dimmer.handle(channel(Channel::Blue, b));
}

fn enable(monitors: usize) -> (FakeTopology, Dimmer<FakeTopology, FakeSurface>) {
    let topology = FakeTopology::with_monitors(monitors);
    let dimmer = Dimmer::enable(topology.clone(), FakeSurface::default());
    (topology, dimmer)
}

fn surface(dimmer: &Dimmer<FakeTopology, FakeSurface>) -> &FakeSurface {
    dimmer.manager().surface()
}

#[test]
fn two_monitor_walkthrough() {
    let (_topology, mut dimmer) = enable(2);

    dimmer.handle(dim(0, 0.6));
    let layer = surface(&dimmer).layer_at(0).unwrap();
    assert_eq!(layer.opacity, 153);
    assert_eq!(layer.color, Rgba::black(153));

    dimmer.handle(tint(MenuTarget::Global, true));
    assert_eq!(
        surface(&dimmer).layer_at(0).unwrap().color,
        Rgba::new(128, 83, 0, 153)
    );

    set_tint_color(&mut dimmer, 10, 20, 30);
    assert_eq!(
        surface(&dimmer).layer_at(0).unwrap().color,
        Rgba::new(10, 20, 30, 153)
    );
    assert_eq!(surface(&dimmer).layer_at(1920), None);
    assert_eq!(surface(&dimmer).live.len(), 1);
}

#[test]
fn monitor_dim_keeps_alpha_coupled_to_tint_state() {
    let (_topology, mut dimmer) = enable(2);

    for value in [0.0, 0.5, 1.0] {
        dimmer.handle(dim(1, value));
        let layer = surface(&dimmer).layer_at(1920).unwrap();
        let alpha = DimLevel::new(value).alpha();
        assert_eq!(layer.opacity, alpha);
        assert_eq!(layer.color, Rgba::black(alpha));
    }
    assert_eq!(surface(&dimmer).layer_at(1920).unwrap().opacity, 255);

    dimmer.handle(tint(MenuTarget::Monitor(MonitorId(1)), true));
    dimmer.handle(dim(1, 0.5));
    let layer = surface(&dimmer).layer_at(1920).unwrap();
    assert_eq!(layer.opacity, 127);
    assert_eq!(layer.color, TintColor::DEFAULT.with_alpha(127));
}

#[test]
fn global_dim_only_reaches_monitors_with_overlays() {
    let (_topology, mut dimmer) = enable(4);
    dimmer.handle(dim(2, 0.1));

    dimmer.handle(global_dim(0.8));

    assert_eq!(surface(&dimmer).layer_at(2 * 1920).unwrap().opacity, 204);
    assert!(!dimmer.manager().has_overlay(MonitorId(3)));
    assert_eq!(dimmer.manager().overlay_count(), 1);
    assert_eq!(dimmer.manager().global_dim(), DimLevel::new(0.8));

    for item in dimmer.menu().items() {
        if let MenuItem::DimSlider { value, .. } = item {
            assert_eq!(*value, 0.8);
        }
    }
}

#[test]
fn global_tint_only_reaches_monitors_with_records() {
    let (_topology, mut dimmer) = enable(2);
    dimmer.handle(dim(0, 0.2));

    dimmer.handle(tint(MenuTarget::Global, true));

    assert_eq!(
        dimmer.manager().overlay_state(MonitorId(0)),
        Some(OverlayState {
            opacity: 51,
            tint_enabled: true
        })
    );
    assert_eq!(dimmer.manager().overlay_state(MonitorId(1)), None);
    assert!(dimmer.menu().items().iter().all(|item| match item {
        MenuItem::TintSwitch { on, .. } => *on,
        _ => true,
    }));
}

#[test]
fn monitor_dimmed_after_global_tint_comes_up_tinted() {
    let (_topology, mut dimmer) = enable(2);
    dimmer.handle(tint(MenuTarget::Global, true));

    dimmer.handle(dim(1, 0.6));

    assert_eq!(
        surface(&dimmer).layer_at(1920).unwrap().color,
        TintColor::DEFAULT.with_alpha(153)
    );
    assert_eq!(
        dimmer.manager().overlay_state(MonitorId(1)),
        Some(OverlayState {
            opacity: 153,
            tint_enabled: true
        })
    );

    // The switch reads on, so one click turns the tint off.
    let switch = dimmer.menu().item(6).unwrap();
    let event = MenuEvent::from_switch(switch).unwrap();
    assert_eq!(event, tint(MenuTarget::Monitor(MonitorId(1)), false));
    dimmer.handle(event);
    assert_eq!(
        surface(&dimmer).layer_at(1920).unwrap().color,
        Rgba::black(153)
    );
}

#[test]
fn tint_color_skips_untinted_monitors() {
    let (_topology, mut dimmer) = enable(2);
    dimmer.handle(dim(0, 0.4));
    dimmer.handle(dim(1, 0.4));
    dimmer.handle(tint(MenuTarget::Monitor(MonitorId(1)), true));

    set_tint_color(&mut dimmer, 200, 0, 50);

    assert_eq!(surface(&dimmer).layer_at(0).unwrap().color, Rgba::black(102));
    assert_eq!(
        surface(&dimmer).layer_at(1920).unwrap().color,
        Rgba::new(200, 0, 50, 102)
    );
}

#[test]
fn tint_toggled_before_dimming_is_honoured_later() {
    let (_topology, mut dimmer) = enable(1);
    dimmer.handle(tint(MenuTarget::Monitor(MonitorId(0)), true));
    assert!(surface(&dimmer).live.is_empty());

    dimmer.handle(dim(0, 1.0));
    assert_eq!(
        surface(&dimmer).layer_at(0).unwrap().color,
        TintColor::DEFAULT.with_alpha(255)
    );
}

#[test]
fn topology_change_rebuilds_state_and_menu() {
    let (topology, mut dimmer) = enable(2);
    dimmer.handle(global_dim(0.3));
    dimmer.handle(dim(0, 0.9));
    dimmer.handle(dim(1, 0.5));
    set_tint_color(&mut dimmer, 1, 2, 3);

    topology.plug(3);
    dimmer.topology_changed();

    assert!(surface(&dimmer).live.is_empty());
    assert_eq!(surface(&dimmer).destroyed, 2);
    for index in 0..3 {
        assert_eq!(dimmer.manager().overlay_state(MonitorId(index)), None);
    }
    assert_eq!(dimmer.manager().global_dim(), DimLevel::new(0.3));
    assert_eq!(dimmer.manager().tint(), TintColor::new(1, 2, 3));

    let monitor_sliders = dimmer
        .menu()
        .items()
        .iter()
        .filter(|item| {
            matches!(
                item,
                MenuItem::DimSlider {
                    target: MenuTarget::Monitor(_),
                    value,
                    ..
                } if *value == 0.3
            )
        })
        .count();
    assert_eq!(monitor_sliders, 3);
}

#[test]
fn teardown_then_enable_starts_from_defaults() {
    let (topology, mut dimmer) = enable(2);
    dimmer.handle(global_dim(0.5));
    dimmer.handle(dim(0, 0.5));
    set_tint_color(&mut dimmer, 9, 9, 9);

    dimmer.teardown();
    assert!(!topology.subscribed.get());
    assert!(!dimmer.is_enabled());
    assert!(surface(&dimmer).live.is_empty());
    assert_eq!(dimmer.manager().global_dim(), DimLevel::OFF);
    assert_eq!(dimmer.manager().tint(), TintColor::DEFAULT);

    dimmer.topology_changed();
    dimmer.teardown();
    drop(dimmer);

    let fresh = Dimmer::enable(topology.clone(), FakeSurface::default());
    assert!(topology.subscribed.get());
    assert_eq!(fresh.manager().global_dim(), DimLevel::OFF);
    assert_eq!(fresh.manager().tint(), TintColor::new(128, 83, 0));
    assert_eq!(fresh.manager().overlay_count(), 0);
    assert_eq!(fresh.manager().overlay_state(MonitorId(0)), None);
}
