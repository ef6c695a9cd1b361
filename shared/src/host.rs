// Seams to the host desktop: where monitors come from and where overlays go.

use crate::model::{MonitorDescriptor, MonitorGeometry, Rgba};

/// Token returned by [`DisplayTopology::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopologySubscription(pub u64);

/// Source of the monitor list.
///
/// The host delivers topology changes by calling
/// [`Dimmer::topology_changed`](crate::dimmer::Dimmer::topology_changed) while
/// a subscription is held; the dimmer re-queries `list_monitors` from there.
pub trait DisplayTopology {
    fn list_monitors(&self) -> Vec<MonitorDescriptor>;

    fn subscribe(&mut self) -> TopologySubscription;

    fn unsubscribe(&mut self, subscription: TopologySubscription);
}

/// Compositor-side translucent layers, one per dimmed monitor.
pub trait OverlaySurface {
    type Handle;

    /// Creates a full-screen layer at `geometry`, fully transparent until the
    /// first `set_opacity`.
    fn create_overlay(
        &mut self,
        geometry: &MonitorGeometry,
        initial: Rgba,
    ) -> anyhow::Result<Self::Handle>;

    fn set_opacity(&mut self, overlay: &Self::Handle, opacity: u8);

    fn set_color(&mut self, overlay: &Self::Handle, color: Rgba);

    fn destroy_overlay(&mut self, overlay: Self::Handle);
}
