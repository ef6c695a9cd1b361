//! Host-neutral core of dimtint: per-monitor overlay state, the panel menu
//! model, and the adapter that ties widget events to both.

pub mod config;
pub mod dimmer;
pub mod host;
pub mod logging;
pub mod manager;
pub mod menu;
pub mod model;

pub use dimmer::Dimmer;
pub use host::{DisplayTopology, OverlaySurface, TopologySubscription};
pub use manager::OverlayStateManager;
pub use menu::{MenuEvent, MenuItem, MenuTarget, PanelMenu};
pub use model::{
    fraction_to_byte, Channel, DimLevel, MonitorDescriptor, MonitorGeometry, MonitorId,
    OverlayState, Rgba, TintColor,
};
