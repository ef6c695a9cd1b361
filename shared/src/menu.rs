// Panel menu model: what the host panel shows, independent of how it draws.

use crate::model::{Channel, DimLevel, MonitorDescriptor, MonitorId, TintColor};

/// Which overlay(s) a dim slider or tint switch drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuTarget {
    Global,
    Monitor(MonitorId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum MenuItem {
    Separator,
    DimSlider {
        label: String,
        target: MenuTarget,
        value: f64,
    },
    TintSwitch {
        label: String,
        target: MenuTarget,
        on: bool,
    },
    ChannelSlider {
        channel: Channel,
        value: f64,
    },
}

impl MenuItem {
    pub fn label(&self) -> &str {
        match self {
            MenuItem::Separator => "",
            MenuItem::DimSlider { label, .. } | MenuItem::TintSwitch { label, .. } => label,
            MenuItem::ChannelSlider { channel, .. } => channel.label(),
        }
    }
}

/// Value-changed notification coming from a panel widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MenuEvent {
    DimChanged { target: MenuTarget, value: f64 },
    TintToggled { target: MenuTarget, enabled: bool },
    ChannelChanged { channel: Channel, value: f64 },
}

impl MenuEvent {
    /// Event a slider item emits when dragged to `value`.
    pub fn from_slider(item: &MenuItem, value: f64) -> Option<Self> {
        match *item {
            MenuItem::DimSlider { target, .. } => Some(MenuEvent::DimChanged { target, value }),
            MenuItem::ChannelSlider { channel, .. } => {
                Some(MenuEvent::ChannelChanged { channel, value })
            }
            _ => None,
        }
    }

    /// Event a switch item emits when clicked.
    pub fn from_switch(item: &MenuItem) -> Option<Self> {
        match *item {
            MenuItem::TintSwitch { target, on, .. } => Some(MenuEvent::TintToggled {
                target,
                enabled: !on,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PanelMenu {
    items: Vec<MenuItem>,
}

impl PanelMenu {
    pub fn build(monitors: &[MonitorDescriptor], global_dim: DimLevel, tint: TintColor) -> Self {
        let mut items = vec![
            MenuItem::DimSlider {
                label: "Global Dimming".into(),
                target: MenuTarget::Global,
                value: global_dim.value(),
            },
            MenuItem::TintSwitch {
                label: "Global Color Switch".into(),
                target: MenuTarget::Global,
                on: false,
            },
            MenuItem::Separator,
        ];

        for monitor in monitors {
            items.push(MenuItem::DimSlider {
                label: format!("Monitor {}", monitor.id),
                target: MenuTarget::Monitor(monitor.id),
                value: global_dim.value(),
            });
            items.push(MenuItem::TintSwitch {
                label: "Color Switch".into(),
                target: MenuTarget::Monitor(monitor.id),
                on: false,
            });
        }

        items.push(MenuItem::Separator);
        for channel in Channel::ALL {
            items.push(MenuItem::ChannelSlider {
                channel,
                value: f64::from(tint.channel(channel)) / 255.0,
            });
        }

        Self { items }
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Option<&MenuItem> {
        self.items.get(index)
    }

    /// Position of the tint switch driving `target`.
    pub fn tint_switch(&self, target: MenuTarget) -> Option<bool> {
        self.items.iter().find_map(|item| match *item {
            MenuItem::TintSwitch {
                target: switch, on, ..
            } if switch == target => Some(on),
            _ => None,
        })
    }

    /// Records a widget's new position without emitting anything.
    pub fn record(&mut self, event: &MenuEvent) {
        for item in &mut self.items {
            match (item, event) {
                (
                    MenuItem::DimSlider { target, value, .. },
                    MenuEvent::DimChanged {
                        target: changed,
                        value: new,
                    },
                ) if *target == *changed => *value = *new,
                (
                    MenuItem::TintSwitch { target, on, .. },
                    MenuEvent::TintToggled {
                        target: changed,
                        enabled,
                    },
                ) if *target == *changed => *on = *enabled,
                (
                    MenuItem::ChannelSlider { channel, value },
                    MenuEvent::ChannelChanged {
                        channel: changed,
                        value: new,
                    },
                ) if *channel == *changed => *value = *new,
                _ => {}
            }
        }
    }

    /// Moves every dim slider handle, global and per-monitor, to `level`.
    pub fn reflect_global_dim(&mut self, level: DimLevel) {
        for item in &mut self.items {
            if let MenuItem::DimSlider { value, .. } = item {
                *value = level.value();
            }
        }
    }

    /// Sets every tint switch, global and per-monitor, to `on`.
    pub fn reflect_global_tint(&mut self, enabled: bool) {
        for item in &mut self.items {
            if let MenuItem::TintSwitch { on, .. } = item {
                *on = enabled;
            }
        }
    }
}
