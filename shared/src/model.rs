// Value types shared by the overlay manager, the panel model and the hosts.

use std::fmt;

/// Position of a monitor in the host's current monitor list.
///
/// Indices are not stable identities: a topology change may hand the same
/// index to a different display. Every holder of a `MonitorId` is rebuilt on
/// topology change, so an id never outlives the snapshot it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonitorId(pub usize);

impl fmt::Display for MonitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0 + 1)
    }
}

/// Monitor rectangle in virtual-desktop pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MonitorGeometry {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorDescriptor {
    pub id: MonitorId,
    pub geometry: MonitorGeometry,
    /// Host device name, used for diagnostics only.
    pub name: Option<String>,
}

impl MonitorDescriptor {
    pub fn new(index: usize, x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            id: MonitorId(index),
            geometry: MonitorGeometry {
                x,
                y,
                width,
                height,
            },
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Fractional overlay opacity in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct DimLevel(f64);

impl DimLevel {
    pub const OFF: DimLevel = DimLevel(0.0);

    /// Clamps into range; NaN becomes 0.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::OFF;
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// `floor(value * 255)`
    pub fn alpha(self) -> u8 {
        fraction_to_byte(self.0)
    }
}

impl From<f64> for DimLevel {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

/// Maps a slider fraction onto `0..=255` by flooring.
pub fn fraction_to_byte(fraction: f64) -> u8 {
    if fraction.is_nan() {
        return 0;
    }
    (fraction.clamp(0.0, 1.0) * 255.0).floor() as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    pub fn label(self) -> &'static str {
        match self {
            Channel::Red => "RED:",
            Channel::Green => "GREEN:",
            Channel::Blue => "BLUE:",
        }
    }
}

/// Shared RGB tint applied to every tint-enabled overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TintColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl TintColor {
    /// Darkened orange.
    pub const DEFAULT: TintColor = TintColor::new(128, 83, 0);

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    pub fn channel(self, channel: Channel) -> u8 {
        match channel {
            Channel::Red => self.red,
            Channel::Green => self.green,
            Channel::Blue => self.blue,
        }
    }

    pub fn with_channel(mut self, channel: Channel, value: u8) -> Self {
        match channel {
            Channel::Red => self.red = value,
            Channel::Green => self.green = value,
            Channel::Blue => self.blue = value,
        }
        self
    }

    pub fn with_alpha(self, alpha: u8) -> Rgba {
        Rgba::new(self.red, self.green, self.blue, alpha)
    }
}

impl Default for TintColor {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Color written to an overlay; `alpha` always carries the overlay opacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Rgba {
    pub const fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    pub const fn black(alpha: u8) -> Self {
        Self::new(0, 0, 0, alpha)
    }
}

/// Per-monitor dim/tint record. Present only for monitors the user touched
/// since the last rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverlayState {
    pub opacity: u8,
    pub tint_enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dim_level_floors_into_alpha() {
        assert_eq!(DimLevel::new(0.0).alpha(), 0);
        assert_eq!(DimLevel::new(0.5).alpha(), 127);
        assert_eq!(DimLevel::new(0.6).alpha(), 153);
        assert_eq!(DimLevel::new(1.0).alpha(), 255);
    }

    #[test]
    fn dim_level_clamps_out_of_range_input() {
        assert_eq!(DimLevel::new(-0.25).value(), 0.0);
        assert_eq!(DimLevel::new(3.0).value(), 1.0);
        assert_eq!(DimLevel::new(f64::NAN), DimLevel::OFF);
    }

    #[test]
    fn tint_channels_update_independently() {
        let tint = TintColor::DEFAULT
            .with_channel(Channel::Green, 200)
            .with_channel(Channel::Blue, 9);
        assert_eq!(tint, TintColor::new(128, 200, 9));
        assert_eq!(tint.channel(Channel::Red), 128);
        assert_eq!(tint.with_alpha(40), Rgba::new(128, 200, 9, 40));
    }

    #[test]
    fn descriptor_name_is_optional() {
        let plain = MonitorDescriptor::new(1, 1920, 0, 1280, 1024);
        assert_eq!(plain.name, None);
        let named = plain.clone().with_name(r"\\.\DISPLAY2");
        assert_eq!(named.name.as_deref(), Some(r"\\.\DISPLAY2"));
        assert_eq!(named.geometry, plain.geometry);
    }

    #[test]
    fn monitor_ids_display_one_based() {
        assert_eq!(MonitorId(0).to_string(), "#1");
        assert_eq!(MonitorId(2).to_string(), "#3");
    }
}
