// Panel layout and hit-testing, derived from the menu model.

use dimtint_shared::{MenuItem, PanelMenu};
use windows::Win32::Foundation::RECT;

use super::theme::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Slider { track: RECT },
    Switch { rect: RECT },
    Separator { y: i32 },
}

/// Placement of one menu item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Row {
    pub item: usize,
    pub top: i32,
    pub control: Control,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Slider { item: usize, track: RECT },
    Switch { item: usize },
}

/// Slider being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Drag {
    pub item: usize,
    pub track: RECT,
}

pub struct UiState {
    pub rows: Vec<Row>,
    pub drag: Option<Drag>,
}

impl UiState {
    pub fn new(menu: &PanelMenu) -> Self {
        Self {
            rows: layout(menu),
            drag: None,
        }
    }

    /// Called after the menu was rebuilt; any drag in progress refers to an
    /// item that no longer exists.
    pub fn relayout(&mut self, menu: &PanelMenu) {
        self.rows = layout(menu);
        self.drag = None;
    }

    pub fn height(&self) -> i32 {
        self.rows
            .last()
            .map(|row| row.top + row_height(&row.control))
            .unwrap_or(HEADER_HEIGHT)
            + PADDING
    }

    pub fn hit_test(&self, x: i32, y: i32) -> Option<Hit> {
        self.rows.iter().find_map(|row| match row.control {
            Control::Slider { track } if point_in_rect(x, y, &slider_hit_rect(&track)) => {
                Some(Hit::Slider {
                    item: row.item,
                    track,
                })
            }
            Control::Switch { rect } if point_in_rect(x, y, &rect) => {
                Some(Hit::Switch { item: row.item })
            }
            _ => None,
        })
    }
}

fn row_height(control: &Control) -> i32 {
    match control {
        Control::Slider { .. } => SLIDER_ROW_HEIGHT,
        Control::Switch { .. } => SWITCH_ROW_HEIGHT,
        Control::Separator { .. } => SEPARATOR_HEIGHT,
    }
}

pub fn layout(menu: &PanelMenu) -> Vec<Row> {
    let left = PADDING;
    let right = PADDING + CONTENT_WIDTH;
    let mut top = PADDING + HEADER_HEIGHT;
    let mut rows = Vec::with_capacity(menu.items().len());

    for (index, item) in menu.items().iter().enumerate() {
        let control = match item {
            MenuItem::Separator => Control::Separator {
                y: top + SEPARATOR_HEIGHT / 2,
            },
            MenuItem::DimSlider { .. } | MenuItem::ChannelSlider { .. } => {
                let track_top = top + SLIDER_ROW_HEIGHT - TRACK_HEIGHT - THUMB_RADIUS - 4;
                Control::Slider {
                    track: RECT {
                        left: left + THUMB_RADIUS,
                        top: track_top,
                        right: right - THUMB_RADIUS,
                        bottom: track_top + TRACK_HEIGHT,
                    },
                }
            }
            MenuItem::TintSwitch { .. } => {
                let switch_top = top + (SWITCH_ROW_HEIGHT - SWITCH_HEIGHT) / 2;
                Control::Switch {
                    rect: RECT {
                        left: right - SWITCH_WIDTH,
                        top: switch_top,
                        right,
                        bottom: switch_top + SWITCH_HEIGHT,
                    },
                }
            }
        };
        rows.push(Row {
            item: index,
            top,
            control,
        });
        top += row_height(&control);
    }
    rows
}

/// Grabbable area around a track: the thumb may hang over either end.
fn slider_hit_rect(track: &RECT) -> RECT {
    RECT {
        left: track.left - THUMB_RADIUS,
        top: track.top - THUMB_RADIUS - 4,
        right: track.right + THUMB_RADIUS,
        bottom: track.bottom + THUMB_RADIUS + 4,
    }
}

pub fn thumb_x(track: &RECT, value: f64) -> i32 {
    let width = track.right - track.left;
    track.left + (value.clamp(0.0, 1.0) * f64::from(width)).round() as i32
}

/// Slider fraction for an x position, clamped to the track.
pub fn value_from_x(track: &RECT, x: i32) -> f64 {
    let width = track.right - track.left;
    if width <= 0 {
        return 0.0;
    }
    let rel_x = (x - track.left).clamp(0, width);
    f64::from(rel_x) / f64::from(width)
}

pub fn point_in_rect(x: i32, y: i32, r: &RECT) -> bool {
    x >= r.left && x < r.right && y >= r.top && y < r.bottom
}
