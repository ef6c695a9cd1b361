// GDI owner-draw rendering of the panel menu.

use super::controls::*;
use super::theme::*;
use dimtint_shared::{fraction_to_byte, Channel, MenuItem, PanelMenu};
use windows::Win32::Foundation::{COLORREF, RECT, SIZE};
use windows::Win32::Graphics::Gdi::*;

struct Fonts {
    title: HFONT,
    label: HFONT,
    caption: HFONT,
}

impl Fonts {
    fn create() -> Self {
        Self {
            title: create_font(FONT_SIZE_TITLE, 600, FONT_NAME),
            label: create_font(FONT_SIZE_LABEL, 500, FONT_NAME),
            caption: create_font(FONT_SIZE_CAPTION, 400, FONT_NAME),
        }
    }
}

impl Drop for Fonts {
    fn drop(&mut self) {
        unsafe {
            let _ = DeleteObject(HGDIOBJ::from(self.title));
            let _ = DeleteObject(HGDIOBJ::from(self.label));
            let _ = DeleteObject(HGDIOBJ::from(self.caption));
        }
    }
}

fn create_font(size: i32, weight: i32, family: &str) -> HFONT {
    let face: Vec<u16> = family.encode_utf16().chain(std::iter::once(0)).collect();
    let mut lf = LOGFONTW {
        lfHeight: size,
        lfWeight: weight,
        lfQuality: CLEARTYPE_QUALITY,
        lfCharSet: DEFAULT_CHARSET,
        ..Default::default()
    };
    let len = face.len().min(lf.lfFaceName.len());
    lf.lfFaceName[..len].copy_from_slice(&face[..len]);
    unsafe { CreateFontIndirectW(&lf) }
}

/// Thin wrapper over a device context with the panel's fonts selected on demand.
struct Painter {
    hdc: HDC,
    fonts: Fonts,
}

impl Painter {
    fn fill(&self, r: &RECT, color: COLORREF) {
        unsafe {
            let brush = CreateSolidBrush(color);
            FillRect(self.hdc, r, brush);
            let _ = DeleteObject(HGDIOBJ::from(brush));
        }
    }

    fn rounded(&self, r: &RECT, radius: i32, fill: COLORREF) {
        unsafe {
            let brush = CreateSolidBrush(fill);
            let pen = CreatePen(PS_SOLID, 1, fill);
            let old_brush = SelectObject(self.hdc, HGDIOBJ::from(brush));
            let old_pen = SelectObject(self.hdc, HGDIOBJ::from(pen));
            let _ = RoundRect(self.hdc, r.left, r.top, r.right, r.bottom, radius, radius);
            SelectObject(self.hdc, old_pen);
            SelectObject(self.hdc, old_brush);
            let _ = DeleteObject(HGDIOBJ::from(brush));
            let _ = DeleteObject(HGDIOBJ::from(pen));
        }
    }

    fn circle(&self, cx: i32, cy: i32, r: i32, color: COLORREF) {
        self.rounded(
            &RECT {
                left: cx - r,
                top: cy - r,
                right: cx + r,
                bottom: cy + r,
            },
            2 * r,
            color,
        );
    }

    fn hline(&self, left: i32, right: i32, y: i32, color: COLORREF) {
        unsafe {
            let pen = CreatePen(PS_SOLID, 1, color);
            let old = SelectObject(self.hdc, HGDIOBJ::from(pen));
            let _ = MoveToEx(self.hdc, left, y, None);
            let _ = LineTo(self.hdc, right, y);
            SelectObject(self.hdc, old);
            let _ = DeleteObject(HGDIOBJ::from(pen));
        }
    }

    fn measure(&self, text: &str, font: HFONT) -> SIZE {
        let wide: Vec<u16> = text.encode_utf16().collect();
        let mut size = SIZE::default();
        unsafe {
            let old = SelectObject(self.hdc, HGDIOBJ::from(font));
            let _ = GetTextExtentPoint32W(self.hdc, &wide, &mut size);
            SelectObject(self.hdc, old);
        }
        size
    }

    fn text(&self, text: &str, x: i32, y: i32, color: COLORREF, font: HFONT) {
        let wide: Vec<u16> = text.encode_utf16().collect();
        unsafe {
            let old = SelectObject(self.hdc, HGDIOBJ::from(font));
            SetTextColor(self.hdc, color);
            SetBkMode(self.hdc, TRANSPARENT);
            let _ = TextOutW(self.hdc, x, y, &wide);
            SelectObject(self.hdc, old);
        }
    }

    fn text_right(&self, text: &str, right: i32, y: i32, color: COLORREF, font: HFONT) {
        let size = self.measure(text, font);
        self.text(text, right - size.cx, y, color, font);
    }
}

pub fn paint(hdc: HDC, client: &RECT, menu: &PanelMenu, ui: &UiState) {
    let p = Painter {
        hdc,
        fonts: Fonts::create(),
    };
    p.fill(client, CLR_BACKGROUND);
    draw_header(&p);

    for row in &ui.rows {
        let Some(item) = menu.item(row.item) else {
            continue;
        };
        match (item, row.control) {
            (MenuItem::Separator, Control::Separator { y }) => {
                p.hline(PADDING, PADDING + CONTENT_WIDTH, y, CLR_BORDER);
            }
            (MenuItem::DimSlider { label, value, .. }, Control::Slider { track }) => {
                let badge = format!("{}%", (value * 100.0).round() as i32);
                draw_slider(&p, row.top, label, &badge, *value, &track, CLR_ACCENT);
            }
            (MenuItem::ChannelSlider { channel, value }, Control::Slider { track }) => {
                let badge = fraction_to_byte(*value).to_string();
                let fill = channel_color(*channel);
                draw_slider(&p, row.top, channel.label(), &badge, *value, &track, fill);
            }
            (MenuItem::TintSwitch { label, on, .. }, Control::Switch { rect }) => {
                let size = p.measure(label, p.fonts.label);
                let y = rect.top + (rect.bottom - rect.top - size.cy) / 2;
                p.text(label, PADDING, y, CLR_FOREGROUND, p.fonts.label);
                draw_switch(&p, &rect, *on);
            }
            _ => {}
        }
    }
}

fn channel_color(channel: Channel) -> COLORREF {
    match channel {
        Channel::Red => CLR_CHANNEL_RED,
        Channel::Green => CLR_CHANNEL_GREEN,
        Channel::Blue => CLR_CHANNEL_BLUE,
    }
}

fn draw_header(p: &Painter) {
    let right = PADDING + CONTENT_WIDTH;
    p.text("dimtint", PADDING, PADDING, CLR_FOREGROUND, p.fonts.title);
    p.text_right(
        "Per-monitor dimming",
        right,
        PADDING + 4,
        CLR_MUTED_FG,
        p.fonts.caption,
    );
    p.hline(PADDING, right, PADDING + HEADER_HEIGHT - 12, CLR_BORDER);
}

fn draw_slider(
    p: &Painter,
    top: i32,
    label: &str,
    badge: &str,
    value: f64,
    track: &RECT,
    fill: COLORREF,
) {
    p.text(label, PADDING, top + 2, CLR_FOREGROUND, p.fonts.label);
    p.text_right(
        badge,
        PADDING + CONTENT_WIDTH,
        top + 3,
        CLR_MUTED_FG,
        p.fonts.caption,
    );

    p.rounded(track, TRACK_HEIGHT, CLR_SECONDARY);
    let thumb = thumb_x(track, value);
    if thumb > track.left {
        let filled = RECT {
            right: thumb,
            ..*track
        };
        p.rounded(&filled, TRACK_HEIGHT, fill);
    }
    p.circle(
        thumb,
        track.top + TRACK_HEIGHT / 2,
        THUMB_RADIUS,
        CLR_FOREGROUND,
    );
}

fn draw_switch(p: &Painter, rect: &RECT, on: bool) {
    let height = rect.bottom - rect.top;
    let track = if on { CLR_ACCENT } else { CLR_SECONDARY };
    p.rounded(rect, height, track);

    let knob_r = height / 2 - 2;
    let knob_x = if on {
        rect.right - 2 - knob_r
    } else {
        rect.left + 2 + knob_r
    };
    p.circle(knob_x, rect.top + height / 2, knob_r, CLR_FOREGROUND);
}
