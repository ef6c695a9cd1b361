use windows::Win32::Foundation::COLORREF;

// ── Palette (dark, COLORREF is 0x00BBGGRR) ──────────────────────────────────

/// #030711
pub const CLR_BACKGROUND: COLORREF = COLORREF(0x00110703);

/// #F8FAFC
pub const CLR_FOREGROUND: COLORREF = COLORREF(0x00FCFAF8);

/// Track / switch-off background, #1E293B
pub const CLR_SECONDARY: COLORREF = COLORREF(0x003B291E);

/// Labels and captions, #94A3B8
pub const CLR_MUTED_FG: COLORREF = COLORREF(0x00B8A394);

/// Amber accent, #D97706
pub const CLR_ACCENT: COLORREF = COLORREF(0x000677D9);

pub const CLR_BORDER: COLORREF = CLR_SECONDARY;

pub const CLR_CHANNEL_RED: COLORREF = COLORREF(0x004444EF);
pub const CLR_CHANNEL_GREEN: COLORREF = COLORREF(0x005EC522);
pub const CLR_CHANNEL_BLUE: COLORREF = COLORREF(0x00F6823B);

// ── Layout ──────────────────────────────────────────────────────────────────

pub const WINDOW_WIDTH: i32 = 340;

pub const PADDING: i32 = 20;

pub const CONTENT_WIDTH: i32 = WINDOW_WIDTH - 2 * PADDING;

pub const HEADER_HEIGHT: i32 = 48;

/// Label line above the track plus the track itself.
pub const SLIDER_ROW_HEIGHT: i32 = 46;

pub const SWITCH_ROW_HEIGHT: i32 = 34;

pub const SEPARATOR_HEIGHT: i32 = 17;

pub const TRACK_HEIGHT: i32 = 6;

pub const THUMB_RADIUS: i32 = 8;

pub const SWITCH_WIDTH: i32 = 40;

pub const SWITCH_HEIGHT: i32 = 22;

// ── Fonts (negative = character height) ─────────────────────────────────────

pub const FONT_SIZE_TITLE: i32 = -17;
pub const FONT_SIZE_LABEL: i32 = -12;
pub const FONT_SIZE_CAPTION: i32 = -11;

pub const FONT_NAME: &str = "Segoe UI";
