// Overlay surface backed by layered, click-through, topmost popup windows.
//
// One window per dimmed monitor. The fill color lives in GWLP_USERDATA and is
// painted on WM_PAINT. A layered window has a single alpha, so it is set to the
// overlay opacity scaled by the color alpha, the same product a scene-graph
// compositor gives an actor's opacity over its background color.
//
// SetWindowDisplayAffinity(WDA_EXCLUDEFROMCAPTURE) keeps the overlays out of
// screenshots and recordings unless `allow_capture` is configured.
//
// Z-order: a foreground WinEvent hook stamps the time of the last foreground
// change. The panel's timer calls `reassert_if_settled`, which re-tops the
// overlays once DEBOUNCE_MS pass without another change.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use dimtint_shared::{MonitorGeometry, OverlaySurface, Rgba};
use tracing::{debug, warn};
use windows::core::PCWSTR;
use windows::Win32::Foundation::{COLORREF, HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::Graphics::Gdi::{
    BeginPaint, CreateSolidBrush, DeleteObject, EndPaint, FillRect, InvalidateRect, HGDIOBJ,
    PAINTSTRUCT,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Accessibility::{SetWinEventHook, UnhookWinEvent, HWINEVENTHOOK};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, GetWindowLongPtrW, IsWindow, RegisterClassW,
    SetLayeredWindowAttributes, SetWindowDisplayAffinity, SetWindowLongPtrW, SetWindowPos,
    ShowWindow, CS_HREDRAW, CS_VREDRAW, GWLP_USERDATA, HWND_TOPMOST, LWA_ALPHA, SWP_NOACTIVATE,
    SWP_NOMOVE, SWP_NOSENDCHANGING, SWP_NOSIZE, SW_HIDE, WDA_EXCLUDEFROMCAPTURE, WDA_NONE,
    WM_ERASEBKGND, WM_PAINT, WNDCLASSW, WS_DISABLED, WS_EX_LAYERED, WS_EX_NOACTIVATE,
    WS_EX_TOOLWINDOW, WS_EX_TOPMOST, WS_EX_TRANSPARENT, WS_POPUP, WS_VISIBLE,
};

const CLASS_NAME: &str = "DimtintOverlay\0";

/// Quiet period after the last foreground change before re-topping (ms).
const DEBOUNCE_MS: u64 = 500;

// WinEvent constants
const EVENT_SYSTEM_FOREGROUND: u32 = 0x0003;
const WINEVENT_OUTOFCONTEXT: u32 = 0x0000;
const WINEVENT_SKIPOWNPROCESS: u32 = 0x0002;

static CLASS_REGISTERED: AtomicBool = AtomicBool::new(false);

/// Millis since epoch of the last foreground change; 0 when nothing is pending.
static REASSERT_REQUESTED_AT: AtomicU64 = AtomicU64::new(0);

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn colorref(color: Rgba) -> COLORREF {
    COLORREF(u32::from(color.red) | u32::from(color.green) << 8 | u32::from(color.blue) << 16)
}

/// Opacity times color alpha, rescaled to `0..=255`.
fn layered_alpha(opacity: u8, color_alpha: u8) -> u8 {
    (u16::from(opacity) * u16::from(color_alpha) / 255) as u8
}

unsafe extern "system" fn window_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_PAINT => {
            let mut ps = PAINTSTRUCT::default();
            let hdc = BeginPaint(hwnd, &mut ps);
            let fill = COLORREF(GetWindowLongPtrW(hwnd, GWLP_USERDATA) as u32);
            let brush = CreateSolidBrush(fill);
            FillRect(hdc, &ps.rcPaint, brush);
            let _ = DeleteObject(HGDIOBJ::from(brush));
            let _ = EndPaint(hwnd, &ps);
            LRESULT(0)
        }
        WM_ERASEBKGND => LRESULT(1),
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

fn register_class() -> anyhow::Result<()> {
    if CLASS_REGISTERED.load(Ordering::SeqCst) {
        return Ok(());
    }

    unsafe {
        let hinstance = GetModuleHandleW(PCWSTR::null()).unwrap_or_default();
        let class_name: Vec<u16> = CLASS_NAME.encode_utf16().collect();

        let wc = WNDCLASSW {
            style: CS_HREDRAW | CS_VREDRAW,
            lpfnWndProc: Some(window_proc),
            hInstance: hinstance.into(),
            lpszClassName: PCWSTR(class_name.as_ptr()),
            ..Default::default()
        };

        if RegisterClassW(&wc) == 0 {
            anyhow::bail!("RegisterClassW failed for the overlay class");
        }
    }
    CLASS_REGISTERED.store(true, Ordering::SeqCst);
    Ok(())
}

/// Fired when another process's window takes the foreground; only stamps the
/// time, the actual re-topping waits for the debounce.
unsafe extern "system" fn win_event_proc(
    _hook: HWINEVENTHOOK,
    _event: u32,
    _hwnd: HWND,
    _id_object: i32,
    _id_child: i32,
    _id_event_thread: u32,
    _event_time: u32,
) {
    REASSERT_REQUESTED_AT.store(now_ms(), Ordering::SeqCst);
}

#[derive(Debug, Clone, Copy)]
struct Paint {
    opacity: u8,
    color: Rgba,
}

/// Handle to one overlay window.
#[derive(Debug)]
pub struct OverlayWindow {
    hwnd: HWND,
}

pub struct Win32Surface {
    allow_capture: bool,
    paints: HashMap<isize, Paint>,
    hook: Option<HWINEVENTHOOK>,
}

impl Win32Surface {
    pub fn new(allow_capture: bool) -> Self {
        Self {
            allow_capture,
            paints: HashMap::new(),
            hook: None,
        }
    }

    /// Re-tops the overlays if a foreground change has settled.
    pub fn reassert_if_settled(&self) {
        let requested_at = REASSERT_REQUESTED_AT.load(Ordering::SeqCst);
        if requested_at == 0 || now_ms().saturating_sub(requested_at) < DEBOUNCE_MS {
            return;
        }
        REASSERT_REQUESTED_AT.store(0, Ordering::SeqCst);
        self.reassert_topmost();
    }

    fn reassert_topmost(&self) {
        for key in self.paints.keys() {
            let hwnd = HWND(*key as *mut std::ffi::c_void);
            unsafe {
                if IsWindow(Some(hwnd)).as_bool() {
                    let _ = SetWindowPos(
                        hwnd,
                        Some(HWND_TOPMOST),
                        0,
                        0,
                        0,
                        0,
                        SWP_NOMOVE | SWP_NOSIZE | SWP_NOACTIVATE | SWP_NOSENDCHANGING,
                    );
                }
            }
        }
    }

    fn install_event_hook(&mut self) {
        if self.hook.is_some() {
            return;
        }
        let hook = unsafe {
            SetWinEventHook(
                EVENT_SYSTEM_FOREGROUND,
                EVENT_SYSTEM_FOREGROUND,
                None,
                Some(win_event_proc),
                0,
                0,
                WINEVENT_OUTOFCONTEXT | WINEVENT_SKIPOWNPROCESS,
            )
        };
        if hook.is_invalid() {
            warn!("foreground hook unavailable, overlays may drop below other topmost windows");
        } else {
            self.hook = Some(hook);
        }
    }

    fn uninstall_event_hook(&mut self) {
        if let Some(hook) = self.hook.take() {
            unsafe {
                let _ = UnhookWinEvent(hook);
            }
        }
        REASSERT_REQUESTED_AT.store(0, Ordering::SeqCst);
    }

    fn apply(&self, hwnd: HWND, paint: Paint) {
        let alpha = layered_alpha(paint.opacity, paint.color.alpha);
        unsafe {
            let _ = SetLayeredWindowAttributes(hwnd, COLORREF(0), alpha, LWA_ALPHA);
        }
    }
}

impl OverlaySurface for Win32Surface {
    type Handle = OverlayWindow;

    fn create_overlay(
        &mut self,
        geometry: &MonitorGeometry,
        initial: Rgba,
    ) -> anyhow::Result<OverlayWindow> {
        register_class()?;

        let hwnd = unsafe {
            let hinstance = GetModuleHandleW(PCWSTR::null()).unwrap_or_default();
            let class_name: Vec<u16> = CLASS_NAME.encode_utf16().collect();
            CreateWindowExW(
                WS_EX_LAYERED
                    | WS_EX_TRANSPARENT
                    | WS_EX_TOPMOST
                    | WS_EX_TOOLWINDOW
                    | WS_EX_NOACTIVATE,
                PCWSTR(class_name.as_ptr()),
                PCWSTR::null(),
                WS_POPUP | WS_VISIBLE | WS_DISABLED,
                geometry.x,
                geometry.y,
                geometry.width,
                geometry.height,
                None,
                None,
                Some(hinstance.into()),
                None,
            )
        }
        .context("CreateWindowExW failed for an overlay window")?;

        let paint = Paint {
            opacity: 0,
            color: initial,
        };
        unsafe {
            SetWindowLongPtrW(hwnd, GWLP_USERDATA, colorref(initial).0 as isize);
        }
        self.apply(hwnd, paint);

        let affinity = if self.allow_capture {
            WDA_NONE
        } else {
            WDA_EXCLUDEFROMCAPTURE
        };
        unsafe {
            if SetWindowDisplayAffinity(hwnd, affinity).is_err() {
                debug!("display affinity not applied to overlay");
            }
            let _ = SetWindowPos(
                hwnd,
                Some(HWND_TOPMOST),
                0,
                0,
                0,
                0,
                SWP_NOMOVE | SWP_NOSIZE | SWP_NOACTIVATE | SWP_NOSENDCHANGING,
            );
        }

        self.paints.insert(hwnd.0 as isize, paint);
        self.install_event_hook();
        Ok(OverlayWindow { hwnd })
    }

    fn set_opacity(&mut self, overlay: &OverlayWindow, opacity: u8) {
        let Some(paint) = self.paints.get_mut(&(overlay.hwnd.0 as isize)) else {
            return;
        };
        paint.opacity = opacity;
        let paint = *paint;
        self.apply(overlay.hwnd, paint);
        // explicit user action
        self.reassert_topmost();
    }

    fn set_color(&mut self, overlay: &OverlayWindow, color: Rgba) {
        let Some(paint) = self.paints.get_mut(&(overlay.hwnd.0 as isize)) else {
            return;
        };
        paint.color = color;
        let paint = *paint;
        unsafe {
            SetWindowLongPtrW(overlay.hwnd, GWLP_USERDATA, colorref(color).0 as isize);
            let _ = InvalidateRect(Some(overlay.hwnd), None, false);
        }
        self.apply(overlay.hwnd, paint);
    }

    fn destroy_overlay(&mut self, overlay: OverlayWindow) {
        self.paints.remove(&(overlay.hwnd.0 as isize));
        unsafe {
            let _ = ShowWindow(overlay.hwnd, SW_HIDE);
            let _ = DestroyWindow(overlay.hwnd);
        }
        if self.paints.is_empty() {
            self.uninstall_event_hook();
        }
    }
}

impl Drop for Win32Surface {
    fn drop(&mut self) {
        self.uninstall_event_hook();
    }
}
