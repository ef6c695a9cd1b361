pub mod controls;
pub mod painting;
pub mod theme;

use controls::*;
use theme::*;

use crate::display::Win32Topology;
use crate::overlay::Win32Surface;
use crate::tray;

use anyhow::Context;
use dimtint_shared::{Dimmer, MenuEvent};
use tracing::{debug, info};
use windows::core::PCWSTR;
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, RECT, WPARAM};
use windows::Win32::Graphics::Gdi::*;
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Input::KeyboardAndMouse::{ReleaseCapture, SetCapture};
use windows::Win32::UI::WindowsAndMessaging::*;

pub type PanelDimmer = Dimmer<Win32Topology, Win32Surface>;

const CLASS_NAME: &str = "DimtintPanelWnd\0";
const ZORDER_TIMER_ID: usize = 100;
const ZORDER_POLL_MS: u32 = 200;

/// State behind the panel window, owned through WND_STATE.
struct WndState {
    ui: UiState,
    dimmer: PanelDimmer,
}

// Set once the window exists, cleared on WM_DESTROY.
static mut WND_STATE: *mut WndState = std::ptr::null_mut();

fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn panel_style() -> WINDOW_STYLE {
    WS_OVERLAPPED | WS_CAPTION | WS_SYSMENU
}

/// Outer window size for a client area of `WINDOW_WIDTH` x `client_height`.
fn window_size(client_height: i32) -> (i32, i32) {
    let mut wr = RECT {
        left: 0,
        top: 0,
        right: WINDOW_WIDTH,
        bottom: client_height,
    };
    unsafe {
        let _ = AdjustWindowRectEx(&mut wr, panel_style(), false, WINDOW_EX_STYLE::default());
    }
    (wr.right - wr.left, wr.bottom - wr.top)
}

/// Creates the panel window (initially hidden) and takes ownership of the dimmer.
pub fn create_window(dimmer: PanelDimmer) -> anyhow::Result<HWND> {
    let class_name = wide(CLASS_NAME);
    let ui = UiState::new(dimmer.menu());
    let (win_w, win_h) = window_size(ui.height());

    let hwnd = unsafe {
        let hinstance = GetModuleHandleW(PCWSTR::null()).unwrap_or_default();
        let wc = WNDCLASSW {
            style: CS_HREDRAW | CS_VREDRAW,
            lpfnWndProc: Some(wnd_proc),
            hInstance: hinstance.into(),
            lpszClassName: PCWSTR(class_name.as_ptr()),
            hbrBackground: CreateSolidBrush(CLR_BACKGROUND),
            hCursor: LoadCursorW(None, IDC_ARROW).unwrap_or_default(),
            hIcon: LoadIconW(None, IDI_APPLICATION).unwrap_or_default(),
            ..Default::default()
        };
        if RegisterClassW(&wc) == 0 {
            anyhow::bail!("RegisterClassW failed for the panel class");
        }

        let title = wide("dimtint");
        CreateWindowExW(
            WS_EX_TOOLWINDOW,
            PCWSTR(class_name.as_ptr()),
            PCWSTR(title.as_ptr()),
            panel_style(),
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            win_w,
            win_h,
            None,
            None,
            Some(hinstance.into()),
            None,
        )
        .context("CreateWindowExW failed for the panel")?
    };

    unsafe {
        WND_STATE = Box::into_raw(Box::new(WndState { ui, dimmer }));
        SetTimer(Some(hwnd), ZORDER_TIMER_ID, ZORDER_POLL_MS, None);
    }
    Ok(hwnd)
}

pub fn show_window(hwnd: HWND) {
    unsafe {
        let _ = ShowWindow(hwnd, SW_SHOW);
        let _ = SetForegroundWindow(hwnd);
    }
}

fn hide_window(hwnd: HWND) {
    unsafe {
        let _ = ShowWindow(hwnd, SW_HIDE);
    }
}

fn toggle_window(hwnd: HWND) {
    if unsafe { IsWindowVisible(hwnd) }.as_bool() {
        hide_window(hwnd);
    } else {
        show_window(hwnd);
    }
}

fn invalidate(hwnd: HWND) {
    unsafe {
        let _ = InvalidateRect(Some(hwnd), None, true);
    }
}

fn resize_to_fit(hwnd: HWND, ui: &UiState) {
    let (w, h) = window_size(ui.height());
    unsafe {
        let _ = SetWindowPos(
            hwnd,
            None,
            0,
            0,
            w,
            h,
            SWP_NOMOVE | SWP_NOZORDER | SWP_NOACTIVATE,
        );
    }
}

fn mouse_pos(lparam: LPARAM) -> (i32, i32) {
    let x = (lparam.0 & 0xFFFF) as i16 as i32;
    let y = ((lparam.0 >> 16) & 0xFFFF) as i16 as i32;
    (x, y)
}

/// Feeds the dragged slider's new position to the dimmer.
fn drag_to(state: &mut WndState, hwnd: HWND, drag: Drag, x: i32) {
    let value = value_from_x(&drag.track, x);
    let event = state
        .dimmer
        .menu()
        .item(drag.item)
        .and_then(|item| MenuEvent::from_slider(item, value));
    if let Some(event) = event {
        state.dimmer.handle(event);
        invalidate(hwnd);
    }
}

/// Detaches the panel state; later messages fall through to DefWindowProcW.
fn take_state() -> Option<Box<WndState>> {
    unsafe {
        let raw = WND_STATE;
        WND_STATE = std::ptr::null_mut();
        if raw.is_null() {
            None
        } else {
            Some(Box::from_raw(raw))
        }
    }
}

fn destroy_panel(hwnd: HWND) {
    unsafe {
        let _ = KillTimer(Some(hwnd), ZORDER_TIMER_ID);
    }
    tray::remove_tray_icon(hwnd);
    if let Some(mut owned) = take_state() {
        owned.dimmer.teardown();
    }
    debug!("panel destroyed");
    unsafe { PostQuitMessage(0) };
}

unsafe extern "system" fn wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    // Must run before any borrow of WND_STATE is taken
    if msg == WM_DESTROY {
        destroy_panel(hwnd);
        return LRESULT(0);
    }

    let Some(state) = WND_STATE.as_mut() else {
        return DefWindowProcW(hwnd, msg, wparam, lparam);
    };

    match msg {
        WM_PAINT => {
            let mut ps = PAINTSTRUCT::default();
            let hdc = BeginPaint(hwnd, &mut ps);

            // Double-buffer to avoid flicker while dragging
            let mut client = RECT::default();
            let _ = GetClientRect(hwnd, &mut client);

            let mem_dc = CreateCompatibleDC(Some(hdc));
            let mem_bmp = CreateCompatibleBitmap(hdc, client.right, client.bottom);
            let old_bmp = SelectObject(mem_dc, HGDIOBJ::from(mem_bmp));

            painting::paint(mem_dc, &client, state.dimmer.menu(), &state.ui);

            let _ = BitBlt(
                hdc,
                0,
                0,
                client.right,
                client.bottom,
                Some(mem_dc),
                0,
                0,
                SRCCOPY,
            );

            SelectObject(mem_dc, old_bmp);
            let _ = DeleteObject(HGDIOBJ::from(mem_bmp));
            let _ = DeleteDC(mem_dc);
            let _ = EndPaint(hwnd, &ps);
            LRESULT(0)
        }

        WM_LBUTTONDOWN => {
            let (x, y) = mouse_pos(lparam);
            match state.ui.hit_test(x, y) {
                Some(Hit::Slider { item, track }) => {
                    let drag = Drag { item, track };
                    state.ui.drag = Some(drag);
                    SetCapture(hwnd);
                    drag_to(state, hwnd, drag, x);
                }
                Some(Hit::Switch { item }) => {
                    let event = state
                        .dimmer
                        .menu()
                        .item(item)
                        .and_then(MenuEvent::from_switch);
                    if let Some(event) = event {
                        state.dimmer.handle(event);
                        invalidate(hwnd);
                    }
                }
                None => {}
            }
            LRESULT(0)
        }

        WM_MOUSEMOVE => {
            if let Some(drag) = state.ui.drag {
                let (x, _) = mouse_pos(lparam);
                drag_to(state, hwnd, drag, x);
            }
            LRESULT(0)
        }

        WM_LBUTTONUP => {
            if state.ui.drag.take().is_some() {
                let _ = ReleaseCapture();
            }
            LRESULT(0)
        }

        WM_CAPTURECHANGED => {
            state.ui.drag = None;
            LRESULT(0)
        }

        WM_DISPLAYCHANGE => {
            info!("display configuration changed");
            state.dimmer.topology_changed();
            state.ui.relayout(state.dimmer.menu());
            resize_to_fit(hwnd, &state.ui);
            invalidate(hwnd);
            DefWindowProcW(hwnd, msg, wparam, lparam)
        }

        WM_TIMER => {
            if wparam.0 == ZORDER_TIMER_ID {
                state.dimmer.surface_mut().reassert_if_settled();
            }
            LRESULT(0)
        }

        WM_COMMAND => {
            match (wparam.0 & 0xFFFF) as u32 {
                tray::IDM_SHOW_PANEL => show_window(hwnd),
                tray::IDM_QUIT => {
                    let _ = DestroyWindow(hwnd);
                }
                _ => {}
            }
            LRESULT(0)
        }

        tray::WM_TRAY_ICON => {
            match (lparam.0 & 0xFFFF) as u32 {
                WM_LBUTTONUP => toggle_window(hwnd),
                WM_RBUTTONUP => tray::show_context_menu(hwnd),
                _ => {}
            }
            LRESULT(0)
        }

        WM_CLOSE => {
            // Hide to tray instead of quitting
            hide_window(hwnd);
            LRESULT(0)
        }

        // Painted in WM_PAINT
        WM_ERASEBKGND => LRESULT(1),

        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}
