// Prevents console window in release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

#[cfg(windows)]
mod display;
#[cfg(windows)]
mod overlay;
#[cfg(windows)]
mod tray;
#[cfg(windows)]
mod ui;

use dimtint_shared::{config, logging};

#[cfg(windows)]
const SINGLE_INSTANCE_MUTEX: &str = "dimtintSingleInstance\0";

#[cfg(windows)]
fn main() -> anyhow::Result<()> {
    use dimtint_shared::Dimmer;
    use windows::Win32::UI::WindowsAndMessaging::{
        DispatchMessageW, GetMessageW, TranslateMessage, MSG,
    };

    let loaded = config::try_load_config_from(&config::config_path());
    let cfg = loaded.as_ref().cloned().unwrap_or_default();
    logging::init(cfg.debug_logging);
    if let Err(err) = &loaded {
        tracing::warn!("{err:#}, using defaults");
    }

    if is_already_running() {
        tracing::info!("another instance is already running");
        return Ok(());
    }

    let dimmer = Dimmer::enable(
        display::Win32Topology::default(),
        overlay::Win32Surface::new(cfg.allow_capture),
    );
    let hwnd = ui::create_window(dimmer)?;

    if !tray::add_tray_icon(hwnd) {
        tracing::warn!("tray icon could not be added");
    }

    ui::show_window(hwnd);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "dimtint running");

    // Win32 message loop; WM_DESTROY tears the dimmer down
    unsafe {
        let mut msg = MSG::default();
        while GetMessageW(&mut msg, None, 0, 0).as_bool() {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }

    tracing::info!("dimtint stopped");
    Ok(())
}

#[cfg(not(windows))]
fn main() -> anyhow::Result<()> {
    let cfg = config::load_config();
    logging::init(cfg.debug_logging);
    anyhow::bail!("dimtint needs a Windows desktop to place overlays on")
}

/// Check if another instance is already running
#[cfg(windows)]
fn is_already_running() -> bool {
    use windows::core::PCWSTR;
    use windows::Win32::System::Threading::{
        CreateMutexW, OpenMutexW, SYNCHRONIZATION_ACCESS_RIGHTS,
    };

    let name: Vec<u16> = SINGLE_INSTANCE_MUTEX.encode_utf16().collect();

    unsafe {
        let existing = OpenMutexW(
            SYNCHRONIZATION_ACCESS_RIGHTS(0x001F0001), // MUTEX_ALL_ACCESS
            false,
            PCWSTR(name.as_ptr()),
        );
        if existing.is_ok() {
            return true;
        }

        // Held for the life of the process
        let _ = CreateMutexW(None, true, PCWSTR(name.as_ptr()));
        false
    }
}
