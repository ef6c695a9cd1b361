// Monitor list from EnumDisplayMonitors. Index = enumeration position.
//
// Topology changes arrive as WM_DISPLAYCHANGE on the panel window, which hands
// them to the dimmer; the subscription token only tracks whether anyone is
// listening.

use dimtint_shared::{DisplayTopology, MonitorDescriptor, TopologySubscription};
use tracing::debug;
use windows::Win32::Foundation::{LPARAM, RECT};
use windows::Win32::Graphics::Gdi::{
    EnumDisplayMonitors, GetMonitorInfoW, HDC, HMONITOR, MONITORINFO, MONITORINFOEXW,
};

#[derive(Debug, Default)]
pub struct Win32Topology {
    issued: u64,
    active: Option<TopologySubscription>,
}

impl DisplayTopology for Win32Topology {
    fn list_monitors(&self) -> Vec<MonitorDescriptor> {
        let monitors = enumerate_monitors();
        debug!(count = monitors.len(), "monitors enumerated");
        monitors
    }

    fn subscribe(&mut self) -> TopologySubscription {
        self.issued += 1;
        let subscription = TopologySubscription(self.issued);
        self.active = Some(subscription);
        subscription
    }

    fn unsubscribe(&mut self, subscription: TopologySubscription) {
        if self.active == Some(subscription) {
            self.active = None;
        }
    }
}

/// `szDevice` up to its terminating NUL.
fn device_name(raw: &[u16]) -> Option<String> {
    let len = raw.iter().position(|&c| c == 0).unwrap_or(raw.len());
    if len == 0 {
        return None;
    }
    Some(String::from_utf16_lossy(&raw[..len]))
}

unsafe extern "system" fn monitor_enum_proc(
    hmonitor: HMONITOR,
    _hdc: HDC,
    _rc_clip: *mut RECT,
    data: LPARAM,
) -> windows::core::BOOL {
    let monitors = &mut *(data.0 as *mut Vec<MonitorDescriptor>);
    let mut info = MONITORINFOEXW::default();
    info.monitorInfo.cbSize = std::mem::size_of::<MONITORINFOEXW>() as u32;

    if GetMonitorInfoW(hmonitor, &mut info as *mut MONITORINFOEXW as *mut MONITORINFO).as_bool() {
        let rc = info.monitorInfo.rcMonitor;
        let descriptor = MonitorDescriptor::new(
            monitors.len(),
            rc.left,
            rc.top,
            rc.right - rc.left,
            rc.bottom - rc.top,
        );
        monitors.push(match device_name(&info.szDevice) {
            Some(name) => descriptor.with_name(name),
            None => descriptor,
        });
    }
    windows::core::BOOL::from(true)
}

fn enumerate_monitors() -> Vec<MonitorDescriptor> {
    let mut monitors: Vec<MonitorDescriptor> = Vec::new();
    unsafe {
        let _ = EnumDisplayMonitors(
            None,
            None,
            Some(monitor_enum_proc),
            LPARAM(&mut monitors as *mut Vec<MonitorDescriptor> as isize),
        );
    }
    monitors
}
