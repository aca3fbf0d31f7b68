//! Windows platform implementation.
//!
//! CCD (`QueryDisplayConfig`/`SetDisplayConfig`) for topology and GDI device
//! enumeration for counting displays, via the `windows` crate.

use windows::Win32::Devices::Display::{
    DISPLAYCONFIG_MODE_INFO, DISPLAYCONFIG_PATH_INFO, DISPLAYCONFIG_TOPOLOGY_ID,
    GetDisplayConfigBufferSizes, QDC_DATABASE_CURRENT, QueryDisplayConfig, SDC_APPLY,
    SET_DISPLAY_CONFIG_FLAGS, SetDisplayConfig,
};
use windows::Win32::Foundation::{ERROR_SUCCESS, WIN32_ERROR};
use windows::Win32::Graphics::Gdi::{
    DEVMODEW, DISPLAY_DEVICEW, ENUM_DISPLAY_SETTINGS_MODE, EnumDisplayDevicesW,
    EnumDisplaySettingsW,
};
use windows::core::PCWSTR;

use crate::device::{DeviceStateFlags, DisplayDevice};
use crate::error::OsStatus;
use crate::os::DisplayConfigApi;
use crate::topology::TopologyId;

fn to_wide_string(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn from_wide_buffer(buf: &[u16]) -> String {
    let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..len])
}

fn check(status: WIN32_ERROR) -> Result<(), OsStatus> {
    if status == ERROR_SUCCESS {
        Ok(())
    } else {
        Err(OsStatus(status.0 as i32))
    }
}

pub struct WinDisplayConfig;

impl WinDisplayConfig {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WinDisplayConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayConfigApi for WinDisplayConfig {
    type PathInfo = DISPLAYCONFIG_PATH_INFO;
    type ModeInfo = DISPLAYCONFIG_MODE_INFO;

    fn buffer_sizes(&self) -> Result<(u32, u32), OsStatus> {
        let mut path_count: u32 = 0;
        let mut mode_count: u32 = 0;
        let status = unsafe {
            GetDisplayConfigBufferSizes(QDC_DATABASE_CURRENT, &mut path_count, &mut mode_count)
        };
        check(status)?;
        Ok((path_count, mode_count))
    }

    fn query_config(
        &self,
        paths: &mut [DISPLAYCONFIG_PATH_INFO],
        modes: &mut [DISPLAYCONFIG_MODE_INFO],
        topology: &mut TopologyId,
    ) -> Result<(), OsStatus> {
        let mut path_count = paths.len() as u32;
        let mut mode_count = modes.len() as u32;
        let mut raw = DISPLAYCONFIG_TOPOLOGY_ID(topology.0 as i32);

        let status = unsafe {
            QueryDisplayConfig(
                QDC_DATABASE_CURRENT,
                &mut path_count,
                paths.as_mut_ptr(),
                &mut mode_count,
                modes.as_mut_ptr(),
                Some(&mut raw as *mut _),
            )
        };

        // Whatever the OS wrote is handed back, even on failure.
        *topology = TopologyId(raw.0 as u32);
        check(status)
    }

    fn apply_topology(&self, topology: TopologyId) -> Result<(), OsStatus> {
        let flags = SDC_APPLY | SET_DISPLAY_CONFIG_FLAGS(topology.0);
        let status = unsafe { SetDisplayConfig(None, None, flags) };
        if status == ERROR_SUCCESS.0 as i32 {
            Ok(())
        } else {
            Err(OsStatus(status))
        }
    }

    fn display_device(&self, index: u32) -> Option<DisplayDevice> {
        let mut device = DISPLAY_DEVICEW {
            cb: std::mem::size_of::<DISPLAY_DEVICEW>() as u32,
            ..Default::default()
        };

        let found = unsafe { EnumDisplayDevicesW(PCWSTR::null(), index, &mut device, 0) };
        if !found.as_bool() {
            return None;
        }

        Some(DisplayDevice::new(
            from_wide_buffer(&device.DeviceName),
            DeviceStateFlags::from_bits_retain(device.StateFlags.0),
        ))
    }

    fn has_mode(&self, device: &DisplayDevice, mode_index: u32) -> bool {
        let name = to_wide_string(&device.name);
        let mut mode = DEVMODEW {
            dmSize: std::mem::size_of::<DEVMODEW>() as u16,
            dmDriverExtra: 0,
            ..Default::default()
        };

        unsafe {
            EnumDisplaySettingsW(
                PCWSTR(name.as_ptr()),
                ENUM_DISPLAY_SETTINGS_MODE(mode_index),
                &mut mode,
            )
        }
        .as_bool()
    }
}
