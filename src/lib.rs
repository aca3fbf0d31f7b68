//! Query and change the Windows multi-monitor topology.
//!
//! Built as a `cdylib`, the crate exports `GetCurrentTopology`,
//! `SetCurrentTopology` and `GetNumberofDisplays` with C linkage for a host
//! process to load. The same logic is available to Rust callers through
//! [`DisplayQuery`], generic over the [`DisplayConfigApi`] it talks to.

pub mod device;
pub mod error;
pub mod ffi;
pub mod os;
pub mod platform;
pub mod query;
pub mod scratch;
pub mod topology;

pub use device::{DeviceStateFlags, DisplayDevice, ModeProbe};
pub use error::{OsStatus, TopologyError};
pub use os::DisplayConfigApi;
pub use query::{DeviceReport, DisplayQuery, SwitchOutcome};
pub use topology::{Topology, TopologyId};

#[cfg(target_os = "windows")]
pub use platform::windows::WinDisplayConfig;
