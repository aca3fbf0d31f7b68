use bitflags::bitflags;

bitflags! {
    /// `DISPLAY_DEVICE.StateFlags` as reported by device enumeration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DeviceStateFlags: u32 {
        const ATTACHED_TO_DESKTOP = 0x0000_0001;
        const MULTI_DRIVER = 0x0000_0002;
        const PRIMARY_DEVICE = 0x0000_0004;
        /// Pseudo device the OS uses to implement mirrored output.
        const MIRRORING_DRIVER = 0x0000_0008;
        const VGA_COMPATIBLE = 0x0000_0010;
        const REMOVABLE = 0x0000_0020;
        const ACC_DRIVER = 0x0000_0040;
        const DISCONNECT = 0x0200_0000;
        const REMOTE = 0x0400_0000;
        const MODESPRUNED = 0x0800_0000;

        const _ = !0;
    }
}

/// One entry of the OS display-device enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayDevice {
    /// Adapter device name, e.g. `\\.\DISPLAY1`.
    pub name: String,
    pub state: DeviceStateFlags,
}

impl DisplayDevice {
    pub fn new(name: impl Into<String>, state: DeviceStateFlags) -> Self {
        Self {
            name: name.into(),
            state,
        }
    }

    /// True only when the mirroring bit is the *sole* flag set.
    ///
    /// A device carrying other bits alongside it is treated as a real display.
    pub fn is_mirroring_driver(&self) -> bool {
        self.state == DeviceStateFlags::MIRRORING_DRIVER
    }
}

/// Heuristic for "this device is a real, reachable display".
///
/// A monitor that was unplugged can stay in the enumeration but stops
/// reporting modes. The probe asks for the mode at index 0, then keeps asking
/// for the next index while the previous probe succeeded and its index was at
/// most `guard`. With the default guard of 2 that is indices 0 through 3. The
/// device is viable only if the last probe it ran succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeProbe {
    pub guard: u32,
}

impl ModeProbe {
    pub const DEFAULT_GUARD: u32 = 2;

    pub const fn new(guard: u32) -> Self {
        Self { guard }
    }

    /// Run the probe sequence, calling `has_mode` with each index in turn.
    pub fn run(&self, mut has_mode: impl FnMut(u32) -> bool) -> bool {
        let mut index = 0;
        let mut found = has_mode(index);
        while found && index <= self.guard {
            index += 1;
            found = has_mode(index);
        }
        found
    }
}

impl Default for ModeProbe {
    fn default() -> Self {
        Self::new(Self::DEFAULT_GUARD)
    }
}
