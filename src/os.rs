//! OS abstraction layer.
//!
//! Defines the display-configuration operations the rest of the crate
//! consumes. Only `platform::windows` implements them against the real OS;
//! tests drive the same code through `mock::ScriptedDisplayConfig`.

use crate::device::DisplayDevice;
use crate::error::{OsStatus, ScratchKind, TopologyError};
use crate::scratch::ScratchBuffer;
use crate::topology::TopologyId;

// ---------------------------------------------------------------------------
// Display-configuration calls
// ---------------------------------------------------------------------------

/// The display-configuration calls the helper is built on.
pub trait DisplayConfigApi {
    /// Element type of the path array handed to [`query_config`](Self::query_config).
    type PathInfo: Default + Clone;
    /// Element type of the mode array handed to [`query_config`](Self::query_config).
    type ModeInfo: Default + Clone;

    /// Number of path and mode entries needed to describe the current
    /// database.
    fn buffer_sizes(&self) -> Result<(u32, u32), OsStatus>;

    /// Query the current database into `paths` and `modes`, with the OS
    /// writing the topology id directly into `topology`.
    ///
    /// `topology` may have been written even when this returns an error.
    fn query_config(
        &self,
        paths: &mut [Self::PathInfo],
        modes: &mut [Self::ModeInfo],
        topology: &mut TopologyId,
    ) -> Result<(), OsStatus>;

    /// Apply `topology`, letting the OS derive paths and modes for it.
    fn apply_topology(&self, topology: TopologyId) -> Result<(), OsStatus>;

    /// The display device at `index`, or `None` past the end.
    fn display_device(&self, index: u32) -> Option<DisplayDevice>;

    /// Whether `device` reports a display mode at `mode_index`.
    fn has_mode(&self, device: &DisplayDevice, mode_index: u32) -> bool;

    /// Allocate a zero-filled placeholder buffer of exactly `len` entries.
    fn alloc_scratch<T: Default + Clone>(
        &self,
        kind: ScratchKind,
        len: u32,
    ) -> Result<ScratchBuffer<T>, TopologyError> {
        ScratchBuffer::zeroed(kind, len)
    }
}

// ---------------------------------------------------------------------------
// Borrowed APIs, so a query can run over `&api`
// ---------------------------------------------------------------------------

impl<A: DisplayConfigApi + ?Sized> DisplayConfigApi for &A {
    type PathInfo = A::PathInfo;
    type ModeInfo = A::ModeInfo;

    fn buffer_sizes(&self) -> Result<(u32, u32), OsStatus> {
        (**self).buffer_sizes()
    }

    fn query_config(
        &self,
        paths: &mut [Self::PathInfo],
        modes: &mut [Self::ModeInfo],
        topology: &mut TopologyId,
    ) -> Result<(), OsStatus> {
        (**self).query_config(paths, modes, topology)
    }

    fn apply_topology(&self, topology: TopologyId) -> Result<(), OsStatus> {
        (**self).apply_topology(topology)
    }

    fn display_device(&self, index: u32) -> Option<DisplayDevice> {
        (**self).display_device(index)
    }

    fn has_mode(&self, device: &DisplayDevice, mode_index: u32) -> bool {
        (**self).has_mode(device, mode_index)
    }

    fn alloc_scratch<T: Default + Clone>(
        &self,
        kind: ScratchKind,
        len: u32,
    ) -> Result<ScratchBuffer<T>, TopologyError> {
        (**self).alloc_scratch(kind, len)
    }
}

// ---------------------------------------------------------------------------
// Scripted OS for tests
// ---------------------------------------------------------------------------
