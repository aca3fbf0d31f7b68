//! Placeholder buffers for OS calls that refuse null array arguments.
//!
//! `QueryDisplayConfig` rejects null path/mode arrays even when the caller
//! only wants the topology id, and is unreliable unless the arrays are sized
//! exactly to what `GetDisplayConfigBufferSizes` reported and fully zeroed.
//! A [`ScratchBuffer`] is allocated for one call and released when it goes
//! out of scope, whichever way that call exits.

use crate::error::{ScratchKind, TopologyError};

pub struct ScratchBuffer<T> {
    slots: Vec<T>,
}

impl<T: Default + Clone> ScratchBuffer<T> {
    /// Reserve exactly `len` entries and fill them with `T::default()`.
    ///
    /// OS structures' `Default` is all-zero, so the buffer is zero-filled.
    pub fn zeroed(kind: ScratchKind, len: u32) -> Result<Self, TopologyError> {
        let alloc_err = || TopologyError::Allocation { buffer: kind, len };

        let wanted = usize::try_from(len).map_err(|_| alloc_err())?;
        let mut slots = Vec::new();
        slots.try_reserve_exact(wanted).map_err(|_| alloc_err())?;
        slots.resize_with(wanted, T::default);

        Ok(Self { slots })
    }
}

impl<T> ScratchBuffer<T> {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.slots
    }
}
