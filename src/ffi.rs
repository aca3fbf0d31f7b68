//! C-linkage surface loaded by the host process.
//!
//! The exports keep the narrow historical contract: failures are a silent
//! no-op, a `false`, or an undercount. The pointer handling lives in the
//! generic functions below so it runs against any [`DisplayConfigApi`].

use crate::os::DisplayConfigApi;
use crate::query::DisplayQuery;
use crate::topology::TopologyId;

/// Write the current topology id through `out`.
///
/// # Safety
///
/// `out` must be null or valid for reads and writes of a `TopologyId`.
pub unsafe fn write_current_topology<A: DisplayConfigApi>(
    query: &DisplayQuery<A>,
    out: *mut TopologyId,
) {
    // SAFETY: the caller guarantees `out` is null or valid.
    let Some(out) = (unsafe { out.as_mut() }) else {
        return;
    };
    let _ = query.read_topology(out);
}

/// Apply the topology read from `requested`; `true` only on OS success.
///
/// # Safety
///
/// `requested` must be null or valid for reads of a `TopologyId`.
pub unsafe fn apply_requested_topology<A: DisplayConfigApi>(
    query: &DisplayQuery<A>,
    requested: *const TopologyId,
) -> bool {
    // SAFETY: the caller guarantees `requested` is null or valid.
    let Some(requested) = (unsafe { requested.as_ref() }) else {
        return false;
    };
    query.apply_topology(*requested).is_ok()
}

/// Write the number of active displays through `out`.
///
/// # Safety
///
/// `out` must be null or valid for writes of a `u32`.
pub unsafe fn write_display_count<A: DisplayConfigApi>(query: &DisplayQuery<A>, out: *mut u32) {
    if out.is_null() {
        return;
    }
    let count = query.count_displays();
    // SAFETY: non-null and valid per the caller's contract.
    unsafe { out.write(count) };
}

#[cfg(target_os = "windows")]
mod exports {
    use super::*;
    use crate::platform::windows::WinDisplayConfig;

    fn system_query() -> DisplayQuery<WinDisplayConfig> {
        DisplayQuery::new(WinDisplayConfig::new())
    }

    /// # Safety
    ///
    /// `current` must be null or point to writable storage for a topology id.
    #[unsafe(no_mangle)]
    pub unsafe extern "C" fn GetCurrentTopology(current: *mut TopologyId) {
        unsafe { write_current_topology(&system_query(), current) }
    }

    /// # Safety
    ///
    /// `desired` must be null or point to a readable topology id.
    #[unsafe(no_mangle)]
    pub unsafe extern "C" fn SetCurrentTopology(desired: *const TopologyId) -> bool {
        unsafe { apply_requested_topology(&system_query(), desired) }
    }

    /// # Safety
    ///
    /// `count` must be null or point to writable storage for a `u32`.
    #[unsafe(no_mangle)]
    pub unsafe extern "C" fn GetNumberofDisplays(count: *mut u32) {
        unsafe { write_display_count(&system_query(), count) }
    }
}
