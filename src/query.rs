use log::{debug, trace, warn};

use crate::device::{DisplayDevice, ModeProbe};
use crate::error::{ScratchKind, TopologyError};
use crate::os::DisplayConfigApi;
use crate::scratch::ScratchBuffer;
use crate::topology::{Topology, TopologyId};

/// Topology queries and display counting over a [`DisplayConfigApi`].
///
/// Holds no state between calls besides the probe policy.
pub struct DisplayQuery<A> {
    api: A,
    probe: ModeProbe,
}

/// A device from the enumeration together with the counting verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceReport {
    pub index: u32,
    pub device: DisplayDevice,
    pub mirroring: bool,
    pub viable: bool,
}

impl DeviceReport {
    pub fn counted(&self) -> bool {
        !self.mirroring && self.viable
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// The system was already in the requested topology; nothing was applied.
    Unchanged,
    Switched,
}

impl<A: DisplayConfigApi> DisplayQuery<A> {
    pub fn new(api: A) -> Self {
        Self::with_probe(api, ModeProbe::default())
    }

    pub fn with_probe(api: A, probe: ModeProbe) -> Self {
        Self { api, probe }
    }

    /// Read the current topology id into `out`.
    ///
    /// `out` is untouched if the size query or an allocation fails. If the
    /// final query fails, `out` holds whatever the OS wrote before failing.
    pub fn read_topology(&self, out: &mut TopologyId) -> Result<(), TopologyError> {
        let (path_count, mode_count) = self.api.buffer_sizes().map_err(|status| {
            debug!("GetDisplayConfigBufferSizes failed: {status}");
            TopologyError::SizeQuery(status)
        })?;

        let mut paths: ScratchBuffer<A::PathInfo> = self
            .api
            .alloc_scratch(ScratchKind::Paths, path_count)
            .inspect_err(|e| warn!("{e}"))?;
        let mut modes: ScratchBuffer<A::ModeInfo> = self
            .api
            .alloc_scratch(ScratchKind::Modes, mode_count)
            .inspect_err(|e| warn!("{e}"))?;

        self.api
            .query_config(paths.as_mut_slice(), modes.as_mut_slice(), out)
            .map_err(|status| {
                debug!("QueryDisplayConfig failed: {status}");
                TopologyError::Query(status)
            })?;

        trace!("current topology id {out}");
        Ok(())
    }

    /// The current arrangement, rejecting ids outside the four known ones.
    pub fn current_topology(&self) -> Result<Topology, TopologyError> {
        let mut id = TopologyId::UNSET;
        self.read_topology(&mut id)?;
        Topology::try_from(id)
    }

    pub fn apply_topology(&self, topology: TopologyId) -> Result<(), TopologyError> {
        self.api.apply_topology(topology).map_err(|status| {
            debug!("SetDisplayConfig({topology}) failed: {status}");
            TopologyError::Apply(status)
        })
    }

    /// Whether `device` passes the mode-availability probe.
    pub fn is_viable(&self, device: &DisplayDevice) -> bool {
        self.probe.run(|index| self.api.has_mode(device, index))
    }

    /// Walk the device enumeration and report each entry.
    pub fn devices(&self) -> Vec<DeviceReport> {
        let mut reports = Vec::new();
        let mut index = 0;

        while let Some(device) = self.api.display_device(index) {
            let mirroring = device.is_mirroring_driver();
            // Mirroring pseudo devices are never probed.
            let viable = !mirroring && self.is_viable(&device);
            reports.push(DeviceReport {
                index,
                device,
                mirroring,
                viable,
            });
            index += 1;
        }

        reports
    }

    /// Count active physical displays.
    ///
    /// Mirroring pseudo devices and devices that fail the mode probe are
    /// left out. Never fails: anything that cannot be probed is undercounted.
    pub fn count_displays(&self) -> u32 {
        let mut count = 0;
        let mut index = 0;

        while let Some(device) = self.api.display_device(index) {
            if device.is_mirroring_driver() {
                trace!("skipping mirroring driver {}", device.name);
            } else if self.is_viable(&device) {
                count += 1;
            } else {
                debug!("{} reports no usable modes, not counted", device.name);
            }
            index += 1;
        }

        count
    }

    /// Move to `target`, skipping the apply when it is already current.
    ///
    /// Needs at least two counted displays. The topology is re-read after
    /// applying and must match.
    pub fn switch_to(&self, target: Topology) -> Result<SwitchOutcome, TopologyError> {
        let displays = self.count_displays();
        if displays < 2 {
            return Err(TopologyError::NotEnoughDisplays(displays));
        }

        // Re-applying the current topology makes the screens flash.
        if self.current_topology()? == target {
            return Ok(SwitchOutcome::Unchanged);
        }

        self.apply_topology(target.id())?;

        let mut current = TopologyId::UNSET;
        self.read_topology(&mut current)?;
        if current != target.id() {
            return Err(TopologyError::Unconfirmed {
                requested: target,
                current,
            });
        }

        debug!("switched topology to {target}");
        Ok(SwitchOutcome::Switched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceStateFlags;
    use crate::error::OsStatus;
    use crate::os::mock::{Call, ScriptedDisplayConfig, Slot};

    const ACTIVE: DeviceStateFlags = DeviceStateFlags::ATTACHED_TO_DESKTOP;

    fn scripted() -> ScriptedDisplayConfig {
        ScriptedDisplayConfig::new()
    }

    #[test_log::test]
    fn read_topology_uses_exactly_sized_zeroed_buffers() {
        let api = scripted();
        api.topology.set(Topology::Clone.id());
        let query = DisplayQuery::new(&api);

        let mut out = TopologyId::UNSET;
        query.read_topology(&mut out).unwrap();

        assert_eq!(out, Topology::Clone.id());
        assert_eq!(
            api.calls(),
            vec![Call::BufferSizes, Call::Query { paths: 2, modes: 4 }]
        );
        assert_eq!(Slot::created(), 6);
        assert_eq!(Slot::live(), 0);
    }

    #[test_log::test]
    fn failed_size_query_allocates_nothing_and_leaves_output() {
        let mut api = scripted();
        api.sizes = Err(OsStatus::INVALID_PARAMETER);
        let query = DisplayQuery::new(&api);

        let mut out = TopologyId(0xdead);
        let err = query.read_topology(&mut out).unwrap_err();

        assert_eq!(err, TopologyError::SizeQuery(OsStatus::INVALID_PARAMETER));
        assert_eq!(out, TopologyId(0xdead));
        assert_eq!(Slot::created(), 0);
        assert_eq!(api.calls(), vec![Call::BufferSizes]);
    }

    #[test_log::test]
    fn second_allocation_failure_releases_the_first_buffer() {
        let mut api = scripted();
        api.sizes = Ok((3, 5));
        api.failing_alloc = Some(ScratchKind::Modes);
        let query = DisplayQuery::new(&api);

        let mut out = TopologyId(0x1);
        let err = query.read_topology(&mut out).unwrap_err();

        assert_eq!(
            err,
            TopologyError::Allocation {
                buffer: ScratchKind::Modes,
                len: 5
            }
        );
        assert_eq!(out, TopologyId(0x1));
        assert_eq!(Slot::created(), 3);
        assert_eq!(Slot::live(), 0);
        assert_eq!(api.calls(), vec![Call::BufferSizes]);
    }

    #[test_log::test]
    fn failed_query_keeps_what_the_os_wrote_and_releases_buffers() {
        let mut api = scripted();
        api.query_status = Err(OsStatus::INVALID_PARAMETER);
        api.topology.set(TopologyId(0x8));
        let query = DisplayQuery::new(&api);

        let mut out = TopologyId::UNSET;
        let err = query.read_topology(&mut out).unwrap_err();

        assert_eq!(err, TopologyError::Query(OsStatus::INVALID_PARAMETER));
        assert_eq!(out, TopologyId(0x8));
        assert_eq!(Slot::live(), 0);
    }

    #[test_log::test]
    fn current_topology_rejects_unknown_ids() {
        let api = scripted();
        api.topology.set(TopologyId(0x10));
        let query = DisplayQuery::new(&api);

        assert_eq!(
            query.current_topology(),
            Err(TopologyError::Unrecognized(TopologyId(0x10)))
        );
    }

    #[test_log::test]
    fn apply_reports_os_status() {
        let mut api = scripted();
        assert!(DisplayQuery::new(&api).apply_topology(TopologyId(0x2)).is_ok());

        api.apply_status = Err(OsStatus::ACCESS_DENIED);
        assert_eq!(
            DisplayQuery::new(&api).apply_topology(TopologyId(0x2)),
            Err(TopologyError::Apply(OsStatus::ACCESS_DENIED))
        );
    }

    #[test_log::test]
    fn no_devices_counts_zero() {
        let api = scripted();
        assert_eq!(DisplayQuery::new(&api).count_displays(), 0);
        assert_eq!(api.calls(), vec![Call::Device(0)]);
    }

    #[test_log::test]
    fn mirroring_driver_is_excluded_without_probing() {
        let api = scripted().with_device("mirror", DeviceStateFlags::MIRRORING_DRIVER, 10);
        assert_eq!(DisplayQuery::new(&api).count_displays(), 0);
        assert!(
            !api.calls()
                .iter()
                .any(|call| matches!(call, Call::Mode { .. }))
        );
    }

    #[test_log::test]
    fn mirroring_bit_with_other_flags_still_counts() {
        let api = scripted().with_device(
            "primary",
            DeviceStateFlags::MIRRORING_DRIVER | DeviceStateFlags::PRIMARY_DEVICE,
            4,
        );
        assert_eq!(DisplayQuery::new(&api).count_displays(), 1);
    }

    #[test_log::test]
    fn device_without_modes_is_excluded() {
        let api = scripted()
            .with_device("unplugged", ACTIVE, 0)
            .with_device("panel", ACTIVE, 1);
        // One mode is not enough: the probe at index 1 fails.
        assert_eq!(DisplayQuery::new(&api).count_displays(), 0);
    }

    #[test_log::test]
    fn mixed_enumeration_counts_only_the_active_display() {
        let api = scripted()
            .with_device("mirror", DeviceStateFlags::MIRRORING_DRIVER, 5)
            .with_device("unplugged", ACTIVE, 0)
            .with_device("monitor", ACTIVE, 5);
        let query = DisplayQuery::new(&api);

        assert_eq!(query.count_displays(), 1);

        let probes: Vec<u32> = api
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Mode { device, index } if device == "monitor" => Some(index),
                _ => None,
            })
            .collect();
        assert_eq!(probes, vec![0, 1, 2, 3]);
    }

    #[test_log::test]
    fn custom_probe_policy_is_honoured() {
        let api = scripted().with_device("panel", ACTIVE, 2);
        let query = DisplayQuery::with_probe(&api, ModeProbe::new(0));
        assert_eq!(query.count_displays(), 1);
    }

    #[test_log::test]
    fn device_needs_modes_through_index_three() {
        let api = scripted()
            .with_device("three-modes", ACTIVE, 3)
            .with_device("four-modes", ACTIVE, 4);
        let reports = DisplayQuery::new(&api).devices();

        assert!(!reports[0].counted());
        assert!(reports[1].counted());
        assert_eq!(DisplayQuery::new(&api).count_displays(), 1);
    }

    #[test_log::test]
    fn devices_reports_every_entry() {
        let api = scripted()
            .with_device("mirror", DeviceStateFlags::MIRRORING_DRIVER, 5)
            .with_device("monitor", ACTIVE, 5);
        let reports = DisplayQuery::new(&api).devices();

        assert_eq!(reports.len(), 2);
        assert!(reports[0].mirroring && !reports[0].counted());
        assert_eq!(reports[1].index, 1);
        assert!(reports[1].counted());
    }

    #[test_log::test]
    fn switch_needs_two_displays() {
        let api = scripted().with_device("monitor", ACTIVE, 5);
        assert_eq!(
            DisplayQuery::new(&api).switch_to(Topology::Clone),
            Err(TopologyError::NotEnoughDisplays(1))
        );
        assert!(!api.calls().iter().any(|c| matches!(c, Call::Apply(_))));
    }

    #[test_log::test]
    fn switch_skips_apply_when_already_current() {
        let api = scripted()
            .with_device("a", ACTIVE, 5)
            .with_device("b", ACTIVE, 5);
        api.topology.set(Topology::Extend.id());

        assert_eq!(
            DisplayQuery::new(&api).switch_to(Topology::Extend),
            Ok(SwitchOutcome::Unchanged)
        );
        assert!(!api.calls().iter().any(|c| matches!(c, Call::Apply(_))));
    }

    #[test_log::test]
    fn switch_applies_and_confirms() {
        let api = scripted()
            .with_device("a", ACTIVE, 5)
            .with_device("b", ACTIVE, 5);
        api.topology.set(Topology::Extend.id());

        assert_eq!(
            DisplayQuery::new(&api).switch_to(Topology::Clone),
            Ok(SwitchOutcome::Switched)
        );
        assert_eq!(api.topology.get(), Topology::Clone.id());
        assert_eq!(Slot::live(), 0);
    }

    #[test_log::test]
    fn switch_propagates_apply_failure() {
        let mut api = scripted()
            .with_device("a", ACTIVE, 5)
            .with_device("b", ACTIVE, 5);
        api.apply_status = Err(OsStatus::NOT_SUPPORTED);

        assert_eq!(
            DisplayQuery::new(&api).switch_to(Topology::Internal),
            Err(TopologyError::Apply(OsStatus::NOT_SUPPORTED))
        );
    }
}
