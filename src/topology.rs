use std::fmt;
use std::str::FromStr;

use crate::error::TopologyError;

/// Raw topology identifier as it crosses the C boundary.
///
/// Layout matches `DISPLAYCONFIG_TOPOLOGY_ID`. Values the OS may add later
/// pass through untouched; use [`Topology`] when only the known
/// arrangements make sense.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TopologyId(pub u32);

impl TopologyId {
    /// What a caller-initialised identifier holds when nothing was written.
    pub const UNSET: TopologyId = TopologyId(0);
}

impl fmt::Display for TopologyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

/// The multi-monitor arrangements the OS recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Topology {
    /// Only the internal (built-in) display is active.
    Internal = 0x1,
    /// Every display shows the same image.
    Clone = 0x2,
    /// The desktop spans all displays.
    Extend = 0x4,
    /// Only the external display is active.
    External = 0x8,
}

impl Topology {
    pub const ALL: [Topology; 4] = [
        Topology::Internal,
        Topology::Clone,
        Topology::Extend,
        Topology::External,
    ];

    pub fn id(self) -> TopologyId {
        TopologyId(self as u32)
    }

    pub fn name(self) -> &'static str {
        match self {
            Topology::Internal => "internal",
            Topology::Clone => "clone",
            Topology::Extend => "extend",
            Topology::External => "external",
        }
    }
}

impl From<Topology> for TopologyId {
    fn from(topology: Topology) -> Self {
        topology.id()
    }
}

impl TryFrom<TopologyId> for Topology {
    type Error = TopologyError;

    fn try_from(id: TopologyId) -> Result<Self, Self::Error> {
        Topology::ALL
            .into_iter()
            .find(|t| t.id() == id)
            .ok_or(TopologyError::Unrecognized(id))
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Topology {
    type Err = TopologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Topology::ALL
            .into_iter()
            .find(|t| t.name() == wanted)
            .ok_or_else(|| TopologyError::UnknownName(s.to_string()))
    }
}
