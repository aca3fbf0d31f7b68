use std::fmt;

use thiserror::Error;

use crate::topology::{Topology, TopologyId};

/// Status code returned by a display-configuration call that did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OsStatus(pub i32);

impl OsStatus {
    pub const INVALID_PARAMETER: OsStatus = OsStatus(87);
    pub const ACCESS_DENIED: OsStatus = OsStatus(5);
    pub const NOT_SUPPORTED: OsStatus = OsStatus(50);
}

impl fmt::Display for OsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status {}", self.0)
    }
}

/// Which placeholder buffer an allocation failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScratchKind {
    Paths,
    Modes,
}

impl fmt::Display for ScratchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScratchKind::Paths => f.write_str("path"),
            ScratchKind::Modes => f.write_str("mode"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    #[error("display config buffer size query failed ({0})")]
    SizeQuery(OsStatus),
    #[error("could not allocate {len} {buffer} info entries")]
    Allocation { buffer: ScratchKind, len: u32 },
    #[error("display config query failed ({0})")]
    Query(OsStatus),
    #[error("applying display topology failed ({0})")]
    Apply(OsStatus),
    #[error("unrecognized topology id {0}")]
    Unrecognized(TopologyId),
    #[error("unknown topology name {0:?} (expected internal, clone, extend or external)")]
    UnknownName(String),
    #[error("topology switch needs at least two displays, found {0}")]
    NotEnoughDisplays(u32),
    #[error("requested {requested} topology but the system reports {current}")]
    Unconfirmed {
        requested: Topology,
        current: TopologyId,
    },
}
