use std::fmt;

use thiserror::Error;

use crate::{Region, RegionKind};

/// Error classes used by callers to branch on failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unsupported construction parameter.
    Configuration,
    /// Two physical regions share address space.
    Overlap,
    /// Name reused within a namespace.
    DuplicateName,
    /// Explicit location already assigned to another name.
    LocationInUse,
    /// Explicit location outside the namespace bounds.
    Range,
    /// No free region or location left.
    OutOfSpace,
    /// Slave declared by name without a matching region.
    RegionNotFound,
    /// Region origin not aligned on its power-of-two size.
    Alignment,
    /// Request shape cannot be acted on.
    InvalidInput,
}

/// Namespace in which a name or location lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Physical and linker bus regions.
    Region,
    /// Uncached IO windows.
    IoRegion,
    /// Bus masters.
    Master,
    /// Bus slaves.
    Slave,
    /// CSR locations.
    Csr,
    /// Interrupt lines.
    Irq,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Region => "region",
            Self::IoRegion => "io region",
            Self::Master => "bus master",
            Self::Slave => "bus slave",
            Self::Csr => "csr",
            Self::Irq => "irq",
        };
        f.write_str(label)
    }
}

/// Allocation and validation failure, carrying the offending names and values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocError {
    /// A construction parameter is outside its supported set.
    #[error("unsupported {parameter}: {value} (supported: {supported})")]
    Configuration {
        /// Parameter name.
        parameter: &'static str,
        /// Rejected value.
        value: String,
        /// Rendered list of accepted values.
        supported: String,
    },
    /// Two physical regions overlap.
    #[error("region overlap between {first} ({first_region}) and {second} ({second_region})")]
    Overlap {
        /// Name of the region found first in table order.
        first: String,
        /// Region registered under `first`.
        first_region: Region,
        /// Name of the conflicting region.
        second: String,
        /// Region registered (or proposed) under `second`.
        second_region: Region,
    },
    /// Name already used within the namespace.
    #[error("{namespace} name '{name}' already used")]
    DuplicateName {
        /// Namespace of the clash.
        namespace: Namespace,
        /// Reused name.
        name: String,
    },
    /// Explicit location already assigned.
    #[error("{namespace} location {location} already used by '{owner}'")]
    LocationInUse {
        /// Namespace of the clash.
        namespace: Namespace,
        /// Requested location.
        location: u32,
        /// Name currently holding the location.
        owner: String,
    },
    /// Explicit location outside `[0, capacity)`.
    #[error("{namespace} location {location} out of range (0..{capacity})")]
    Range {
        /// Namespace of the request.
        namespace: Namespace,
        /// Requested location.
        location: i64,
        /// Number of locations in the namespace.
        capacity: u32,
    },
    /// No region of the requested size fits in the search space.
    #[error("not enough address space to allocate {} region of size 0x{size:08x}", cache_label(.cached))]
    OutOfAddressSpace {
        /// Requested size in bytes.
        size: u64,
        /// Requested cacheability.
        cached: bool,
    },
    /// Every location of a flat namespace is taken.
    #[error("not enough {namespace} locations to allocate '{name}' (up to {capacity})")]
    OutOfLocations {
        /// Exhausted namespace.
        namespace: Namespace,
        /// Name that could not be placed.
        name: String,
        /// Number of locations in the namespace.
        capacity: u32,
    },
    /// Slave declared by name only, with no region of that name.
    #[error("unable to find region '{name}'")]
    RegionNotFound {
        /// Slave and region name.
        name: String,
    },
    /// Region origin is not a multiple of its rounded size.
    #[error("region origin 0x{origin:08x} is not aligned on size 0x{size:08x}")]
    Alignment {
        /// Region origin in bytes.
        origin: u64,
        /// Region size in bytes, before rounding.
        size: u64,
    },
    /// Region lacks a field required by the operation.
    #[error("region ({region}) needs {missing}")]
    IncompleteRegion {
        /// Rejected region.
        region: Region,
        /// Description of what is missing.
        missing: &'static str,
    },
    /// Region kind not accepted by the operation.
    #[error("{name} cannot be declared with region kind {kind:?}")]
    UnsupportedRegionKind {
        /// Name the region was declared under.
        name: String,
        /// Rejected kind.
        kind: RegionKind,
    },
    /// Slave added with neither a name nor a region.
    #[error("bus slave needs at least a name or a region")]
    MissingSlaveIdentity,
}

impl AllocError {
    /// Returns the error class for this failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::Overlap { .. } => ErrorKind::Overlap,
            Self::DuplicateName { .. } => ErrorKind::DuplicateName,
            Self::LocationInUse { .. } => ErrorKind::LocationInUse,
            Self::Range { .. } => ErrorKind::Range,
            Self::OutOfAddressSpace { .. } | Self::OutOfLocations { .. } => ErrorKind::OutOfSpace,
            Self::RegionNotFound { .. } => ErrorKind::RegionNotFound,
            Self::Alignment { .. } => ErrorKind::Alignment,
            Self::IncompleteRegion { .. }
            | Self::UnsupportedRegionKind { .. }
            | Self::MissingSlaveIdentity => ErrorKind::InvalidInput,
        }
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn cache_label(cached: &bool) -> &'static str {
    if *cached {
        "cached"
    } else {
        "io"
    }
}

/// Validates `value` against an allow-list.
pub(crate) fn check_supported<T>(
    parameter: &'static str,
    value: &T,
    supported: &[T],
) -> Result<(), AllocError>
where
    T: PartialEq + fmt::Display,
{
    if supported.contains(value) {
        return Ok(());
    }
    Err(AllocError::Configuration {
        parameter,
        value: value.to_string(),
        supported: supported
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "),
    })
}
