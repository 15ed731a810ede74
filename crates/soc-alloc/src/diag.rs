//! Diagnostic event journal kept by each allocator.
//!
//! Allocators never print. Every accepted operation appends an [`AllocEvent`]
//! to the allocator's [`Journal`]; hosts render or discard the events.

use std::fmt;

use crate::{BusStandard, Namespace, Region};

/// Narration of one accepted allocator operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocEvent {
    /// Bus allocator created with validated parameters.
    BusCreated {
        /// Bus protocol family.
        standard: BusStandard,
        /// Data width in bits.
        data_width: u32,
        /// Address width in bits.
        address_width: u32,
    },
    /// CSR allocator created with validated parameters.
    CsrCreated {
        /// CSR data width in bits.
        data_width: u32,
        /// CSR address width in bits.
        address_width: u32,
        /// Bytes reserved per CSR location.
        paging: u32,
        /// Number of CSR locations.
        capacity: u32,
    },
    /// IRQ allocator created.
    IrqCreated {
        /// Number of interrupt lines.
        capacity: u32,
    },
    /// Region registered at the caller's origin.
    RegionAdded {
        /// Region name.
        name: String,
        /// Registered region.
        region: Region,
    },
    /// Region registered at an allocated origin.
    RegionAllocated {
        /// Region name.
        name: String,
        /// Registered region.
        region: Region,
    },
    /// Linker region registered without overlap checking.
    LinkerRegionAdded {
        /// Region name.
        name: String,
        /// Registered region.
        region: Region,
    },
    /// Uncached IO window declared.
    IoRegionAdded {
        /// Window name.
        name: String,
        /// Registered window.
        region: Region,
    },
    /// Bus master registered.
    MasterAdded {
        /// Master name.
        name: String,
    },
    /// Bus slave registered.
    SlaveAdded {
        /// Slave name.
        name: String,
    },
    /// Location registered at the caller's index.
    LocationAdded {
        /// Owning namespace.
        namespace: Namespace,
        /// Entry name.
        name: String,
        /// Assigned location.
        location: u32,
    },
    /// Location registered at the lowest free index.
    LocationAllocated {
        /// Owning namespace.
        namespace: Namespace,
        /// Entry name.
        name: String,
        /// Assigned location.
        location: u32,
    },
    /// Existing CSR location returned for a reuse request.
    CsrReused {
        /// CSR name.
        name: String,
        /// Existing location.
        location: u32,
    },
}

impl fmt::Display for AllocEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BusCreated {
                standard,
                data_width,
                address_width,
            } => write!(
                f,
                "{data_width}-bit {standard} bus handler created, {address_width}-bit address space"
            ),
            Self::CsrCreated {
                data_width,
                address_width,
                paging,
                capacity,
            } => write!(
                f,
                "{data_width}-bit CSR handler created, {address_width}-bit address space, {paging}B paging (up to {capacity} locations)"
            ),
            Self::IrqCreated { capacity } => {
                write!(f, "IRQ handler created (up to {capacity} locations)")
            }
            Self::RegionAdded { name, region } => write!(f, "{name} region added {region}"),
            Self::RegionAllocated { name, region } => {
                write!(f, "{name} region allocated {region}")
            }
            Self::LinkerRegionAdded { name, region } => write!(
                f,
                "{name} linker region added without overlap check {region}"
            ),
            Self::IoRegionAdded { name, region } => write!(f, "{name} io region added {region}"),
            Self::MasterAdded { name } => write!(f, "{name} added as bus master"),
            Self::SlaveAdded { name } => write!(f, "{name} added as bus slave"),
            Self::LocationAdded {
                namespace,
                name,
                location,
            } => write!(f, "{name} {namespace} added at location {location}"),
            Self::LocationAllocated {
                namespace,
                name,
                location,
            } => write!(f, "{name} {namespace} allocated at location {location}"),
            Self::CsrReused { name, location } => {
                write!(f, "{name} csr reused at location {location}")
            }
        }
    }
}

/// Append-only event log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Journal {
    events: Vec<AllocEvent>,
}

impl Journal {
    /// Creates an empty journal.
    #[must_use]
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Appends an event.
    pub fn record(&mut self, event: AllocEvent) {
        self.events.push(event);
    }

    /// Events in the order they were recorded.
    #[must_use]
    pub fn events(&self) -> &[AllocEvent] {
        &self.events
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` when nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
