//! Address-space and identifier-space allocation for SoC integration.
//!
//! Three independent allocators share one discipline: entries are validated
//! and appended through `add` operations, never removed, and every conflict is
//! reported as a typed [`AllocError`] naming the offending entries.

/// Region descriptors and power-of-two address decoders.
pub mod region;
pub use region::{
    Decoder, Region, RegionKind, ReservedRegion, DEFAULT_ADDRESS_WIDTH, DEFAULT_WORD_SHIFT,
    RESERVED_REGION_SIZE,
};

/// Error taxonomy shared by all allocators.
pub mod error;
pub use error::{AllocError, ErrorKind, Namespace};

/// Allocator construction parameters and allow-lists.
pub mod config;
pub use config::{
    BusConfig, BusStandard, CsrConfig, IrqConfig, DEFAULT_BUS_TIMEOUT, MAX_IRQS,
    SUPPORTED_BUS_ADDRESS_WIDTHS, SUPPORTED_BUS_DATA_WIDTHS, SUPPORTED_CSR_ADDRESS_WIDTHS,
    SUPPORTED_CSR_ALIGNMENTS, SUPPORTED_CSR_DATA_WIDTHS, SUPPORTED_CSR_PAGINGS,
};

/// Insertion-ordered name tables.
pub mod table;
pub use table::NameTable;

/// Diagnostic event journal.
pub mod diag;
pub use diag::{AllocEvent, Journal};

mod slots;

/// Bus region, master and slave allocator.
pub mod bus;
pub use bus::{check_regions, BusAllocator};

/// CSR location allocator.
pub mod csr;
pub use csr::CsrAllocator;

/// Interrupt line allocator.
pub mod irq;
pub use irq::IrqAllocator;

/// Finalized bus participants.
pub mod interconnect;
pub use interconnect::Interconnect;

#[cfg(test)]
use proptest as _;
