//! SoC address map planner.
//!
//! Reads a JSON SoC description, drives the `soc-alloc` bus, CSR and IRQ
//! allocators in declaration order, and renders the resulting layout as text
//! tables or as a `csr.json`-style export.

/// JSON description schema.
pub mod description;
/// Planner error type.
pub mod errors;
/// Machine-readable layout export.
pub mod export;
/// Allocator wiring.
pub mod plan;

pub use description::SocDescription;
pub use errors::PlanError;
pub use export::{LayoutExport, MemoryEntry, MemoryType};
pub use plan::Plan;
