//! SoC description file.
//!
//! Every order-sensitive section is a JSON array: allocation is first-fit, so
//! the declaration order decides the layout.
//!
//! ```json
//! {
//!   "bus": { "data_width": 32 },
//!   "reserved_regions": [
//!     { "name": "rom", "region": { "origin": 0, "size": 32768 } },
//!     { "name": "main_ram", "region": 1073741824 }
//!   ],
//!   "masters": [
//!     { "name": "cpu", "io_regions": [
//!       { "name": "io0", "region": { "origin": 2147483648, "size": 2147483648 } }
//!     ] }
//!   ],
//!   "slaves": [
//!     { "name": "rom" },
//!     { "name": "sram", "region": { "size": 8192 } },
//!     { "name": "csr", "region": { "size": 65536, "cached": false } }
//!   ],
//!   "reserved_csrs": [{ "name": "ctrl", "location": 0 }],
//!   "csrs": [{ "name": "uart" }, { "name": "timer0", "reuse": true }],
//!   "irqs": [{ "name": "uart" }, { "name": "timer0", "location": 1 }]
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use soc_alloc::{BusConfig, CsrConfig, IrqConfig, Region, ReservedRegion};

use crate::PlanError;

/// Complete input to the planner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SocDescription {
    /// Shared bus parameters.
    pub bus: BusConfig,
    /// CSR bus parameters.
    pub csr: CsrConfig,
    /// Interrupt controller parameters.
    pub irq: IrqConfig,
    /// Regions registered when the bus is created.
    pub reserved_regions: Vec<ReservedEntry>,
    /// Uncached IO windows declared before any master.
    pub io_regions: Vec<NamedRegion>,
    /// Bus masters in registration order.
    pub masters: Vec<MasterSpec>,
    /// Bus slaves in registration order.
    pub slaves: Vec<SlaveSpec>,
    /// CSR locations registered when the CSR allocator is created.
    pub reserved_csrs: Vec<LocationEntry>,
    /// CSR requests in call order.
    pub csrs: Vec<LocationRequest>,
    /// IRQ lines registered when the IRQ allocator is created.
    pub reserved_irqs: Vec<LocationEntry>,
    /// IRQ requests in call order.
    pub irqs: Vec<LocationRequest>,
}

impl SocDescription {
    /// Parses a description from JSON text.
    ///
    /// # Errors
    ///
    /// Returns the decode error for malformed JSON or unknown fields.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Reads and parses a description file.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Read`] or [`PlanError::Parse`] naming `path`.
    pub fn load(path: &Path) -> Result<Self, PlanError> {
        let text = fs::read_to_string(path).map_err(|source| PlanError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| PlanError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Reserved bus region: a full region or a bare origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReservedSpec {
    /// Origin of a default-sized region.
    Origin(u64),
    /// Full region descriptor.
    Region(Region),
}

impl From<ReservedSpec> for ReservedRegion {
    fn from(reserved: ReservedSpec) -> Self {
        match reserved {
            ReservedSpec::Origin(origin) => Self::Origin(origin),
            ReservedSpec::Region(region) => Self::Region(region),
        }
    }
}

/// Named reserved bus region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReservedEntry {
    /// Region name.
    pub name: String,
    /// Region or bare origin.
    pub region: ReservedSpec,
}

/// Named region descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamedRegion {
    /// Region name.
    pub name: String,
    /// Region descriptor.
    pub region: Region,
}

/// Bus master declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MasterSpec {
    /// Master name; `master<N>` when omitted.
    pub name: Option<String>,
    /// IO windows exposed by this master.
    pub io_regions: Vec<NamedRegion>,
}

/// Bus slave declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SlaveSpec {
    /// Slave name; `slave<N>` when omitted.
    pub name: Option<String>,
    /// Region to register; without it the slave binds to the region of the
    /// same name.
    pub region: Option<Region>,
}

/// Fixed location for a reserved CSR or IRQ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocationEntry {
    /// Entry name.
    pub name: String,
    /// Requested location.
    pub location: i64,
}

/// CSR or IRQ request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocationRequest {
    /// Entry name.
    pub name: String,
    /// Explicit location; lowest free location when omitted.
    #[serde(default)]
    pub location: Option<i64>,
    /// Return the existing location instead of failing on a known name.
    /// Only honoured for CSRs.
    #[serde(default)]
    pub reuse: bool,
}
