//! `csr.json`-style layout export for downstream device-tree and header
//! generators.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use soc_alloc::Region;

use crate::{Plan, PlanError};

/// Name of the bus region CSR banks are mapped into.
pub const CSR_REGION: &str = "csr";

/// Memory type tag of an exported region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryType {
    /// Cached physical region.
    Cached,
    /// Uncached physical region or IO window.
    Io,
    /// Linker-only region.
    Linker,
}

/// Exported region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryEntry {
    /// Base address in bytes.
    pub base: u64,
    /// Size in bytes.
    pub size: u64,
    /// Memory type tag.
    #[serde(rename = "type")]
    pub kind: MemoryType,
}

impl MemoryEntry {
    /// Export entry for a placed region; `None` while origin or size is unset.
    #[must_use]
    pub fn from_region(region: &Region) -> Option<Self> {
        let kind = if region.is_linker() {
            MemoryType::Linker
        } else if region.is_cached() {
            MemoryType::Cached
        } else {
            MemoryType::Io
        };
        Some(Self {
            base: region.origin()?,
            size: region.size()?,
            kind,
        })
    }
}

/// Allocated layout in export form.
///
/// Maps are keyed by name and serialized in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutExport {
    /// IO windows and bus regions. A bus region shadows an IO window of the
    /// same name.
    pub memories: BTreeMap<String, MemoryEntry>,
    /// CSR bank base addresses.
    pub csr_bases: BTreeMap<String, u64>,
    /// `<name>_interrupt` lines and bus configuration values.
    pub constants: BTreeMap<String, u64>,
}

impl LayoutExport {
    /// Collects the export view of `plan`.
    ///
    /// CSR bases are the origin of the [`CSR_REGION`] bus region plus the
    /// bank offset, or the bare offset when that region does not exist.
    #[must_use]
    pub fn from_plan(plan: &Plan) -> Self {
        let bus = plan.bus();
        let mut memories = BTreeMap::new();
        for (name, region) in bus.io_regions().iter().chain(bus.regions().iter()) {
            if let Some(entry) = MemoryEntry::from_region(region) {
                memories.insert(name.to_string(), entry);
            }
        }

        let csr_origin = bus.region(CSR_REGION).and_then(Region::origin).unwrap_or(0);
        let csr_bases = plan
            .csr()
            .locations()
            .names()
            .filter_map(|name| {
                let offset = plan.csr().offset(name)?;
                Some((name.to_string(), csr_origin.saturating_add(offset)))
            })
            .collect();

        let mut constants: BTreeMap<String, u64> = plan
            .irq()
            .lines()
            .iter()
            .map(|(name, line)| (format!("{name}_interrupt"), u64::from(*line)))
            .collect();
        let config = plan.csr().config();
        constants.insert(
            "config_bus_data_width".to_string(),
            u64::from(bus.data_width()),
        );
        constants.insert(
            "config_csr_data_width".to_string(),
            u64::from(config.data_width),
        );
        constants.insert("config_csr_paging".to_string(), u64::from(config.paging));

        Self {
            memories,
            csr_bases,
            constants,
        }
    }

    /// Pretty-printed JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Encode`] if serialization fails.
    pub fn to_json(&self) -> Result<String, PlanError> {
        serde_json::to_string_pretty(self).map_err(PlanError::Encode)
    }

    /// Writes the JSON text to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Encode`] or [`PlanError::Write`].
    pub fn write(&self, path: &Path) -> Result<(), PlanError> {
        let mut text = self.to_json()?;
        text.push('\n');
        fs::write(path, text).map_err(|source| PlanError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
