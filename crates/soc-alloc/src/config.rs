//! Construction parameters for the three allocators and their allow-lists.

use std::fmt;
use std::str::FromStr;

use crate::error::check_supported;
use crate::AllocError;

/// Bus data widths accepted by [`BusConfig`].
pub const SUPPORTED_BUS_DATA_WIDTHS: [u32; 2] = [32, 64];
/// Bus address widths accepted by [`BusConfig`].
pub const SUPPORTED_BUS_ADDRESS_WIDTHS: [u32; 1] = [32];
/// Default bus timeout in cycles.
pub const DEFAULT_BUS_TIMEOUT: u64 = 1_000_000;

/// CSR data widths accepted by [`CsrConfig`].
pub const SUPPORTED_CSR_DATA_WIDTHS: [u32; 2] = [8, 32];
/// CSR address widths accepted by [`CsrConfig`].
pub const SUPPORTED_CSR_ADDRESS_WIDTHS: [u32; 2] = [14, 15];
/// CSR alignments accepted by [`CsrConfig`].
pub const SUPPORTED_CSR_ALIGNMENTS: [u32; 2] = [32, 64];
/// CSR paging strides accepted by [`CsrConfig`].
pub const SUPPORTED_CSR_PAGINGS: [u32; 1] = [0x800];

/// Upper bound on the number of interrupt lines.
pub const MAX_IRQS: u32 = 32;

/// Supported bus protocol families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BusStandard {
    /// Wishbone shared bus.
    #[default]
    Wishbone,
}

impl BusStandard {
    /// All supported standards.
    pub const ALL: [Self; 1] = [Self::Wishbone];

    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wishbone => "wishbone",
        }
    }
}

impl fmt::Display for BusStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BusStandard {
    type Err = AllocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|standard| standard.as_str() == s)
            .ok_or_else(|| AllocError::Configuration {
                parameter: "standard",
                value: s.to_string(),
                supported: Self::ALL
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

/// Shared bus parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BusConfig {
    /// Protocol family name, validated against [`BusStandard`].
    pub standard: String,
    /// Data width in bits.
    pub data_width: u32,
    /// Address width in bits.
    pub address_width: u32,
    /// Transaction timeout in cycles, passed through to interconnect generation.
    pub timeout: u64,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            standard: BusStandard::Wishbone.as_str().to_string(),
            data_width: 32,
            address_width: 32,
            timeout: DEFAULT_BUS_TIMEOUT,
        }
    }
}

impl BusConfig {
    /// Validates the parameters, returning the parsed standard.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::Configuration`] naming the first unsupported
    /// parameter.
    pub fn validate(&self) -> Result<BusStandard, AllocError> {
        let standard = self.standard.parse()?;
        check_supported("data_width", &self.data_width, &SUPPORTED_BUS_DATA_WIDTHS)?;
        check_supported(
            "address_width",
            &self.address_width,
            &SUPPORTED_BUS_ADDRESS_WIDTHS,
        )?;
        Ok(standard)
    }
}

/// CSR bus parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CsrConfig {
    /// CSR data width in bits.
    pub data_width: u32,
    /// CSR address width in bits.
    pub address_width: u32,
    /// Register alignment in bits.
    pub alignment: u32,
    /// Bytes reserved per CSR location.
    pub paging: u32,
}

impl Default for CsrConfig {
    fn default() -> Self {
        Self {
            data_width: 32,
            address_width: 14,
            alignment: 32,
            paging: 0x800,
        }
    }
}

impl CsrConfig {
    /// Validates the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::Configuration`] naming the first unsupported
    /// parameter.
    pub fn validate(&self) -> Result<(), AllocError> {
        check_supported("data_width", &self.data_width, &SUPPORTED_CSR_DATA_WIDTHS)?;
        check_supported(
            "address_width",
            &self.address_width,
            &SUPPORTED_CSR_ADDRESS_WIDTHS,
        )?;
        check_supported("alignment", &self.alignment, &SUPPORTED_CSR_ALIGNMENTS)?;
        check_supported("paging", &self.paging, &SUPPORTED_CSR_PAGINGS)?;
        Ok(())
    }

    /// Number of CSR locations: `data_width / 8 * 2^address_width / paging`.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::Configuration`] when the CSR address space does
    /// not fit in 32 bits or `paging` is zero.
    pub fn capacity(&self) -> Result<u32, AllocError> {
        let space = 1_u32
            .checked_shl(self.address_width)
            .and_then(|space| space.checked_mul(self.data_width / 8))
            .ok_or_else(|| AllocError::Configuration {
                parameter: "address_width",
                value: self.address_width.to_string(),
                supported: "an address space below 4GiB".to_string(),
            })?;
        space
            .checked_div(self.paging)
            .ok_or_else(|| AllocError::Configuration {
                parameter: "paging",
                value: self.paging.to_string(),
                supported: "non-zero".to_string(),
            })
    }
}

/// Interrupt controller parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IrqConfig {
    /// Number of interrupt lines, at most [`MAX_IRQS`].
    pub n_irqs: u32,
}

impl Default for IrqConfig {
    fn default() -> Self {
        Self { n_irqs: MAX_IRQS }
    }
}

impl IrqConfig {
    /// Validates the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::Configuration`] when more than [`MAX_IRQS`]
    /// lines are requested.
    pub fn validate(&self) -> Result<(), AllocError> {
        if self.n_irqs > MAX_IRQS {
            return Err(AllocError::Configuration {
                parameter: "n_irqs",
                value: self.n_irqs.to_string(),
                supported: format!("up to {MAX_IRQS}"),
            });
        }
        Ok(())
    }
}
