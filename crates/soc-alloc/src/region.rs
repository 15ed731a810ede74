//! Bus address-space windows and their power-of-two decoders.

use std::fmt;
use std::ops::Range;

use crate::AllocError;

/// Size in bytes of a reserved region declared by origin only (16 MiB).
pub const RESERVED_REGION_SIZE: u64 = 0x0100_0000;

/// Address width assumed by [`Region::decoder`] when no bus context is given.
pub const DEFAULT_ADDRESS_WIDTH: u32 = 32;

/// Byte-to-word shift assumed by [`Region::decoder`] (32-bit word addressing).
pub const DEFAULT_WORD_SHIFT: u32 = 2;

/// Region classification carried on the region value itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RegionKind {
    /// Physical bus window, subject to overlap checking.
    #[default]
    Physical,
    /// Logical region used for linking only; never overlap checked.
    Linker,
}

/// Window of bus address space.
///
/// A region without an origin is an allocation request: the bus allocator
/// picks the origin. Regions are plain values and are never mutated once
/// registered; builder methods return a new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Region {
    origin: Option<u64>,
    size: Option<u64>,
    #[cfg_attr(feature = "serde", serde(default = "cached_default"))]
    cached: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    kind: RegionKind,
}

#[cfg(feature = "serde")]
const fn cached_default() -> bool {
    true
}

impl Region {
    /// Creates a cached physical region at a fixed origin.
    #[must_use]
    pub const fn at(origin: u64, size: u64) -> Self {
        Self {
            origin: Some(origin),
            size: Some(size),
            cached: true,
            kind: RegionKind::Physical,
        }
    }

    /// Creates a cached physical region request whose origin is allocated.
    #[must_use]
    pub const fn sized(size: u64) -> Self {
        Self {
            origin: None,
            size: Some(size),
            cached: true,
            kind: RegionKind::Physical,
        }
    }

    /// Creates a linker region, exempt from overlap checking.
    #[must_use]
    pub const fn linker(origin: u64, size: u64) -> Self {
        Self {
            origin: Some(origin),
            size: Some(size),
            cached: true,
            kind: RegionKind::Linker,
        }
    }

    /// Creates a region from raw optional parts.
    #[must_use]
    pub const fn from_parts(
        origin: Option<u64>,
        size: Option<u64>,
        cached: bool,
        kind: RegionKind,
    ) -> Self {
        Self {
            origin,
            size,
            cached,
            kind,
        }
    }

    /// Returns the same region marked uncached.
    #[must_use]
    pub const fn uncached(self) -> Self {
        self.with_cached(false)
    }

    /// Returns the same region with the given cacheability.
    #[must_use]
    pub const fn with_cached(self, cached: bool) -> Self {
        Self { cached, ..self }
    }

    /// Base address, when fixed.
    #[must_use]
    pub const fn origin(&self) -> Option<u64> {
        self.origin
    }

    /// Size in bytes, when known.
    #[must_use]
    pub const fn size(&self) -> Option<u64> {
        self.size
    }

    /// Returns `true` for cacheable regions.
    #[must_use]
    pub const fn is_cached(&self) -> bool {
        self.cached
    }

    /// Region classification.
    #[must_use]
    pub const fn kind(&self) -> RegionKind {
        self.kind
    }

    /// Returns `true` for linker regions.
    #[must_use]
    pub const fn is_linker(&self) -> bool {
        matches!(self.kind, RegionKind::Linker)
    }

    /// Half-open byte span `[origin, origin + size)`, saturating at `u64::MAX`.
    #[must_use]
    pub fn span(&self) -> Option<Range<u64>> {
        match (self.origin, self.size) {
            (Some(origin), Some(size)) => Some(origin..origin.saturating_add(size)),
            _ => None,
        }
    }

    /// Returns `true` when two physical regions share at least one byte.
    ///
    /// Linker regions and regions without a fixed span never overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        if self.is_linker() || other.is_linker() {
            return false;
        }
        match (self.span(), other.span()) {
            (Some(a), Some(b)) => !(a.start >= b.end || b.start >= a.end),
            _ => false,
        }
    }

    /// Builds the decoder for a 32-bit, word-addressed bus.
    ///
    /// # Errors
    ///
    /// See [`Region::decoder_for`].
    pub fn decoder(&self) -> Result<Decoder, AllocError> {
        self.decoder_for(DEFAULT_ADDRESS_WIDTH, DEFAULT_WORD_SHIFT)
    }

    /// Builds the masked-prefix decoder for this region.
    ///
    /// The top address bit is ignored, the size is rounded up to a power of
    /// two, and origin and size are converted to word units with
    /// `word_shift`.
    ///
    /// # Errors
    ///
    /// - [`AllocError::Configuration`] when `address_width` is not in
    ///   `1..=64` or `word_shift` is not below it.
    /// - [`AllocError::IncompleteRegion`] when origin or size is unset or the
    ///   size is zero.
    /// - [`AllocError::Alignment`] when the origin is not a multiple of the
    ///   rounded size.
    pub fn decoder_for(&self, address_width: u32, word_shift: u32) -> Result<Decoder, AllocError> {
        if address_width == 0 || address_width > u64::BITS {
            return Err(AllocError::Configuration {
                parameter: "address_width",
                value: address_width.to_string(),
                supported: format!("1..={}", u64::BITS),
            });
        }
        if word_shift >= address_width {
            return Err(AllocError::Configuration {
                parameter: "word_shift",
                value: word_shift.to_string(),
                supported: format!("0..{address_width}"),
            });
        }
        let (Some(origin), Some(size)) = (self.origin, self.size) else {
            return Err(AllocError::IncompleteRegion {
                region: *self,
                missing: "origin and size",
            });
        };
        if size == 0 {
            return Err(AllocError::IncompleteRegion {
                region: *self,
                missing: "a non-zero size",
            });
        }

        let top_bit = address_width - 1;
        let origin_masked = origin & !(1_u64 << top_bit);
        let rounded = size
            .checked_next_power_of_two()
            .ok_or(AllocError::Alignment { origin, size })?;
        if origin_masked & (rounded - 1) != 0 {
            return Err(AllocError::Alignment { origin, size });
        }

        let origin_words = origin_masked >> word_shift;
        let size_words = (rounded >> word_shift).max(1);
        let shift = size_words.trailing_zeros();
        let word_width = address_width - word_shift;

        Ok(Decoder {
            prefix: origin_words >> shift,
            shift,
            mask: (1_u64 << (word_width - 1)) - 1,
        })
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(origin) = self.origin {
            write!(f, "Origin: 0x{origin:08x}, ")?;
        }
        if let Some(size) = self.size {
            write!(f, "Size: 0x{size:08x}, ")?;
        }
        write!(f, "Cached: {}", self.cached)?;
        if self.is_linker() {
            write!(f, ", Linker")?;
        }
        Ok(())
    }
}

/// Reserved bus region supplied at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReservedRegion {
    /// Bare origin, shorthand for a cached region of [`RESERVED_REGION_SIZE`].
    Origin(u64),
    /// Full region descriptor.
    Region(Region),
}

impl ReservedRegion {
    /// Expands the reservation into a region descriptor.
    #[must_use]
    pub const fn into_region(self) -> Region {
        match self {
            Self::Origin(origin) => Region::at(origin, RESERVED_REGION_SIZE),
            Self::Region(region) => region,
        }
    }
}

impl From<u64> for ReservedRegion {
    fn from(origin: u64) -> Self {
        Self::Origin(origin)
    }
}

impl From<Region> for ReservedRegion {
    fn from(region: Region) -> Self {
        Self::Region(region)
    }
}

/// Power-of-two range match over word addresses.
///
/// Accepts a word address when its bits above `log2(size)` (excluding the
/// top, ignored address bit) equal the region origin's prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decoder {
    prefix: u64,
    shift: u32,
    mask: u64,
}

impl Decoder {
    /// Returns `true` when `word_address` falls inside the decoded region.
    #[must_use]
    pub const fn matches(&self, word_address: u64) -> bool {
        (word_address & self.mask) >> self.shift == self.prefix
    }

    /// Word-address prefix compared against.
    #[must_use]
    pub const fn prefix(&self) -> u64 {
        self.prefix
    }

    /// Number of low word-address bits ignored by the match.
    #[must_use]
    pub const fn shift(&self) -> u32 {
        self.shift
    }
}
