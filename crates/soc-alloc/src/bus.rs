//! Shared-bus region, master and slave bookkeeping.
//!
//! The bus allocator owns three ordered registries: the named region table
//! (physical and linker regions), the uncached IO windows uncached regions are
//! carved from, and the master/slave handle tables. Handles are opaque and
//! only passed through to [`Interconnect`] at finalize time.

use std::fmt;
use std::ops::Range;

use crate::diag::{AllocEvent, Journal};
use crate::{
    AllocError, BusConfig, BusStandard, Decoder, Interconnect, NameTable, Namespace, Region,
    RegionKind, ReservedRegion,
};

/// Returns the first overlapping pair in whole-table pairwise order.
///
/// Linker regions are exempt from every comparison.
#[must_use]
pub fn check_regions<'a, I>(regions: I) -> Option<(&'a str, &'a str)>
where
    I: IntoIterator<Item = (&'a str, &'a Region)>,
{
    let regions: Vec<_> = regions.into_iter().collect();
    regions.iter().enumerate().find_map(|(index, (n0, r0))| {
        regions[index + 1..]
            .iter()
            .find(|(_, r1)| r0.overlaps(r1))
            .map(|(n1, _)| (*n0, *n1))
    })
}

/// Region, master and slave registries of one shared bus.
#[derive(Debug, Clone)]
pub struct BusAllocator<M = (), S = ()> {
    standard: BusStandard,
    data_width: u32,
    address_width: u32,
    timeout: u64,
    regions: NameTable<Region>,
    io_regions: NameTable<Region>,
    masters: NameTable<M>,
    slaves: NameTable<S>,
    journal: Journal,
}

impl<M, S> BusAllocator<M, S> {
    /// Validates `config` and registers the reserved regions in order.
    ///
    /// Reserved entries go through [`BusAllocator::add_region`], so origin-less
    /// reservations are allocated first-fit in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::Configuration`] for unsupported parameters, or
    /// any error raised while registering a reserved region.
    pub fn new<I, N, R>(config: &BusConfig, reserved: I) -> Result<Self, AllocError>
    where
        I: IntoIterator<Item = (N, R)>,
        N: AsRef<str>,
        R: Into<ReservedRegion>,
    {
        let standard = config.validate()?;
        let mut journal = Journal::new();
        journal.record(AllocEvent::BusCreated {
            standard,
            data_width: config.data_width,
            address_width: config.address_width,
        });

        let mut bus = Self {
            standard,
            data_width: config.data_width,
            address_width: config.address_width,
            timeout: config.timeout,
            regions: NameTable::new(),
            io_regions: NameTable::new(),
            masters: NameTable::new(),
            slaves: NameTable::new(),
            journal,
        };
        for (name, reserved) in reserved {
            bus.add_region(name.as_ref(), reserved.into().into_region())?;
        }
        Ok(bus)
    }

    /// Registers a region under `name`, returning the region as stored.
    ///
    /// - Linker regions are stored without overlap checking.
    /// - Regions without an origin are placed by [`BusAllocator::alloc_region`].
    /// - Other regions are stored as given once the table is known to stay
    ///   overlap-free.
    ///
    /// Nothing is stored when an error is returned.
    ///
    /// # Errors
    ///
    /// - [`AllocError::DuplicateName`] when `name` is already a region.
    /// - [`AllocError::IncompleteRegion`] when the size (or, for linker
    ///   regions, the origin) is missing or the size is zero.
    /// - [`AllocError::Overlap`] naming both regions of the first conflict.
    /// - [`AllocError::OutOfAddressSpace`] when allocation finds no room.
    pub fn add_region(&mut self, name: &str, region: Region) -> Result<Region, AllocError> {
        if self.regions.contains(name) {
            return Err(AllocError::DuplicateName {
                namespace: Namespace::Region,
                name: name.to_string(),
            });
        }
        let size = require_size(&region)?;

        let (stored, event) = match (region.kind(), region.origin()) {
            (RegionKind::Linker, None) => {
                return Err(AllocError::IncompleteRegion {
                    region,
                    missing: "an origin",
                });
            }
            (RegionKind::Linker, Some(_)) => (
                region,
                AllocEvent::LinkerRegionAdded {
                    name: name.to_string(),
                    region,
                },
            ),
            (RegionKind::Physical, None) => {
                let allocated = self.alloc_region(size, region.is_cached())?;
                (
                    allocated,
                    AllocEvent::RegionAllocated {
                        name: name.to_string(),
                        region: allocated,
                    },
                )
            }
            (RegionKind::Physical, Some(_)) => {
                let candidate = self.regions.iter().chain([(name, &region)]);
                if let Some((first, second)) = check_regions(candidate) {
                    return Err(self.overlap_error(first, second, name, region));
                }
                (
                    region,
                    AllocEvent::RegionAdded {
                        name: name.to_string(),
                        region,
                    },
                )
            }
        };
        self.regions.insert(name.to_string(), stored);
        self.journal.record(event);
        Ok(stored)
    }

    /// Finds the first free region of `size` bytes without registering it.
    ///
    /// Cached requests search the whole address space outside the declared
    /// IO windows; uncached requests search only the IO windows, in
    /// declaration order. Candidates start at the window origin and, on
    /// conflict, move to the end of the conflicting region or window.
    ///
    /// The candidate is not realigned after a move, so it may start off a
    /// multiple of its rounded size. Such a region is still registered but
    /// [`Region::decoder_for`] rejects it with [`AllocError::Alignment`].
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::OutOfAddressSpace`] when no candidate fits, and
    /// [`AllocError::IncompleteRegion`] for a zero size.
    pub fn alloc_region(&self, size: u64, cached: bool) -> Result<Region, AllocError> {
        if size == 0 {
            return Err(AllocError::IncompleteRegion {
                region: Region::sized(size).with_cached(cached),
                missing: "a non-zero size",
            });
        }

        let windows: Vec<Range<u64>> = if cached {
            vec![0..self.address_space_size()]
        } else {
            self.io_regions.values().filter_map(Region::span).collect()
        };

        for window in windows {
            let mut origin = window.start;
            while let Some(end) = origin.checked_add(size) {
                if end > window.end {
                    break;
                }
                let candidate = Region::at(origin, size).with_cached(cached);
                let conflict = self
                    .regions
                    .find(|allocated| allocated.overlaps(&candidate))
                    .or_else(|| {
                        cached
                            .then(|| self.io_regions.find(|io| io.overlaps(&candidate)))
                            .flatten()
                    });
                match conflict {
                    Some((_, conflict)) => {
                        origin = conflict.span().map_or(end, |span| span.end);
                    }
                    None => return Ok(candidate),
                }
            }
        }

        Err(AllocError::OutOfAddressSpace { size, cached })
    }

    /// Declares an uncached IO window that uncached allocations are carved from.
    ///
    /// # Errors
    ///
    /// - [`AllocError::DuplicateName`] when `name` is already an IO window.
    /// - [`AllocError::UnsupportedRegionKind`] for linker regions.
    /// - [`AllocError::IncompleteRegion`] without origin or non-zero size.
    /// - [`AllocError::Overlap`] when two IO windows overlap.
    pub fn add_io_region(&mut self, name: &str, region: Region) -> Result<(), AllocError> {
        let region = self.check_io_region(name, region, &[])?;
        self.insert_io_region(name.to_string(), region);
        Ok(())
    }

    /// Validates one IO window against the declared windows and `pending`
    /// ones not yet inserted, returning it marked uncached.
    fn check_io_region(
        &self,
        name: &str,
        region: Region,
        pending: &[(String, Region)],
    ) -> Result<Region, AllocError> {
        let declared = || {
            self.io_regions
                .iter()
                .chain(pending.iter().map(|(io_name, io)| (io_name.as_str(), io)))
        };

        if declared().any(|(io_name, _)| io_name == name) {
            return Err(AllocError::DuplicateName {
                namespace: Namespace::IoRegion,
                name: name.to_string(),
            });
        }
        if region.is_linker() {
            return Err(AllocError::UnsupportedRegionKind {
                name: name.to_string(),
                kind: region.kind(),
            });
        }
        require_size(&region)?;
        if region.origin().is_none() {
            return Err(AllocError::IncompleteRegion {
                region,
                missing: "an origin",
            });
        }

        let region = region.uncached();
        if let Some((first, first_region)) = declared().find(|(_, io)| io.overlaps(&region)) {
            return Err(AllocError::Overlap {
                first: first.to_string(),
                first_region: *first_region,
                second: name.to_string(),
                second_region: region,
            });
        }
        Ok(region)
    }

    fn insert_io_region(&mut self, name: String, region: Region) {
        self.journal.record(AllocEvent::IoRegionAdded {
            name: name.clone(),
            region,
        });
        self.io_regions.insert(name, region);
    }

    /// Registers a bus master, naming it `master<N>` when `name` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::DuplicateName`] when the name is taken.
    pub fn add_master(&mut self, name: Option<&str>, handle: M) -> Result<String, AllocError> {
        self.add_master_with_io(name, handle, std::iter::empty::<(&str, Region)>())
    }

    /// Registers a bus master together with the IO windows it exposes.
    ///
    /// Every window is checked against the declared windows and the ones
    /// before it in `io_regions` before anything is registered, so a failure
    /// leaves the allocator unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::DuplicateName`] when the master name is taken, or
    /// any [`BusAllocator::add_io_region`] error.
    pub fn add_master_with_io<I, N>(
        &mut self,
        name: Option<&str>,
        handle: M,
        io_regions: I,
    ) -> Result<String, AllocError>
    where
        I: IntoIterator<Item = (N, Region)>,
        N: AsRef<str>,
    {
        let name = name.map_or_else(|| format!("master{}", self.masters.len()), str::to_string);
        if self.masters.contains(&name) {
            return Err(AllocError::DuplicateName {
                namespace: Namespace::Master,
                name,
            });
        }
        let mut pending: Vec<(String, Region)> = Vec::new();
        for (io_name, region) in io_regions {
            let region = self.check_io_region(io_name.as_ref(), region, &pending)?;
            pending.push((io_name.as_ref().to_string(), region));
        }
        for (io_name, region) in pending {
            self.insert_io_region(io_name, region);
        }

        self.masters.insert(name.clone(), handle);
        self.journal
            .record(AllocEvent::MasterAdded { name: name.clone() });
        Ok(name)
    }

    /// Registers a bus slave.
    ///
    /// Without `region`, the slave binds to the existing region named `name`.
    /// With `region`, the region is registered first through
    /// [`BusAllocator::add_region`]. Unnamed slaves are called `slave<N>`.
    ///
    /// # Errors
    ///
    /// - [`AllocError::MissingSlaveIdentity`] with neither name nor region.
    /// - [`AllocError::DuplicateName`] when the slave name is taken.
    /// - [`AllocError::RegionNotFound`] when no region matches `name`.
    /// - Any [`BusAllocator::add_region`] error.
    pub fn add_slave(
        &mut self,
        name: Option<&str>,
        handle: S,
        region: Option<Region>,
    ) -> Result<String, AllocError> {
        if name.is_none() && region.is_none() {
            return Err(AllocError::MissingSlaveIdentity);
        }
        let name = name.map_or_else(|| format!("slave{}", self.slaves.len()), str::to_string);
        if self.slaves.contains(&name) {
            return Err(AllocError::DuplicateName {
                namespace: Namespace::Slave,
                name,
            });
        }

        match region {
            Some(region) => {
                self.add_region(&name, region)?;
            }
            None if !self.regions.contains(&name) => {
                return Err(AllocError::RegionNotFound { name });
            }
            None => {}
        }

        self.slaves.insert(name.clone(), handle);
        self.journal.record(AllocEvent::SlaveAdded { name: name.clone() });
        Ok(name)
    }

    /// Bus protocol family.
    #[must_use]
    pub const fn standard(&self) -> BusStandard {
        self.standard
    }

    /// Data width in bits.
    #[must_use]
    pub const fn data_width(&self) -> u32 {
        self.data_width
    }

    /// Address width in bits.
    #[must_use]
    pub const fn address_width(&self) -> u32 {
        self.address_width
    }

    /// Transaction timeout in cycles.
    #[must_use]
    pub const fn timeout(&self) -> u64 {
        self.timeout
    }

    /// Size of the address space in bytes.
    #[must_use]
    pub const fn address_space_size(&self) -> u64 {
        1_u64 << self.address_width
    }

    /// Byte-to-word address shift: `log2(data_width / 8)`.
    #[must_use]
    pub const fn word_shift(&self) -> u32 {
        (self.data_width / 8).trailing_zeros()
    }

    /// Region registered under `name`.
    #[must_use]
    pub fn region(&self, name: &str) -> Option<&Region> {
        self.regions.get(name)
    }

    /// Physical and linker regions in registration order.
    #[must_use]
    pub const fn regions(&self) -> &NameTable<Region> {
        &self.regions
    }

    /// IO windows in declaration order.
    #[must_use]
    pub const fn io_regions(&self) -> &NameTable<Region> {
        &self.io_regions
    }

    /// Master handles in registration order.
    #[must_use]
    pub const fn masters(&self) -> &NameTable<M> {
        &self.masters
    }

    /// Slave handles in registration order.
    #[must_use]
    pub const fn slaves(&self) -> &NameTable<S> {
        &self.slaves
    }

    /// Diagnostic events recorded so far.
    #[must_use]
    pub fn events(&self) -> &[AllocEvent] {
        self.journal.events()
    }

    /// Builds one decoder per slave, in slave registration order.
    ///
    /// # Errors
    ///
    /// Returns the first decoder error, or [`AllocError::RegionNotFound`] for
    /// a slave without a region.
    pub fn decoders(&self) -> Result<Vec<(Decoder, &S)>, AllocError> {
        self.slaves
            .iter()
            .map(|(name, handle)| Ok((self.slave_decoder(name)?, handle)))
            .collect()
    }

    /// Consumes the allocator and hands the participants to interconnect
    /// generation.
    ///
    /// # Errors
    ///
    /// See [`BusAllocator::decoders`].
    pub fn finalize(self) -> Result<Interconnect<M, S>, AllocError> {
        let decoders = self
            .slaves
            .names()
            .map(|name| self.slave_decoder(name))
            .collect::<Result<Vec<_>, _>>()?;
        let slaves = decoders
            .into_iter()
            .zip(self.slaves.into_iter().map(|(_, handle)| handle))
            .collect();

        Ok(Interconnect {
            masters: self.masters.into_iter().map(|(_, handle)| handle).collect(),
            slaves,
            timeout: self.timeout,
            data_width: self.data_width,
        })
    }

    fn slave_decoder(&self, name: &str) -> Result<Decoder, AllocError> {
        self.regions
            .get(name)
            .ok_or_else(|| AllocError::RegionNotFound {
                name: name.to_string(),
            })?
            .decoder_for(self.address_width, self.word_shift())
    }

    fn overlap_error(&self, first: &str, second: &str, name: &str, region: Region) -> AllocError {
        let lookup = |entry: &str| {
            if entry == name {
                region
            } else {
                self.regions.get(entry).copied().unwrap_or(region)
            }
        };
        AllocError::Overlap {
            first: first.to_string(),
            first_region: lookup(first),
            second: second.to_string(),
            second_region: lookup(second),
        }
    }
}

fn require_size(region: &Region) -> Result<u64, AllocError> {
    match region.size() {
        Some(size) if size > 0 => Ok(size),
        Some(_) => Err(AllocError::IncompleteRegion {
            region: *region,
            missing: "a non-zero size",
        }),
        None => Err(AllocError::IncompleteRegion {
            region: *region,
            missing: "a size",
        }),
    }
}

impl<M, S> fmt::Display for BusAllocator<M, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-bit {} Bus, {}GiB Address Space.",
            self.data_width,
            self.standard,
            self.address_space_size() >> 30
        )?;
        if !self.regions.is_empty() {
            write!(f, "\nBus Regions: ({})", self.regions.len())?;
        }
        for (name, region) in self.regions.iter() {
            write!(f, "\n{name:<20}: {region}")?;
        }
        if !self.io_regions.is_empty() {
            write!(f, "\nIO Regions: ({})", self.io_regions.len())?;
        }
        for (name, region) in self.io_regions.iter() {
            write!(f, "\n{name:<20}: {region}")?;
        }
        if !self.masters.is_empty() {
            write!(f, "\nBus Masters: ({})", self.masters.len())?;
        }
        for name in self.masters.names() {
            write!(f, "\n- {name}")?;
        }
        if !self.slaves.is_empty() {
            write!(f, "\nBus Slaves: ({})", self.slaves.len())?;
        }
        for name in self.slaves.names() {
            write!(f, "\n- {name}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{check_regions, BusAllocator};
    use crate::diag::AllocEvent;
    use crate::{AllocError, BusConfig, ErrorKind, Namespace, Region, RESERVED_REGION_SIZE};

    fn empty_bus() -> BusAllocator<&'static str, &'static str> {
        BusAllocator::new(&BusConfig::default(), std::iter::empty::<(&str, Region)>())
            .expect("default bus config")
    }

    #[test]
    fn reserved_regions_are_added_then_allocated_in_order() {
        let bus: BusAllocator = BusAllocator::new(
            &BusConfig::default(),
            [
                ("rom", Region::at(0x100, 0x400)),
                ("sram", Region::sized(0x200)),
            ],
        )
        .unwrap();

        assert_eq!(bus.region("rom"), Some(&Region::at(0x100, 0x400)));
        assert_eq!(bus.region("sram"), Some(&Region::at(0x500, 0x200)));
        assert!(matches!(bus.events()[0], AllocEvent::BusCreated { .. }));
        assert!(matches!(
            &bus.events()[2],
            AllocEvent::RegionAllocated { name, .. } if name == "sram"
        ));
    }

    #[test]
    fn bare_origin_reservations_span_sixteen_mib() {
        let bus: BusAllocator =
            BusAllocator::new(&BusConfig::default(), [("main_ram", 0x4000_0000_u64)]).unwrap();
        let region = bus.region("main_ram").unwrap();
        assert_eq!(region.origin(), Some(0x4000_0000));
        assert_eq!(region.size(), Some(RESERVED_REGION_SIZE));
    }

    #[rstest]
    #[case(BusConfig { data_width: 8, ..BusConfig::default() })]
    #[case(BusConfig { address_width: 24, ..BusConfig::default() })]
    #[case(BusConfig { standard: "axi-lite".to_string(), ..BusConfig::default() })]
    fn construction_rejects_unsupported_parameters(#[case] config: BusConfig) {
        let err = BusAllocator::<(), ()>::new(&config, std::iter::empty::<(&str, Region)>())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn explicit_overlap_is_rejected_and_not_stored() {
        let mut bus = empty_bus();
        bus.add_region("rom", Region::at(0x0, 0x1000)).unwrap();

        let err = bus
            .add_region("sram", Region::at(0x800, 0x1000))
            .unwrap_err();
        assert_eq!(
            err,
            AllocError::Overlap {
                first: "rom".to_string(),
                first_region: Region::at(0x0, 0x1000),
                second: "sram".to_string(),
                second_region: Region::at(0x800, 0x1000),
            }
        );
        assert!(bus.region("sram").is_none());
        assert_eq!(bus.regions().len(), 1);

        bus.add_region("sram", Region::at(0x1000, 0x1000)).unwrap();
    }

    #[test]
    fn duplicate_region_name_is_rejected() {
        let mut bus = empty_bus();
        bus.add_region("rom", Region::at(0x0, 0x1000)).unwrap();
        assert_eq!(
            bus.add_region("rom", Region::sized(0x100)),
            Err(AllocError::DuplicateName {
                namespace: Namespace::Region,
                name: "rom".to_string(),
            })
        );
    }

    #[test]
    fn linker_regions_skip_overlap_checks() {
        let mut bus = empty_bus();
        bus.add_region("rom", Region::at(0x0, 0x1000)).unwrap();
        bus.add_region("text", Region::linker(0x0, 0x800)).unwrap();
        assert!(matches!(
            bus.events().last(),
            Some(AllocEvent::LinkerRegionAdded { name, .. }) if name == "text"
        ));

        let allocated = bus.add_region("sram", Region::sized(0x1000)).unwrap();
        assert_eq!(allocated.origin(), Some(0x1000));
    }

    #[test]
    fn linker_region_needs_origin() {
        let mut bus = empty_bus();
        let request = Region::from_parts(None, Some(0x100), true, crate::RegionKind::Linker);
        let err = bus.add_region("text", request).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn regions_need_a_size() {
        let mut bus = empty_bus();
        let request = Region::from_parts(Some(0x0), None, true, crate::RegionKind::Physical);
        assert_eq!(
            bus.add_region("rom", request).unwrap_err().kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            bus.add_region("rom", Region::at(0x0, 0)).unwrap_err().kind(),
            ErrorKind::InvalidInput
        );
    }

    #[test]
    fn first_fit_skips_past_each_conflict() {
        let mut bus = empty_bus();
        bus.add_region("a", Region::at(0x0, 0x100)).unwrap();
        bus.add_region("b", Region::at(0x100, 0x100)).unwrap();
        bus.add_region("c", Region::at(0x300, 0x100)).unwrap();

        assert_eq!(bus.alloc_region(0x100, true), Ok(Region::at(0x200, 0x100)));
        assert_eq!(bus.alloc_region(0x200, true), Ok(Region::at(0x400, 0x200)));
        assert_eq!(bus.regions().len(), 3);
    }

    #[test]
    fn cached_search_fails_when_space_is_exhausted() {
        let mut bus = empty_bus();
        bus.add_region("all", Region::at(0x0, 0xFFFF_0000)).unwrap();
        assert_eq!(bus.alloc_region(0x1_0000, true), Ok(Region::at(0xFFFF_0000, 0x1_0000)));
        assert_eq!(
            bus.alloc_region(0x2_0000, true),
            Err(AllocError::OutOfAddressSpace {
                size: 0x2_0000,
                cached: true,
            })
        );
    }

    #[test]
    fn cached_allocation_skips_io_windows() {
        let mut bus = empty_bus();
        bus.add_io_region("io", Region::at(0x0, 0x8000_0000)).unwrap();

        let sram = bus.add_region("sram", Region::sized(0x1000)).unwrap();
        assert_eq!(sram, Region::at(0x8000_0000, 0x1000));
        let csr = bus.add_region("csr", Region::sized(0x1000).uncached()).unwrap();
        assert_eq!(csr, Region::at(0x0, 0x1000).uncached());
    }

    #[test]
    fn cached_allocation_fails_when_io_windows_cover_the_space() {
        let mut bus = empty_bus();
        bus.add_io_region("lo", Region::at(0x0, 0x8000_0000)).unwrap();
        bus.add_io_region("hi", Region::at(0x8000_0000, 0x8000_0000)).unwrap();
        assert_eq!(
            bus.alloc_region(0x1000, true),
            Err(AllocError::OutOfAddressSpace {
                size: 0x1000,
                cached: true,
            })
        );
    }

    #[test]
    fn allocation_after_conflict_is_not_realigned() {
        let mut bus = empty_bus();
        bus.add_region("rom", Region::at(0x0, 0x1000)).unwrap();

        let sram = bus.add_region("sram", Region::sized(0x2000)).unwrap();
        assert_eq!(sram, Region::at(0x1000, 0x2000));
        assert_eq!(
            sram.decoder_for(bus.address_width(), bus.word_shift()),
            Err(AllocError::Alignment {
                origin: 0x1000,
                size: 0x2000,
            })
        );
    }

    #[test]
    fn uncached_allocation_without_io_windows_is_out_of_space() {
        let bus = empty_bus();
        let err = bus.alloc_region(0x100, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfSpace);
    }

    #[test]
    fn uncached_allocation_is_carved_from_io_windows() {
        let mut bus = empty_bus();
        bus.add_io_region("io0", Region::at(0x8000_0000, 0x1000)).unwrap();
        bus.add_io_region("io1", Region::at(0xF000_0000, 0x1_0000)).unwrap();

        let first = bus.add_region("csr", Region::sized(0x800).uncached()).unwrap();
        assert_eq!(first, Region::at(0x8000_0000, 0x800).uncached());
        let second = bus.add_region("uart", Region::sized(0x800).uncached()).unwrap();
        assert_eq!(second.origin(), Some(0x8000_0800));
        let third = bus.add_region("eth", Region::sized(0x1000).uncached()).unwrap();
        assert_eq!(third.origin(), Some(0xF000_0000));
        assert!(!third.is_cached());
    }

    #[test]
    fn io_windows_must_not_overlap_each_other() {
        let mut bus = empty_bus();
        bus.add_io_region("io0", Region::at(0x8000_0000, 0x1000)).unwrap();
        let err = bus
            .add_io_region("io1", Region::at(0x8000_0800, 0x1000))
            .unwrap_err();
        assert!(matches!(
            err,
            AllocError::Overlap { ref first, ref second, .. } if first == "io0" && second == "io1"
        ));
        assert_eq!(
            bus.add_io_region("io0", Region::at(0x9000_0000, 0x1000))
                .unwrap_err()
                .kind(),
            ErrorKind::DuplicateName
        );
        assert_eq!(
            bus.add_io_region("text", Region::linker(0x0, 0x1000))
                .unwrap_err()
                .kind(),
            ErrorKind::InvalidInput
        );
    }

    #[test]
    fn master_with_overlapping_windows_registers_nothing() {
        let mut bus = empty_bus();
        let events = bus.events().len();
        let err = bus
            .add_master_with_io(
                Some("cpu"),
                "vexriscv",
                [
                    ("io0", Region::at(0x8000_0000, 0x1000)),
                    ("io1", Region::at(0x8000_0800, 0x1000)),
                ],
            )
            .unwrap_err();

        assert!(matches!(
            err,
            AllocError::Overlap { ref first, ref second, .. } if first == "io0" && second == "io1"
        ));
        assert_eq!(bus.io_regions().len(), 0);
        assert_eq!(bus.masters().len(), 0);
        assert_eq!(bus.events().len(), events);

        bus.add_master_with_io(
            Some("cpu"),
            "vexriscv",
            [("io0", Region::at(0x8000_0000, 0x1000))],
        )
        .unwrap();
        assert_eq!(bus.io_regions().len(), 1);
    }

    #[rstest]
    #[case::repeated_name([("io", Region::at(0x8000_0000, 0x1000)), ("io", Region::at(0x9000_0000, 0x1000))], ErrorKind::DuplicateName)]
    #[case::clashes_with_declared([("io1", Region::at(0x9000_0000, 0x1000)), ("io2", Region::at(0xF000_0800, 0x1000))], ErrorKind::Overlap)]
    #[case::linker_window([("io1", Region::at(0x9000_0000, 0x1000)), ("text", Region::linker(0x0, 0x1000))], ErrorKind::InvalidInput)]
    fn master_window_failures_leave_bus_unchanged(
        #[case] windows: [(&str, Region); 2],
        #[case] kind: ErrorKind,
    ) {
        let mut bus = empty_bus();
        bus.add_io_region("io0", Region::at(0xF000_0000, 0x1_0000)).unwrap();
        let events = bus.events().len();

        let err = bus.add_master_with_io(None, "m", windows).unwrap_err();
        assert_eq!(err.kind(), kind);
        assert_eq!(bus.io_regions().names().collect::<Vec<_>>(), ["io0"]);
        assert_eq!(bus.masters().len(), 0);
        assert_eq!(bus.events().len(), events);
    }

    #[test]
    fn masters_are_auto_named_and_unique() {
        let mut bus = empty_bus();
        assert_eq!(bus.add_master(None, "m0"), Ok("master0".to_string()));
        assert_eq!(bus.add_master(Some("cpu"), "m1"), Ok("cpu".to_string()));
        assert_eq!(bus.add_master(None, "m2"), Ok("master2".to_string()));
        assert_eq!(
            bus.add_master(Some("cpu"), "m3"),
            Err(AllocError::DuplicateName {
                namespace: Namespace::Master,
                name: "cpu".to_string(),
            })
        );
        assert_eq!(bus.masters().values().copied().collect::<Vec<_>>(), ["m0", "m1", "m2"]);
    }

    #[test]
    fn master_io_regions_are_declared() {
        let mut bus = empty_bus();
        bus.add_master_with_io(
            Some("cpu"),
            "vexriscv",
            [("io", Region::at(0x8000_0000, 0x8000_0000))],
        )
        .unwrap();
        assert_eq!(bus.io_regions().len(), 1);
        assert_eq!(bus.io_regions().get("io").map(Region::is_cached), Some(false));
    }

    #[test]
    fn slave_by_name_requires_existing_region() {
        let mut bus = empty_bus();
        assert_eq!(
            bus.add_slave(Some("rom"), "rom-handle", None),
            Err(AllocError::RegionNotFound {
                name: "rom".to_string()
            })
        );
        bus.add_region("rom", Region::at(0x0, 0x1000)).unwrap();
        assert_eq!(bus.add_slave(Some("rom"), "rom-handle", None), Ok("rom".to_string()));
    }

    #[test]
    fn slave_needs_name_or_region() {
        let mut bus = empty_bus();
        assert_eq!(
            bus.add_slave(None, "x", None),
            Err(AllocError::MissingSlaveIdentity)
        );
        assert_eq!(
            bus.add_slave(None, "x", Some(Region::sized(0x100))),
            Ok("slave0".to_string())
        );
        assert!(bus.region("slave0").is_some());
    }

    #[test]
    fn duplicate_slave_does_not_grow_region_table() {
        let mut bus = empty_bus();
        bus.add_slave(Some("sram"), "a", Some(Region::sized(0x1000)))
            .unwrap();
        let err = bus
            .add_slave(Some("sram"), "b", Some(Region::sized(0x1000)))
            .unwrap_err();
        assert_eq!(
            err,
            AllocError::DuplicateName {
                namespace: Namespace::Slave,
                name: "sram".to_string(),
            }
        );
        assert_eq!(bus.regions().len(), 1);
    }

    #[test]
    fn check_regions_reports_first_pair_in_table_order() {
        let a = Region::at(0x0, 0x100);
        let b = Region::at(0x200, 0x100);
        let c = Region::at(0x280, 0x100);
        let d = Region::at(0x80, 0x10);
        let table = [("a", &a), ("b", &b), ("c", &c), ("d", &d)];
        assert_eq!(check_regions(table), Some(("a", "d")));
        assert_eq!(check_regions([("a", &a), ("b", &b)]), None);
    }

    #[test]
    fn word_shift_tracks_data_width() {
        let narrow = empty_bus();
        assert_eq!(narrow.word_shift(), 2);
        let wide: BusAllocator = BusAllocator::new(
            &BusConfig {
                data_width: 64,
                ..BusConfig::default()
            },
            std::iter::empty::<(&str, Region)>(),
        )
        .unwrap();
        assert_eq!(wide.word_shift(), 3);
        assert_eq!(wide.address_space_size(), 1 << 32);
    }

    #[test]
    fn finalize_pairs_decoders_with_slave_handles() {
        let mut bus = empty_bus();
        bus.add_master(Some("cpu"), "cpu-port").unwrap();
        bus.add_slave(Some("rom"), "rom-port", Some(Region::at(0x0, 0x8000)))
            .unwrap();
        bus.add_slave(Some("sram"), "sram-port", Some(Region::at(0x1000_0000, 0x1000)))
            .unwrap();

        let interconnect = bus.finalize().unwrap();
        assert_eq!(interconnect.masters, vec!["cpu-port"]);
        assert_eq!(interconnect.timeout, 1_000_000);
        assert!(interconnect.is_routable());
        let routed: Vec<_> = interconnect
            .slaves
            .iter()
            .filter(|(decoder, _)| decoder.matches(0x1000_0000 >> 2))
            .map(|(_, handle)| *handle)
            .collect();
        assert_eq!(routed, ["sram-port"]);
        assert_eq!(interconnect.route(0x10 >> 2), Some(&"rom-port"));
    }

    #[test]
    fn finalize_surfaces_unaligned_slave_regions() {
        let mut bus = empty_bus();
        bus.add_slave(Some("rom"), "rom", Some(Region::at(0x100, 0x400)))
            .unwrap();
        assert_eq!(
            bus.decoders().unwrap_err(),
            AllocError::Alignment {
                origin: 0x100,
                size: 0x400
            }
        );
        assert_eq!(bus.finalize().unwrap_err().kind(), ErrorKind::Alignment);
    }

    #[test]
    fn display_renders_all_tables() {
        let mut bus = empty_bus();
        bus.add_region("rom", Region::at(0x0, 0x8000)).unwrap();
        bus.add_master(Some("cpu"), "cpu").unwrap();
        bus.add_slave(Some("rom"), "rom", None).unwrap();

        let rendered = bus.to_string();
        assert!(rendered.starts_with("32-bit wishbone Bus, 4GiB Address Space."));
        assert!(rendered.contains("Bus Regions: (1)"));
        assert!(rendered.contains("Origin: 0x00000000, Size: 0x00008000, Cached: true"));
        assert!(rendered.contains("Bus Masters: (1)\n- cpu"));
        assert!(rendered.contains("Bus Slaves: (1)\n- rom"));
    }
}
