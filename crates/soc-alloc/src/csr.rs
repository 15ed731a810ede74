//! CSR location allocator over a paged register address space.

use std::fmt;

use crate::diag::{AllocEvent, Journal};
use crate::slots::SlotSpace;
use crate::{AllocError, CsrConfig, NameTable, Namespace};

/// Owns the CSR name→location table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrAllocator {
    config: CsrConfig,
    space: SlotSpace,
    journal: Journal,
}

impl CsrAllocator {
    /// Validates `config` and registers the reserved CSRs in order.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::Configuration`] for unsupported parameters, or
    /// any [`CsrAllocator::add`] error raised by a reserved entry.
    pub fn new<I, N, L>(config: CsrConfig, reserved: I) -> Result<Self, AllocError>
    where
        I: IntoIterator<Item = (N, L)>,
        N: AsRef<str>,
        L: Into<i64>,
    {
        config.validate()?;
        let capacity = config.capacity()?;
        let mut journal = Journal::new();
        journal.record(AllocEvent::CsrCreated {
            data_width: config.data_width,
            address_width: config.address_width,
            paging: config.paging,
            capacity,
        });

        let mut csr = Self {
            config,
            space: SlotSpace::new(Namespace::Csr, capacity),
            journal,
        };
        for (name, location) in reserved {
            csr.add(name.as_ref(), Some(location.into()))?;
        }
        Ok(csr)
    }

    /// Registers `name` at `location`, or at the lowest free location.
    ///
    /// # Errors
    ///
    /// - [`AllocError::DuplicateName`] when `name` is already registered.
    /// - [`AllocError::LocationInUse`] when `location` belongs to another CSR.
    /// - [`AllocError::Range`] when `location` is negative or not below
    ///   [`CsrAllocator::capacity`].
    /// - [`AllocError::OutOfLocations`] when no location is free.
    pub fn add(&mut self, name: &str, location: Option<i64>) -> Result<u32, AllocError> {
        self.space.claim(name, location, &mut self.journal)
    }

    /// Like [`CsrAllocator::add`], but returns the current location unchanged
    /// when `name` is already registered.
    ///
    /// # Errors
    ///
    /// See [`CsrAllocator::add`] for names not yet registered.
    pub fn add_or_reuse(&mut self, name: &str, location: Option<i64>) -> Result<u32, AllocError> {
        if let Some(existing) = self.space.get(name) {
            self.journal.record(AllocEvent::CsrReused {
                name: name.to_string(),
                location: existing,
            });
            return Ok(existing);
        }
        self.add(name, location)
    }

    /// Number of CSR locations.
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.space.capacity()
    }

    /// Validated construction parameters.
    #[must_use]
    pub const fn config(&self) -> &CsrConfig {
        &self.config
    }

    /// Location assigned to `name`.
    #[must_use]
    pub fn location(&self, name: &str) -> Option<u32> {
        self.space.get(name)
    }

    /// Byte offset of `name`'s page inside the CSR address space.
    #[must_use]
    pub fn offset(&self, name: &str) -> Option<u64> {
        self.location(name)
            .map(|location| u64::from(location) * u64::from(self.config.paging))
    }

    /// Name→location table in registration order.
    #[must_use]
    pub const fn locations(&self) -> &NameTable<u32> {
        self.space.table()
    }

    /// Diagnostic events recorded so far.
    #[must_use]
    pub fn events(&self) -> &[AllocEvent] {
        self.journal.events()
    }
}

impl fmt::Display for CsrAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-bit CSR Bus, {}KiB Address Space, {}B Paging (Up to {} Locations).",
            self.config.data_width,
            (1_u64 << self.config.address_width) >> 10,
            self.config.paging,
            self.capacity()
        )?;
        if !self.locations().is_empty() {
            write!(f, "\nCSR Locations: ({})", self.locations().len())?;
        }
        for (name, location) in self.locations().iter() {
            write!(f, "\n- {name:<20}: {location}")?;
        }
        Ok(())
    }
}
