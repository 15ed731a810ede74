//! Interrupt line allocator.

use std::fmt;

use crate::diag::{AllocEvent, Journal};
use crate::slots::SlotSpace;
use crate::{AllocError, IrqConfig, NameTable, Namespace};

/// Owns the IRQ name→line table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrqAllocator {
    space: SlotSpace,
    journal: Journal,
}

impl IrqAllocator {
    /// Validates `config` and registers the reserved lines in order.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::Configuration`] when more than
    /// [`crate::MAX_IRQS`] lines are requested, or any [`IrqAllocator::add`]
    /// error raised by a reserved entry.
    pub fn new<I, N, L>(config: IrqConfig, reserved: I) -> Result<Self, AllocError>
    where
        I: IntoIterator<Item = (N, L)>,
        N: AsRef<str>,
        L: Into<i64>,
    {
        config.validate()?;
        let mut journal = Journal::new();
        journal.record(AllocEvent::IrqCreated {
            capacity: config.n_irqs,
        });

        let mut irq = Self {
            space: SlotSpace::new(Namespace::Irq, config.n_irqs),
            journal,
        };
        for (name, line) in reserved {
            irq.add(name.as_ref(), Some(line.into()))?;
        }
        Ok(irq)
    }

    /// Registers `name` at `line`, or at the lowest free line.
    ///
    /// # Errors
    ///
    /// - [`AllocError::DuplicateName`] when `name` is already registered.
    /// - [`AllocError::LocationInUse`] when `line` belongs to another IRQ.
    /// - [`AllocError::Range`] when `line` is negative or not below
    ///   [`IrqAllocator::capacity`].
    /// - [`AllocError::OutOfLocations`] when every line is taken.
    pub fn add(&mut self, name: &str, line: Option<i64>) -> Result<u32, AllocError> {
        self.space.claim(name, line, &mut self.journal)
    }

    /// Number of interrupt lines.
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.space.capacity()
    }

    /// Line assigned to `name`.
    #[must_use]
    pub fn line(&self, name: &str) -> Option<u32> {
        self.space.get(name)
    }

    /// Name→line table in registration order.
    #[must_use]
    pub const fn lines(&self) -> &NameTable<u32> {
        self.space.table()
    }

    /// Diagnostic events recorded so far.
    #[must_use]
    pub fn events(&self) -> &[AllocEvent] {
        self.journal.events()
    }
}

impl fmt::Display for IrqAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IRQ Handler (up to {} Locations).", self.capacity())?;
        if !self.lines().is_empty() {
            write!(f, "\nIRQ Locations: ({})", self.lines().len())?;
        }
        for (name, line) in self.lines().iter() {
            write!(f, "\n- {name:<20}: {line}")?;
        }
        Ok(())
    }
}
