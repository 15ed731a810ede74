use std::fmt;

use soc_alloc::{AllocError, AllocEvent, BusAllocator, CsrAllocator, IrqAllocator, ReservedRegion};

use crate::{LayoutExport, SocDescription};

/// Allocated layout of one SoC description.
#[derive(Debug, Clone)]
pub struct Plan {
    bus: BusAllocator,
    csr: CsrAllocator,
    irq: IrqAllocator,
}

impl Plan {
    /// Runs every request of `description` through the allocators.
    ///
    /// Bus requests go first (reserved regions, IO windows, masters, slaves),
    /// then CSRs, then IRQs, each section in declaration order. The slave
    /// decoders are built last so misaligned slave regions are reported here
    /// rather than at interconnect generation.
    ///
    /// # Errors
    ///
    /// Returns the first [`AllocError`] raised by any request.
    pub fn build(description: &SocDescription) -> Result<Self, AllocError> {
        let reserved = description
            .reserved_regions
            .iter()
            .map(|entry| (entry.name.as_str(), ReservedRegion::from(entry.region)));
        let mut bus = BusAllocator::new(&description.bus, reserved)?;
        for window in &description.io_regions {
            bus.add_io_region(&window.name, window.region)?;
        }
        for master in &description.masters {
            let windows = master
                .io_regions
                .iter()
                .map(|window| (window.name.as_str(), window.region));
            bus.add_master_with_io(master.name.as_deref(), (), windows)?;
        }
        for slave in &description.slaves {
            bus.add_slave(slave.name.as_deref(), (), slave.region)?;
        }
        bus.decoders()?;

        let reserved_csrs = description
            .reserved_csrs
            .iter()
            .map(|entry| (entry.name.as_str(), entry.location));
        let mut csr = CsrAllocator::new(description.csr, reserved_csrs)?;
        for request in &description.csrs {
            if request.reuse {
                csr.add_or_reuse(&request.name, request.location)?;
            } else {
                csr.add(&request.name, request.location)?;
            }
        }

        let reserved_irqs = description
            .reserved_irqs
            .iter()
            .map(|entry| (entry.name.as_str(), entry.location));
        let mut irq = IrqAllocator::new(description.irq, reserved_irqs)?;
        for request in &description.irqs {
            irq.add(&request.name, request.location)?;
        }

        Ok(Self { bus, csr, irq })
    }

    /// Bus allocator state.
    #[must_use]
    pub const fn bus(&self) -> &BusAllocator {
        &self.bus
    }

    /// CSR allocator state.
    #[must_use]
    pub const fn csr(&self) -> &CsrAllocator {
        &self.csr
    }

    /// IRQ allocator state.
    #[must_use]
    pub const fn irq(&self) -> &IrqAllocator {
        &self.irq
    }

    /// Diagnostic events of all three allocators, bus first.
    pub fn events(&self) -> impl Iterator<Item = &AllocEvent> + '_ {
        self.bus
            .events()
            .iter()
            .chain(self.csr.events())
            .chain(self.irq.events())
    }

    /// Machine-readable export of the layout.
    #[must_use]
    pub fn export(&self) -> LayoutExport {
        LayoutExport::from_plan(self)
    }

    /// One-line count of everything allocated.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} regions, {} io regions, {} masters, {} slaves, {} csrs, {} irqs",
            self.bus.regions().len(),
            self.bus.io_regions().len(),
            self.bus.masters().len(),
            self.bus.slaves().len(),
            self.csr.locations().len(),
            self.irq.lines().len()
        )
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}\n{}", self.bus, self.csr, self.irq)
    }
}
