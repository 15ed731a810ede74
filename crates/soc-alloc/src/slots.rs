//! First-fit allocation over a flat `[0, capacity)` location namespace.
//!
//! Shared by the CSR and IRQ allocators.

use crate::diag::{AllocEvent, Journal};
use crate::{AllocError, NameTable, Namespace};

/// Bounded namespace of unique integer locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SlotSpace {
    namespace: Namespace,
    capacity: u32,
    slots: NameTable<u32>,
}

impl SlotSpace {
    pub(crate) const fn new(namespace: Namespace, capacity: u32) -> Self {
        Self {
            namespace,
            capacity,
            slots: NameTable::new(),
        }
    }

    pub(crate) const fn capacity(&self) -> u32 {
        self.capacity
    }

    pub(crate) const fn table(&self) -> &NameTable<u32> {
        &self.slots
    }

    pub(crate) fn get(&self, name: &str) -> Option<u32> {
        self.slots.get(name).copied()
    }

    /// Name currently holding `location`, if any.
    pub(crate) fn owner_of(&self, location: u32) -> Option<&str> {
        self.slots
            .find(|taken| *taken == location)
            .map(|(name, _)| name)
    }

    /// Registers `name` at `requested`, or at the lowest free location.
    ///
    /// Checks run in order: name clash, location clash, bounds, exhaustion.
    pub(crate) fn claim(
        &mut self,
        name: &str,
        requested: Option<i64>,
        journal: &mut Journal,
    ) -> Result<u32, AllocError> {
        if self.slots.contains(name) {
            return Err(AllocError::DuplicateName {
                namespace: self.namespace,
                name: name.to_string(),
            });
        }

        let Some(requested) = requested else {
            let location = self.first_free().ok_or_else(|| AllocError::OutOfLocations {
                namespace: self.namespace,
                name: name.to_string(),
                capacity: self.capacity,
            })?;
            self.slots.insert(name.to_string(), location);
            journal.record(AllocEvent::LocationAllocated {
                namespace: self.namespace,
                name: name.to_string(),
                location,
            });
            return Ok(location);
        };

        if let Ok(location) = u32::try_from(requested) {
            if let Some(owner) = self.owner_of(location) {
                return Err(AllocError::LocationInUse {
                    namespace: self.namespace,
                    location,
                    owner: owner.to_string(),
                });
            }
        }

        let location = u32::try_from(requested)
            .ok()
            .filter(|location| *location < self.capacity)
            .ok_or(AllocError::Range {
                namespace: self.namespace,
                location: requested,
                capacity: self.capacity,
            })?;

        self.slots.insert(name.to_string(), location);
        journal.record(AllocEvent::LocationAdded {
            namespace: self.namespace,
            name: name.to_string(),
            location,
        });
        Ok(location)
    }

    fn first_free(&self) -> Option<u32> {
        (0..self.capacity).find(|location| self.owner_of(*location).is_none())
    }
}
