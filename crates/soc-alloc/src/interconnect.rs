//! Finalize-time view handed to interconnect generation.

use crate::Decoder;

/// Participants of a finalized shared bus.
///
/// Produced once by [`crate::BusAllocator::finalize`]; nothing can be added
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interconnect<M, S> {
    /// Master handles in registration order.
    pub masters: Vec<M>,
    /// Slave handles paired with their region decoders, in registration order.
    pub slaves: Vec<(Decoder, S)>,
    /// Transaction timeout in cycles.
    pub timeout: u64,
    /// Bus data width in bits.
    pub data_width: u32,
}

impl<M, S> Interconnect<M, S> {
    /// Returns `true` when there is at least one master and one slave to connect.
    #[must_use]
    pub fn is_routable(&self) -> bool {
        !self.masters.is_empty() && !self.slaves.is_empty()
    }

    /// First slave whose decoder accepts `word_address`.
    #[must_use]
    pub fn route(&self, word_address: u64) -> Option<&S> {
        self.slaves
            .iter()
            .find(|(decoder, _)| decoder.matches(word_address))
            .map(|(_, slave)| slave)
    }
}

#[cfg(test)]
mod tests {
    use super::Interconnect;
    use crate::Region;

    #[test]
    fn empty_sides_are_not_routable() {
        let decoder = Region::at(0x0, 0x1000).decoder().unwrap();
        let no_masters: Interconnect<(), char> = Interconnect {
            masters: Vec::new(),
            slaves: vec![(decoder, 'r')],
            timeout: 0,
            data_width: 32,
        };
        assert!(!no_masters.is_routable());
        assert_eq!(no_masters.route(0x3FF), Some(&'r'));
        assert_eq!(no_masters.route(0x400), None);
    }
}
