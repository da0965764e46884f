use super::chain::ChainSnapshot;
use super::crypto::Address;

/// Known peers and the last chain snapshot each one supplied.
///
/// Entries keep their registration order; conflict resolution scans them in
/// that order.
#[derive(Debug, Clone, Default)]
pub struct PeerRegistry {
    entries: Vec<(Address, Option<ChainSnapshot>)>,
}

impl PeerRegistry {
    /// Creates a registry seeded with the local node, which has no snapshot
    pub fn new(self_id: Address) -> Self {
        PeerRegistry {
            entries: vec![(self_id, None)],
        }
    }

    /// Inserts a peer, or overwrites the snapshot of an already known one
    pub fn register(&mut self, identifier: Address, snapshot: Option<ChainSnapshot>) {
        match self.entries.iter_mut().find(|(id, _)| *id == identifier) {
            Some((_, existing)) => *existing = snapshot,
            None => self.entries.push((identifier, snapshot)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, identifier: &Address) -> bool {
        self.entries.iter().any(|(id, _)| id == identifier)
    }

    /// The snapshot attached to `identifier`, if the peer is known and has one
    pub fn snapshot_of(&self, identifier: &Address) -> Option<&ChainSnapshot> {
        self.entries
            .iter()
            .find(|(id, _)| id == identifier)
            .and_then(|(_, snapshot)| snapshot.as_ref())
    }

    pub fn identifiers(&self) -> Vec<Address> {
        self.entries.iter().map(|(id, _)| id.clone()).collect()
    }

    /// Iterates peers in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&Address, Option<&ChainSnapshot>)> {
        self.entries.iter().map(|(id, snapshot)| (id, snapshot.as_ref()))
    }
}
