use crate::forest::Forest;
use crate::node::NodeId;
use tracing::debug;

/// Issues decimal node ids, strictly increasing for the life of one session.
///
/// Owned by the session state and passed by `&mut` to whatever creates nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }

    /// Seeds the counter above every numeric id already in `forest`.
    ///
    /// The numeric value of an id is the integer before its first `.`, so `2.1`
    /// counts as `2`. Ids without such a prefix are ignored.
    pub fn seeded_from(forest: &Forest) -> Self {
        let highest = forest
            .ids()
            .filter_map(|id| numeric_prefix(id.as_str()))
            .max()
            .unwrap_or(0);
        debug!(highest, "id generator seeded");
        Self::starting_at(highest.saturating_add(1))
    }

    /// Next id that does not collide with anything in `forest`.
    pub fn next_id(&mut self, forest: &Forest) -> NodeId {
        loop {
            let candidate = NodeId::new(self.next.to_string());
            self.next = self.next.saturating_add(1);
            if !forest.contains(candidate.as_str()) {
                return candidate;
            }
        }
    }

    pub fn peek(&self) -> u64 {
        self.next
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

fn numeric_prefix(id: &str) -> Option<u64> {
    id.split('.').next()?.parse().ok()
}
