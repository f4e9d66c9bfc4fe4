//! Bounded rolling history of finalized draws.

use std::collections::BTreeMap;

use crate::MessageRef;

/// One finalized draw as seen on the source channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawRecord {
    pub text: String,
    pub first_group: String,
    pub first_two_cards: Option<String>,
    pub message_id: Option<MessageRef>,
}

/// Draw records keyed by game number, capped at `limit` entries.
///
/// When the cap is exceeded the smallest game number is evicted.
#[derive(Debug, Clone)]
pub struct DrawHistory {
    entries: BTreeMap<u32, DrawRecord>,
    limit: usize,
}

impl DrawHistory {
    #[must_use]
    pub const fn new(limit: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            limit,
        }
    }

    /// Insert or replace the record for `game_number`.
    ///
    /// Returns the evicted game number, if the insert pushed one out.
    pub fn record(&mut self, game_number: u32, record: DrawRecord) -> Option<u32> {
        self.entries.insert(game_number, record);
        if self.entries.len() > self.limit {
            return self.entries.pop_first().map(|(game, _)| game);
        }
        None
    }

    #[must_use]
    pub fn get(&self, game_number: u32) -> Option<&DrawRecord> {
        self.entries.get(&game_number)
    }

    #[must_use]
    pub fn contains(&self, game_number: u32) -> bool {
        self.entries.contains_key(&game_number)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Records in ascending game order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (u32, &DrawRecord)> {
        self.entries.iter().map(|(game, record)| (*game, record))
    }
}
