//! Append-only transcript of conversation turns.

use crate::session::turn::ConversationTurn;

/// Ordered turns of the current session: server history first, then local turns.
///
/// There is no way to edit or remove a turn. The only mutations are a single
/// seeding from history and appending completed exchanges.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Transcript {
    turns: Vec<ConversationTurn>,
    seeded: bool,
}

impl Transcript {
    /// Create an empty, unseeded transcript.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            turns: Vec::new(),
            seeded: false,
        }
    }

    /// Seed from server history. Only the first call has any effect.
    ///
    /// Returns `true` if the history was applied.
    pub fn seed(&mut self, history: Vec<ConversationTurn>) -> bool {
        if self.seeded {
            return false;
        }
        self.seeded = true;
        // Anything appended before seeding stays after the server history.
        let local = std::mem::replace(&mut self.turns, history);
        self.turns.extend(local);
        true
    }

    /// Whether seeding already happened.
    #[must_use]
    pub const fn is_seeded(&self) -> bool {
        self.seeded
    }

    /// Append a completed exchange: the human query, then the ai reply.
    pub fn append_exchange(&mut self, query: impl Into<String>, reply: impl Into<String>) {
        self.turns.reserve(2);
        self.turns.push(ConversationTurn::human(query));
        self.turns.push(ConversationTurn::ai(reply));
    }

    /// Number of turns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.turns().len()
    }

    /// Whether there are no turns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns().is_empty()
    }

    /// Borrow the turns in conversation order.
    #[must_use]
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// Most recent turn, if any.
    #[must_use]
    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }
}
