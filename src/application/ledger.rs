use crate::types::ConversationTurn;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Append-only conversation log shared by every front end of the bridge.
#[derive(Debug, Default)]
pub struct ConversationLedger {
    turns: Mutex<Vec<ConversationTurn>>,
}

impl ConversationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, turn: ConversationTurn) {
        self.lock().push(turn);
    }

    /// Appends every turn under a single lock so readers never observe a
    /// partial exchange.
    pub fn append_all<I>(&self, turns: I)
    where
        I: IntoIterator<Item = ConversationTurn>,
    {
        self.lock().extend(turns);
    }

    pub fn all(&self) -> Vec<ConversationTurn> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Builds the prompt for `query`, prefixed by the most recent `window`
    /// turns (all of them when `None`).
    pub fn render_prompt(&self, query: &str, window: Option<usize>) -> String {
        let turns = self.lock();
        if turns.is_empty() {
            return query.to_string();
        }
        let skip = window
            .map(|limit| turns.len().saturating_sub(limit))
            .unwrap_or(0);
        let lines = turns
            .iter()
            .skip(skip)
            .map(ConversationTurn::render)
            .collect::<Vec<_>>();
        if lines.is_empty() {
            return query.to_string();
        }
        format!(
            "Previous conversation:\n{}\n\nCurrent query: {query}",
            lines.join("\n")
        )
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ConversationTurn>> {
        self.turns.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> ConversationLedger {
        let ledger = ConversationLedger::new();
        ledger.append_all([
            ConversationTurn::user("list products"),
            ConversationTurn::assistant("Executed get_products with args {}"),
            ConversationTurn::tool_result("[shoes, hats]"),
        ]);
        ledger
    }

    #[test]
    fn empty_ledger_renders_bare_query() {
        let ledger = ConversationLedger::new();
        assert_eq!(ledger.render_prompt("hello", None), "hello");
        assert!(ledger.is_empty());
    }

    #[test]
    fn prompt_lists_labelled_turns_in_order() {
        let prompt = seeded().render_prompt("and page 2?", None);
        assert_eq!(
            prompt,
            "Previous conversation:\n\
             User: list products\n\
             Assistant: Executed get_products with args {}\n\
             Result: [shoes, hats]\n\
             \n\
             Current query: and page 2?"
        );
    }

    #[test]
    fn window_keeps_only_the_latest_turns() {
        let prompt = seeded().render_prompt("next", Some(1));
        assert_eq!(
            prompt,
            "Previous conversation:\nResult: [shoes, hats]\n\nCurrent query: next"
        );
    }

    #[test]
    fn clear_empties_the_ledger() {
        let ledger = seeded();
        assert_eq!(ledger.len(), 3);
        ledger.clear();
        assert_eq!(ledger.len(), 0);
        assert!(ledger.all().is_empty());
    }
}
