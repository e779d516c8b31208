//! Coin draft builder.
//!
//! Accumulates descriptors and keywords for the coin being defined. Every
//! operation is total: invalid input (blank keywords, popping from an empty
//! side, toggling a keyword that is not there) is silently ignored and reported
//! through the return value only.

use crate::coin::{Category, Coin, CoinDraft, CoinId, Descriptor, Item, Keyword, Side};
use tracing::debug;

#[derive(Debug, Default)]
pub struct CoinDraftBuilder {
    draft: CoinDraft,
    next_id: u64,
}

impl CoinDraftBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &CoinDraft {
        &self.draft
    }

    pub fn add_descriptor(&mut self, side: Side, category: Category, item: Item) {
        self.draft.side_mut(side).descriptors.push(Descriptor::new(category, item));
    }

    pub fn remove_last_descriptor(&mut self, side: Side) -> Option<Descriptor> {
        self.draft.side_mut(side).descriptors.pop()
    }

    /// Append a keyword. Returns `false` when `text` is blank.
    pub fn add_keyword(&mut self, side: Side, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        self.draft.side_mut(side).keywords.push(Keyword::new(text));
        true
    }

    /// Flip the first keyword whose text matches; returns the new state.
    pub fn toggle_negation(&mut self, side: Side, text: &str) -> Option<bool> {
        let text = text.trim();
        let keyword = self.draft.side_mut(side).keywords.iter_mut().find(|kw| kw.text == text)?;
        keyword.negated = !keyword.negated;
        Some(keyword.negated)
    }

    /// Remove the first keyword whose text matches.
    pub fn remove_keyword(&mut self, side: Side, text: &str) -> Option<Keyword> {
        let text = text.trim();
        let keywords = &mut self.draft.side_mut(side).keywords;
        let pos = keywords.iter().position(|kw| kw.text == text)?;
        Some(keywords.remove(pos))
    }

    /// Reset both sides to empty.
    pub fn clear(&mut self) {
        self.draft = CoinDraft::default();
    }

    /// Replace the draft with a copy of a stored coin (edit-then-resubmit).
    pub fn load(&mut self, coin: &Coin) {
        self.draft = coin.to_draft();
    }

    /// Move the draft into a new [`Coin`] with a fresh id and reset the draft.
    pub fn finalize(&mut self) -> Coin {
        self.next_id += 1;
        let id = CoinId::from_raw(self.next_id);
        let draft = std::mem::take(&mut self.draft);
        debug!(%id, descriptors = draft.obverse.descriptors.len() + draft.reverse.descriptors.len(), "finalized coin");
        Coin::new(id, draft)
    }
}
