//! Ordered collection of finalized coins.
//!
//! Coins are addressed two ways:
//!
//! - by **label** `C<n>`, the 1-based position at read time. Labels shift when
//!   an earlier coin is removed.
//! - by [`CoinId`], fixed at finalize time. Relation expressions bind to ids so
//!   a removal can never silently retarget a reference to a different coin.
//!
//! Mutations here are plain collection operations. Keeping the relation
//! expression and query text in step is the job of `QueryEngine`.

use crate::coin::{Coin, CoinId};
use tracing::debug;

/// Format the display label for a 1-based position.
pub fn coin_label(position: usize) -> String {
    format!("C{position}")
}

/// Parse a `C<digits>` label into its 1-based position.
pub fn parse_coin_label(label: &str) -> Option<usize> {
    let digits = label.strip_prefix('C')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[derive(Debug, Clone, Default)]
pub struct CoinQuerySet {
    coins: Vec<Coin>,
}

impl CoinQuerySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a coin; returns the new size.
    pub fn add(&mut self, coin: Coin) -> usize {
        debug!(id = %coin.id(), position = self.coins.len() + 1, "coin added");
        self.coins.push(coin);
        self.coins.len()
    }

    pub fn clear(&mut self) {
        self.coins.clear();
    }

    /// Remove the coin at the 0-based `index` (label `C<index+1>`).
    pub fn remove_at(&mut self, index: usize) -> Option<Coin> {
        if index >= self.coins.len() {
            return None;
        }
        let coin = self.coins.remove(index);
        debug!(id = %coin.id(), label = %coin_label(index + 1), "coin removed; later labels shift down");
        Some(coin)
    }

    pub fn get(&self, index: usize) -> Option<&Coin> {
        self.coins.get(index)
    }

    pub fn len(&self) -> usize {
        self.coins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Coin> {
        self.coins.iter()
    }

    pub fn last(&self) -> Option<&Coin> {
        self.coins.last()
    }

    /// 0-based position of the coin with `id`, if it is still in the set.
    pub fn position_of(&self, id: CoinId) -> Option<usize> {
        self.coins.iter().position(|c| c.id() == id)
    }

    pub fn contains(&self, id: CoinId) -> bool {
        self.position_of(id).is_some()
    }

    /// Current label of the coin with `id`.
    pub fn label_of(&self, id: CoinId) -> Option<String> {
        self.position_of(id).map(|p| coin_label(p + 1))
    }

    /// Id of the coin currently labelled `C<position>` (1-based).
    pub fn resolve_label(&self, position: usize) -> Option<CoinId> {
        position.checked_sub(1).and_then(|i| self.coins.get(i)).map(Coin::id)
    }

    /// `(label, coin)` pairs in display order.
    pub fn labelled(&self) -> impl Iterator<Item = (String, &Coin)> {
        self.coins.iter().enumerate().map(|(i, c)| (coin_label(i + 1), c))
    }

    /// JSON array of the coins' sides, as sent to the query compiler.
    pub fn to_portable_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.coins)
    }
}

impl<'a> IntoIterator for &'a CoinQuerySet {
    type Item = &'a Coin;
    type IntoIter = std::slice::Iter<'a, Coin>;

    fn into_iter(self) -> Self::IntoIter {
        self.coins.iter()
    }
}
