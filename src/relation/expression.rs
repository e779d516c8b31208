//! The relation expression state.
//!
//! `RelationExpression` owns the token sequence, the single source of truth for
//! both the canonical text and the visual form. All mutation goes through the
//! methods below; raw text edits go through [`tokenize`] first.
//!
//! ## Binding
//!
//! Labels read from text or from edited visual nodes arrive as
//! `CoinRef::Unbound(n)`. [`RelationExpression::bind`] turns every unbound
//! label that names an existing coin into `CoinRef::Bound(id)`. From then on the
//! reference follows the coin, not the position: removing an earlier coin
//! changes the label it is drawn with, never the coin it points at.
//!
//! ## Stale references
//!
//! Removing a coin leaves any `Bound` reference to it in place. Such references
//! are *stale*: they project as `C?` and can be listed with
//! [`RelationExpression::stale_references`]. [`RelationExpression::prune_stale`]
//! removes them and repairs the surrounding operators:
//!
//! ```text
//! C1 OR C2          - C1  ->  C2
//! NOT C1 AND C2     - C1  ->  C2
//! (C1 AND C2) OR C3 - C1  ->  (C2) OR C3
//! C2 AND (C1)       - C1  ->  C2
//! ```

use super::project::{self, VisualToken};
use super::token::{CoinRef, Token};
use super::tokenizer::tokenize;
use crate::coin::CoinId;
use crate::query_set::CoinQuerySet;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationExpression {
    tokens: Vec<Token>,
}

impl RelationExpression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokenize `text` and bind its labels against `coins`.
    pub fn parse(text: &str, coins: &CoinQuerySet) -> Self {
        let mut expr = Self { tokens: tokenize(text).into_iter().map(|l| l.token).collect() };
        expr.bind(coins);
        expr
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn serialize(&self, coins: &CoinQuerySet) -> String {
        project::serialize(&self.tokens, coins)
    }

    pub fn render(&self, coins: &CoinQuerySet) -> Vec<VisualToken> {
        project::render(&self.tokens, coins)
    }

    /// Replace the whole expression with the tokens read from `text`.
    pub fn set_text(&mut self, text: &str, coins: &CoinQuerySet) {
        *self = Self::parse(text, coins);
    }

    /// Replace the whole expression with an edited visual form.
    pub fn apply_visual(&mut self, nodes: &[VisualToken], coins: &CoinQuerySet) {
        self.replace_tokens(nodes.iter().map(|n| n.token), coins);
    }

    pub fn replace_tokens(&mut self, tokens: impl IntoIterator<Item = Token>, coins: &CoinQuerySet) {
        self.tokens = tokens.into_iter().collect();
        self.bind(coins);
    }

    /// Append a token at the end (catalogue click or operator button).
    pub fn push(&mut self, token: Token, coins: &CoinQuerySet) {
        self.tokens.push(token);
        self.bind(coins);
    }

    /// Insert before `index`; `false` if `index` is past the end.
    pub fn insert(&mut self, index: usize, token: Token, coins: &CoinQuerySet) -> bool {
        if index > self.tokens.len() {
            return false;
        }
        self.tokens.insert(index, token);
        self.bind(coins);
        true
    }

    pub fn remove(&mut self, index: usize) -> Option<Token> {
        (index < self.tokens.len()).then(|| self.tokens.remove(index))
    }

    pub fn clear(&mut self) {
        self.tokens.clear();
    }

    /// Follow a change in coin-set size caused by an add or a clear.
    ///
    /// A non-empty set gains `OR <last coin>` (or just `<last coin>` when the
    /// expression is empty); an empty set clears the expression.
    pub fn on_coin_set_size_change(&mut self, coins: &CoinQuerySet) {
        let Some(last) = coins.last() else {
            self.tokens.clear();
            return;
        };
        if !self.tokens.is_empty() {
            self.tokens.push(Token::Or);
        }
        self.tokens.push(Token::bound(last.id()));
    }

    /// Bind unbound labels that now name a coin. Returns how many were bound.
    pub fn bind(&mut self, coins: &CoinQuerySet) -> usize {
        let mut bound = 0;
        for token in &mut self.tokens {
            if let Token::CoinRef(CoinRef::Unbound(n)) = *token {
                if let Some(id) = coins.resolve_label(n) {
                    *token = Token::bound(id);
                    bound += 1;
                }
            }
        }
        bound
    }

    /// Ids referenced by the expression that are no longer in `coins`.
    pub fn stale_references(&self, coins: &CoinQuerySet) -> Vec<CoinId> {
        self.tokens
            .iter()
            .filter_map(|t| match t {
                Token::CoinRef(CoinRef::Bound(id)) if !coins.contains(*id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// Remove stale references and the operators that only served them.
    /// Returns the number of references removed.
    pub fn prune_stale(&mut self, coins: &CoinQuerySet) -> usize {
        let mut removed = 0;
        while let Some(index) = self
            .tokens
            .iter()
            .position(|t| matches!(t, Token::CoinRef(CoinRef::Bound(id)) if !coins.contains(*id)))
        {
            remove_operand(&mut self.tokens, index, index + 1);
            removed += 1;
        }
        if removed > 0 {
            debug!(removed, remaining = self.tokens.len(), "pruned stale coin references");
        }
        removed
    }
}

/// Remove `tokens[start..end]` as one operand, along with any `NOT` in front of
/// it and one adjacent binary operator (the preceding one if present). If that
/// leaves an empty `()` group, the group is removed the same way.
fn remove_operand(tokens: &mut Vec<Token>, start: usize, end: usize) {
    tokens.drain(start..end);
    let mut at = start;

    while at > 0 && tokens[at - 1] == Token::Not {
        at -= 1;
        tokens.remove(at);
    }

    if at > 0 && tokens[at - 1].is_binary() {
        at -= 1;
        tokens.remove(at);
    } else if at < tokens.len() && tokens[at].is_binary() {
        tokens.remove(at);
    }

    if at > 0 && at < tokens.len() && tokens[at - 1] == Token::OpenParen && tokens[at] == Token::CloseParen {
        remove_operand(tokens, at - 1, at + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coin::Side;
    use crate::draft::CoinDraftBuilder;

    fn set_of(n: usize) -> CoinQuerySet {
        let mut b = CoinDraftBuilder::new();
        let mut set = CoinQuerySet::new();
        for i in 0..n {
            b.add_keyword(Side::Obverse, &format!("k{i}"));
            set.add(b.finalize());
        }
        set
    }

    #[test]
    fn parse_binds_existing_labels_only() {
        let coins = set_of(2);
        let expr = RelationExpression::parse("C1 AND C5", &coins);
        assert_eq!(expr.tokens()[0], Token::bound(coins.resolve_label(1).unwrap()));
        assert_eq!(expr.tokens()[2], Token::CoinRef(CoinRef::Unbound(5)));
        assert_eq!(expr.serialize(&coins), "C1 AND C5");
    }

    #[test]
    fn size_change_appends_or_and_clears() {
        let mut coins = CoinQuerySet::new();
        let mut b = CoinDraftBuilder::new();
        let mut expr = RelationExpression::new();

        let mut seen = Vec::new();
        for _ in 0..3 {
            coins.add(b.finalize());
            expr.on_coin_set_size_change(&coins);
            seen.push(expr.serialize(&coins));
        }
        assert_eq!(seen, vec!["C1", "C1 OR C2", "C1 OR C2 OR C3"]);

        coins.clear();
        expr.on_coin_set_size_change(&coins);
        assert!(expr.is_empty());
        assert_eq!(expr.serialize(&coins), "");
    }

    #[test]
    fn bound_references_follow_their_coin() {
        let mut coins = set_of(3);
        let expr = RelationExpression::parse("C2 AND C3", &coins);
        coins.remove_at(0);
        assert_eq!(expr.serialize(&coins), "C1 AND C2");
    }

    #[test]
    fn prune_repairs_operators() {
        // Labels in the expected text are after the shift: old C2 is C1, old C3 is C2.
        let cases = [
            ("C1 OR C2", "C1"),
            ("NOT C1 AND C2", "C1"),
            ("(C1 AND C2) OR C3", "(C1) OR C2"),
            ("C2 AND (C1)", "C1"),
            ("C2 OR NOT (C1)", "C1"),
            ("C1", ""),
        ];
        for (text, expected) in cases {
            let mut coins = set_of(3);
            let mut expr = RelationExpression::parse(text, &coins);
            let doomed = coins.resolve_label(1).unwrap();
            coins.remove_at(0);

            assert_eq!(expr.stale_references(&coins), vec![doomed], "{text}");
            assert_eq!(expr.prune_stale(&coins), 1, "{text}");
            assert_eq!(expr.serialize(&coins), expected, "{text}");
            assert!(expr.stale_references(&coins).is_empty());
        }
    }

    #[test]
    fn prune_without_stale_refs_is_noop() {
        let coins = set_of(2);
        let mut expr = RelationExpression::parse("(C1 OR C2", &coins);
        let before = expr.clone();
        assert_eq!(expr.prune_stale(&coins), 0);
        assert_eq!(expr, before);
    }

    #[test]
    fn edits_bind_new_references() {
        let coins = set_of(2);
        let mut expr = RelationExpression::new();
        expr.push(Token::CoinRef(CoinRef::Unbound(2)), &coins);
        assert!(expr.insert(0, Token::Not, &coins));
        assert!(!expr.insert(10, Token::And, &coins));
        assert_eq!(expr.serialize(&coins), " NOT C2");
        assert_eq!(expr.remove(0), Some(Token::Not));
        assert_eq!(expr.remove(3), None);
        assert_eq!(expr.tokens(), &[Token::bound(coins.resolve_label(2).unwrap())]);
    }

    #[test]
    fn visual_edit_round_trips_through_tokens() {
        let coins = set_of(2);
        let mut expr = RelationExpression::parse("C1 OR C2", &coins);
        let mut nodes = expr.render(&coins);
        nodes.insert(0, VisualToken::from_parts("op not", "").unwrap());
        expr.apply_visual(&nodes, &coins);
        assert_eq!(expr.serialize(&coins), " NOT C1 OR C2");
    }
}
