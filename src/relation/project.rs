//! Projections of a token sequence.
//!
//! Both the canonical text and the visual form are pure functions of the token
//! list and the current coin set. Neither is ever edited in place: edits go to
//! the tokens and the projections are recomputed.
//!
//! Reference labels:
//!
//! ```text
//! Bound(id), id in set     -> "C<position>"
//! Bound(id), id removed    -> "C?"   (stale; see RelationExpression::prune_stale)
//! Unbound(n)               -> "C<n>"
//! ```

use super::token::{CoinRef, Token};
use crate::query_set::{CoinQuerySet, coin_label, parse_coin_label};

/// Label drawn for a reference to a coin that is no longer in the set.
pub const STALE_LABEL: &str = "C?";

pub(crate) fn ref_label(r: CoinRef, coins: &CoinQuerySet) -> String {
    match r {
        CoinRef::Bound(id) => coins.label_of(id).unwrap_or_else(|| STALE_LABEL.to_string()),
        CoinRef::Unbound(n) => coin_label(n),
    }
}

/// Canonical text of `tokens`.
pub fn serialize(tokens: &[Token], coins: &CoinQuerySet) -> String {
    let mut out = String::new();
    for &token in tokens {
        match token {
            Token::CoinRef(r) => out.push_str(&ref_label(r, coins)),
            op => out.push_str(op.operator_text().unwrap_or_default()),
        }
    }
    out
}

/// One node of the editable visual form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualToken {
    pub token: Token,
    /// Reference label, or the operator glyph.
    pub text: String,
}

impl VisualToken {
    pub fn class(&self) -> &'static str {
        self.token.css_class()
    }

    /// Whether this node is a reference to a removed coin.
    pub fn is_stale(&self) -> bool {
        matches!(self.token, Token::CoinRef(_)) && self.text == STALE_LABEL
    }

    /// Markup of the node inside the relation editor.
    pub fn to_html(&self) -> String {
        match self.token {
            Token::CoinRef(_) => format!(r#"<span contenteditable="false" class="id">{}</span>"#, self.text),
            op => format!(r#"<span contenteditable="false" class="op {}">&nbsp;</span>"#, op.css_class()),
        }
    }

    /// Rebuild a node from an edited DOM element's class list and text.
    ///
    /// Elements whose classes name neither `id` nor an operator are not
    /// tokens and yield `None`. Reference labels come back unbound; the
    /// expression binds them against the coin set.
    pub fn from_parts(class_list: &str, text: &str) -> Option<Self> {
        if class_list.split_whitespace().any(|c| c == "id") {
            let n = parse_coin_label(text.trim())?;
            return Some(Self { token: Token::CoinRef(CoinRef::Unbound(n)), text: coin_label(n) });
        }
        let token = class_list.split_whitespace().find_map(Token::operator_from_class)?;
        Some(Self { token, text: token.glyph().unwrap_or_default().to_string() })
    }
}

/// Visual form of `tokens`: one node per token, in order.
pub fn render(tokens: &[Token], coins: &CoinQuerySet) -> Vec<VisualToken> {
    tokens
        .iter()
        .map(|&token| {
            let text = match token {
                Token::CoinRef(r) => ref_label(r, coins),
                op => op.glyph().unwrap_or_default().to_string(),
            };
            VisualToken { token, text }
        })
        .collect()
}

/// Canonical text read straight off a visual form.
pub fn visual_to_text(nodes: &[VisualToken]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node.token {
            Token::CoinRef(_) => out.push_str(&node.text),
            op => out.push_str(op.operator_text().unwrap_or_default()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::CoinDraftBuilder;

    fn set_of(n: usize) -> CoinQuerySet {
        let mut b = CoinDraftBuilder::new();
        let mut set = CoinQuerySet::new();
        for _ in 0..n {
            set.add(b.finalize());
        }
        set
    }

    #[test]
    fn serialize_spaces_binary_operators_only() {
        let coins = set_of(2);
        let c1 = Token::bound(coins.resolve_label(1).unwrap());
        let c2 = Token::bound(coins.resolve_label(2).unwrap());
        let tokens = [Token::Not, Token::OpenParen, c1, Token::And, c2, Token::CloseParen];
        assert_eq!(serialize(&tokens, &coins), " NOT (C1 AND C2)");
    }

    #[test]
    fn stale_references_render_with_marker() {
        let mut coins = set_of(2);
        let c1 = Token::bound(coins.resolve_label(1).unwrap());
        let c2 = Token::bound(coins.resolve_label(2).unwrap());
        coins.remove_at(0);

        let tokens = [c1, Token::Or, c2];
        assert_eq!(serialize(&tokens, &coins), "C? OR C1");
        let nodes = render(&tokens, &coins);
        assert!(nodes[0].is_stale());
        assert!(!nodes[2].is_stale());
    }

    #[test]
    fn visual_nodes_map_to_markup_and_back() {
        let coins = set_of(1);
        let tokens = [Token::bound(coins.resolve_label(1).unwrap()), Token::Or, Token::CoinRef(CoinRef::Unbound(4))];
        let nodes = render(&tokens, &coins);

        assert_eq!(nodes[0].to_html(), r#"<span contenteditable="false" class="id">C1</span>"#);
        assert_eq!(nodes[1].to_html(), r#"<span contenteditable="false" class="op or">&nbsp;</span>"#);
        assert_eq!(visual_to_text(&nodes), "C1 OR C4");

        let rebuilt = VisualToken::from_parts("op p_open", "\u{a0}").unwrap();
        assert_eq!(rebuilt.token, Token::OpenParen);
        let rebuilt = VisualToken::from_parts("id", "C7").unwrap();
        assert_eq!(rebuilt.token, Token::CoinRef(CoinRef::Unbound(7)));
        assert!(VisualToken::from_parts("caret", "").is_none());
    }
}
