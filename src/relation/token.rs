//! Relation tokens.
//!
//! A relation expression is a flat sequence of [`Token`]s. Coin references are
//! either bound to a permanent [`CoinId`] or, when the user typed a label that
//! does not name any coin yet, kept as the raw 1-based label number.

use crate::coin::CoinId;

/// Target of a coin reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoinRef {
    /// Bound to a finalized coin; its label is computed at projection time.
    Bound(CoinId),
    /// A `C<n>` label that did not resolve when it was parsed.
    Unbound(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    CoinRef(CoinRef),
    And,
    Or,
    Not,
    OpenParen,
    CloseParen,
}

impl Token {
    pub fn bound(id: CoinId) -> Self {
        Token::CoinRef(CoinRef::Bound(id))
    }

    pub fn is_binary(self) -> bool {
        matches!(self, Token::And | Token::Or)
    }

    pub fn is_operator(self) -> bool {
        !matches!(self, Token::CoinRef(_))
    }

    /// Canonical text of an operator; `None` for coin references.
    ///
    /// ```text
    /// And -> " AND "   Or -> " OR "   Not -> " NOT "   ( -> "("   ) -> ")"
    /// ```
    pub fn operator_text(self) -> Option<&'static str> {
        match self {
            Token::CoinRef(_) => None,
            Token::And => Some(" AND "),
            Token::Or => Some(" OR "),
            Token::Not => Some(" NOT "),
            Token::OpenParen => Some("("),
            Token::CloseParen => Some(")"),
        }
    }

    /// CSS class of the visual operator node.
    pub fn css_class(self) -> &'static str {
        match self {
            Token::CoinRef(_) => "id",
            Token::And => "and",
            Token::Or => "or",
            Token::Not => "not",
            Token::OpenParen => "p_open",
            Token::CloseParen => "p_close",
        }
    }

    /// Fixed-width glyph drawn for an operator node.
    pub fn glyph(self) -> Option<&'static str> {
        match self {
            Token::CoinRef(_) => None,
            Token::And => Some("∧"),
            Token::Or => Some("∨"),
            Token::Not => Some("¬"),
            Token::OpenParen => Some("("),
            Token::CloseParen => Some(")"),
        }
    }

    /// Operator for a visual CSS class, e.g. `"p_open"`.
    pub fn operator_from_class(class: &str) -> Option<Self> {
        match class {
            "and" => Some(Token::And),
            "or" => Some(Token::Or),
            "not" => Some(Token::Not),
            "p_open" => Some(Token::OpenParen),
            "p_close" => Some(Token::CloseParen),
            _ => None,
        }
    }
}
