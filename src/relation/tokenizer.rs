//! Text tokenizer for relation expressions.
//!
//! This is the only way text becomes tokens. It scans left to right and takes
//! the leftmost non-overlapping match of:
//!
//! ```text
//! C\d+   -> CoinRef(Unbound(n))
//! AND    -> And
//! OR     -> Or
//! NOT    -> Not
//! (  )   -> OpenParen / CloseParen
//! ```
//!
//! Everything between matches (whitespace, stray words, lowercase operators) is
//! dropped, so such text never reaches the canonical form. A label with leading
//! zeros (`C01`) is dropped too, since it could not be printed back as typed. No attempt is made to
//! disambiguate keywords glued to references: `C1AND C2` reads as `C1 AND C2`,
//! and `ORC1` as `OR C1`.
//!
//! Binding labels to coins happens afterwards, in `expression.rs`.

use super::token::{CoinRef, Token};
use crate::Span;
use tracing::trace;

/// A token together with the byte span it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme {
    pub token: Token,
    pub span: Span,
}

pub fn tokenize(text: &str) -> Vec<Lexeme> {
    let re = regex!(r"C(\d+)|AND|OR|NOT|\(|\)");
    let mut out = Vec::new();

    for caps in re.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let token = match whole.as_str() {
            "AND" => Token::And,
            "OR" => Token::Or,
            "NOT" => Token::Not,
            "(" => Token::OpenParen,
            ")" => Token::CloseParen,
            label => match caps.get(1).map(|d| d.as_str()).and_then(parse_label) {
                Some(n) => Token::CoinRef(CoinRef::Unbound(n)),
                None => {
                    trace!(label, "coin label not canonical or out of range; dropped");
                    continue;
                }
            },
        };
        out.push(Lexeme { token, span: Span { start: whole.start(), end: whole.end() } });
    }

    out
}

/// Digits of a label exactly as `serialize` would print them: no leading zeros.
fn parse_label(digits: &str) -> Option<usize> {
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<Token> {
        tokenize(text).into_iter().map(|l| l.token).collect()
    }

    fn unbound(n: usize) -> Token {
        Token::CoinRef(CoinRef::Unbound(n))
    }

    #[test]
    fn tokenizes_canonical_text() {
        assert_eq!(
            kinds("(C1 OR C2) AND NOT C3"),
            vec![
                Token::OpenParen,
                unbound(1),
                Token::Or,
                unbound(2),
                Token::CloseParen,
                Token::And,
                Token::Not,
                unbound(3),
            ]
        );
    }

    #[test]
    fn drops_unrecognised_text() {
        assert_eq!(kinds("  c1 and C2 xyz "), vec![unbound(2)]);
        assert!(kinds("").is_empty());
    }

    #[test]
    fn glued_keywords_split_on_literal_matches() {
        assert_eq!(kinds("C1AND C2"), vec![unbound(1), Token::And, unbound(2)]);
        assert_eq!(kinds("C12OR"), vec![unbound(12), Token::Or]);
    }

    #[test]
    fn records_byte_spans() {
        let lex = tokenize("C1 OR C22");
        assert_eq!(lex[0].span, Span { start: 0, end: 2 });
        assert_eq!(lex[1].span, Span { start: 3, end: 5 });
        assert_eq!(lex[2].span, Span { start: 6, end: 9 });
    }

    #[test]
    fn zero_padded_labels_are_dropped() {
        assert_eq!(kinds("C01 OR C2"), vec![Token::Or, unbound(2)]);
        assert_eq!(kinds("C00"), vec![]);
        assert_eq!(kinds("C0 C10"), vec![unbound(0), unbound(10)]);
    }

    #[test]
    fn oversized_labels_are_dropped() {
        assert_eq!(kinds("C99999999999999999999999999 OR C1"), vec![Token::Or, unbound(1)]);
    }
}
