//! Advisory well-formedness checks.
//!
//! Ill-formed expressions are legal state: the user builds them one token at a
//! time and they are compiled as-is. These checks only describe what is wrong
//! so a caller (or the CLI report) can show it.

use super::token::{CoinRef, Token};
use crate::coin::CoinId;
use crate::query_set::CoinQuerySet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationIssue {
    /// `)` at this token index has no matching `(`.
    UnmatchedClose(usize),
    /// This many `(` are never closed.
    UnclosedOpen(usize),
    /// Binary operator at this index lacks a left or right operand.
    MissingOperand(usize),
    /// `NOT` at this index is not followed by an operand.
    DanglingNot(usize),
    /// Label that does not name any coin.
    UnresolvedLabel(usize),
    /// Reference to a coin that has been removed.
    StaleReference(CoinId),
}

impl fmt::Display for RelationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationIssue::UnmatchedClose(i) => write!(f, "unmatched ')' at token {i}"),
            RelationIssue::UnclosedOpen(n) => write!(f, "{n} unclosed '('"),
            RelationIssue::MissingOperand(i) => write!(f, "operator at token {i} is missing an operand"),
            RelationIssue::DanglingNot(i) => write!(f, "NOT at token {i} has nothing to negate"),
            RelationIssue::UnresolvedLabel(n) => write!(f, "C{n} does not name a queried coin"),
            RelationIssue::StaleReference(id) => write!(f, "reference to removed coin {id}"),
        }
    }
}

fn starts_operand(t: Option<&Token>) -> bool {
    matches!(t, Some(Token::CoinRef(_) | Token::OpenParen | Token::Not))
}

fn ends_operand(t: Option<&Token>) -> bool {
    matches!(t, Some(Token::CoinRef(_) | Token::CloseParen))
}

pub fn diagnose(tokens: &[Token], coins: &CoinQuerySet) -> Vec<RelationIssue> {
    let mut issues = Vec::new();
    let mut depth = 0usize;

    for (i, token) in tokens.iter().enumerate() {
        let prev = i.checked_sub(1).and_then(|p| tokens.get(p));
        let next = tokens.get(i + 1);
        match *token {
            Token::OpenParen => depth += 1,
            Token::CloseParen => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => issues.push(RelationIssue::UnmatchedClose(i)),
            },
            Token::And | Token::Or => {
                if !ends_operand(prev) || !starts_operand(next) {
                    issues.push(RelationIssue::MissingOperand(i));
                }
            }
            Token::Not => {
                if !starts_operand(next) {
                    issues.push(RelationIssue::DanglingNot(i));
                }
            }
            Token::CoinRef(CoinRef::Unbound(n)) => issues.push(RelationIssue::UnresolvedLabel(n)),
            Token::CoinRef(CoinRef::Bound(id)) => {
                if !coins.contains(id) {
                    issues.push(RelationIssue::StaleReference(id));
                }
            }
        }
    }

    if depth > 0 {
        issues.push(RelationIssue::UnclosedOpen(depth));
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::CoinDraftBuilder;
    use crate::relation::RelationExpression;

    fn coins(n: usize) -> CoinQuerySet {
        let mut b = CoinDraftBuilder::new();
        let mut set = CoinQuerySet::new();
        for _ in 0..n {
            set.add(b.finalize());
        }
        set
    }

    #[test]
    fn well_formed_expression_has_no_issues() {
        let set = coins(3);
        let expr = RelationExpression::parse("(C1 OR C2) AND NOT C3", &set);
        assert!(diagnose(expr.tokens(), &set).is_empty());
    }

    #[test]
    fn reports_structural_problems() {
        let set = coins(2);
        let expr = RelationExpression::parse("C1 AND ) OR (C2 NOT", &set);
        let issues = diagnose(expr.tokens(), &set);
        assert!(issues.contains(&RelationIssue::MissingOperand(1)));
        assert!(issues.contains(&RelationIssue::UnmatchedClose(2)));
        assert!(issues.contains(&RelationIssue::DanglingNot(6)));
        assert!(issues.contains(&RelationIssue::UnclosedOpen(1)));
    }

    #[test]
    fn reports_unresolved_labels() {
        let set = coins(1);
        let expr = RelationExpression::parse("C1 OR C9", &set);
        assert_eq!(diagnose(expr.tokens(), &set), vec![RelationIssue::UnresolvedLabel(9)]);
    }
}
