//! Relation expression engine.
//!
//! A relation is a boolean combination of the queried coins, e.g.
//! `(C1 OR C2) AND NOT C3`. It is edited either as text or as a row of visual
//! tokens, and both views must always agree. They agree because neither one is
//! stored: the token list is, and both are projected from it.
//!
//! ## How the parts work together
//!
//! ```text
//! text ── tokenize (tokenizer.rs) ──┐
//!                                   │  Unbound(n) labels
//! visual nodes ── from_parts ───────┤
//!   (project.rs)                    v
//!                       RelationExpression (expression.rs)
//!                         - bind labels to CoinIds
//!                         - append on coin add, clear on coin clear
//!                         - list / prune stale references
//!                                   │
//!                  ┌────────────────┴────────────────┐
//!                  v                                 v
//!          serialize (project.rs)            render (project.rs)
//!          canonical text                    Vec<VisualToken>
//! ```
//!
//! Coin labels are positional (`C1` is the first coin in the set) but tokens
//! hold permanent [`CoinId`](crate::CoinId)s, so removing a coin never makes an
//! existing reference point at a different coin.
//!
//! ## Responsibilities by module
//!
//! - `token.rs`: the token alphabet and per-operator text, glyph and class.
//! - `tokenizer.rs`: text to tokens; unrecognised text is dropped.
//! - `project.rs`: tokens to canonical text and to visual nodes.
//! - `expression.rs`: the mutable expression, binding and stale repair.
//! - `diagnose.rs`: advisory well-formedness checks. Nothing here rejects an
//!   expression; ill-formed relations are sent to the backend as typed.

#[path = "relation/diagnose.rs"]
mod diagnose;
#[path = "relation/expression.rs"]
mod expression;
#[path = "relation/project.rs"]
mod project;
#[path = "relation/token.rs"]
mod token;
#[path = "relation/tokenizer.rs"]
mod tokenizer;

pub use diagnose::{RelationIssue, diagnose};
pub use expression::RelationExpression;
pub use project::{STALE_LABEL, VisualToken, render, serialize, visual_to_text};
pub use token::{CoinRef, Token};
pub use tokenizer::{Lexeme, tokenize};
