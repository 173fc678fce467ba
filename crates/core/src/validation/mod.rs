//! Declarative validation rules.
//!
//! Provides condition combination, rule types, ordering, the source / writer
//! contracts and an in-memory store — all without database dependencies.

pub mod chain;
pub mod combinator;
pub mod evaluator;
pub mod key;
pub mod memory;
pub mod registry;
pub mod rule_set;
pub mod rules;
pub mod source;
