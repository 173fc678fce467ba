//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept a pool or connection as the first argument.

pub mod validation_rule_repo;

pub use validation_rule_repo::ValidationRuleRepo;
