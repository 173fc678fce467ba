//! Concatenation of several rule sources.

use std::sync::Arc;

use async_trait::async_trait;

use super::source::{ResolvedRule, ValidationSource};
use crate::error::CoreError;

/// Queries each source in turn and concatenates the results.
///
/// Typical use puts a [`RuleRegistry`](super::registry::RuleRegistry) first
/// and a persisted store second, so stored rules run after declared ones.
/// The first failing source aborts the lookup.
#[derive(Default)]
pub struct ChainedSource {
    sources: Vec<Arc<dyn ValidationSource>>,
}

impl ChainedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, source: Arc<dyn ValidationSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[async_trait]
impl ValidationSource for ChainedSource {
    async fn get_validation_rules(
        &self,
        type_name: &str,
    ) -> Result<Vec<ResolvedRule>, CoreError> {
        let mut all = Vec::new();
        for source in &self.sources {
            all.extend(source.get_validation_rules(type_name).await?);
        }
        Ok(all)
    }
}
