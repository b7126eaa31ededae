use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use super::traits::{ChangeDescription, Fixer};

/// Runs fixers one after the other and concatenates what they report.
///
/// Each fixer sees the working copy, commits included, as the previous one left
/// it. The first error aborts the remaining fixers.
pub struct CompositeFixer {
    fixers: Vec<(String, Box<dyn Fixer>)>,
}

impl CompositeFixer {
    pub fn new(fixers: Vec<(String, Box<dyn Fixer>)>) -> Self {
        Self { fixers }
    }

    pub fn len(&self) -> usize {
        self.fixers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixers.is_empty()
    }
}

#[async_trait]
impl Fixer for CompositeFixer {
    async fn run(&self) -> Result<Vec<ChangeDescription>> {
        let mut changes = Vec::new();
        for (key, fixer) in &self.fixers {
            debug!(fixer = %key, "running fixer");
            let produced = fixer.run().await?;
            if !produced.is_empty() {
                debug!(fixer = %key, count = produced.len(), "fixer reported changes");
            }
            changes.extend(produced);
        }
        Ok(changes)
    }
}
