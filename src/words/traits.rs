// Word source trait: where the moderation engine gets its term list.
//
// The engine only ever reads. Whatever backs the list (the in-memory
// WordStore, a database, a remote service) must hand out a consistent
// snapshot: one call returns one coherent list even while writers are busy.

use anyhow::Result;
use async_trait::async_trait;

use super::Term;

#[async_trait]
pub trait WordSource: Send + Sync {
    /// Return every term (both lists) as one consistent snapshot.
    async fn list_terms(&self) -> Result<Vec<Term>>;
}

/// A fixed list, handy for tests and one-shot CLI runs.
#[async_trait]
impl WordSource for Vec<Term> {
    async fn list_terms(&self) -> Result<Vec<Term>> {
        Ok(self.clone())
    }
}
