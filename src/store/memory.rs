use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{DocumentStore, Loaded, Revision, StoreError};
use crate::model::{normalize_document, DataFile};

/// In-process store with the same revision rules as the remote ones.
/// Clones share state, so a clone can play a second writer in tests.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    document: DataFile,
    generation: u64,
    /// Commit messages of accepted saves, oldest first
    history: Vec<String>,
}

fn revision_for(generation: u64) -> Revision {
    Revision::new(format!("mem-{}", generation))
}

impl MemoryStore {
    pub fn new(document: DataFile) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryState {
                document,
                generation: 1,
                history: Vec::new(),
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn document(&self) -> DataFile {
        self.state().document.clone()
    }

    pub fn revision(&self) -> Revision {
        revision_for(self.state().generation)
    }

    pub fn history(&self) -> Vec<String> {
        self.state().history.clone()
    }
}

impl DocumentStore for MemoryStore {
    async fn load(&self) -> Result<Loaded, StoreError> {
        let state = self.state();
        let mut document = state.document.clone();
        normalize_document(&mut document);
        Ok(Loaded {
            document,
            revision: revision_for(state.generation),
        })
    }

    async fn save(
        &self,
        document: &DataFile,
        previous: &Revision,
        message: &str,
    ) -> Result<Revision, StoreError> {
        let mut state = self.state();
        if *previous != revision_for(state.generation) {
            return Err(StoreError::Conflict {
                expected: previous.as_str().to_string(),
            });
        }
        state.document = document.clone();
        state.generation += 1;
        state.history.push(message.to_string());
        Ok(revision_for(state.generation))
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
