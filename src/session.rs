use crate::catalog::Change;
use crate::error::ValidationError;
use crate::model::DataFile;
use crate::store::{load_with_retry, DocumentStore, Revision, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SessionError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, SessionError::Store(e) if e.is_conflict())
    }
}

/// A mutated copy of a document waiting to be saved.
#[derive(Debug, Clone)]
pub struct Staged {
    pub document: DataFile,
    pub change: Change,
}

/// Apply `mutator` to a copy of `document`.
///
/// Returns None when the mutation left the document unchanged (moving an
/// entry onto itself, nudging past an edge), so there is nothing to save.
/// The original is never touched.
pub fn stage<F>(document: &DataFile, mutator: F) -> Result<Option<Staged>, ValidationError>
where
    F: FnOnce(&mut DataFile) -> Result<Change, ValidationError>,
{
    let mut scratch = document.clone();
    let change = mutator(&mut scratch)?;
    if scratch == *document {
        return Ok(None);
    }
    Ok(Some(Staged {
        document: scratch,
        change,
    }))
}

/// The loaded document, its revision and the store it came from.
///
/// The in-memory document only changes after the store has accepted a
/// write, so a failed save leaves the session exactly as it was.
pub struct Session<S> {
    store: S,
    document: DataFile,
    revision: Revision,
}

impl<S: DocumentStore> Session<S> {
    pub async fn open(store: S) -> Result<Self, SessionError> {
        let loaded = load_with_retry(&store).await?;
        log::debug!(
            "loaded {} at revision {}",
            store.describe(),
            loaded.revision
        );
        Ok(Self {
            store,
            document: loaded.document,
            revision: loaded.revision,
        })
    }

    pub fn document(&self) -> &DataFile {
        &self.document
    }

    pub fn revision(&self) -> &Revision {
        &self.revision
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Replace local state with whatever the store holds now.
    pub async fn reload(&mut self) -> Result<(), SessionError> {
        let loaded = load_with_retry(&self.store).await?;
        self.document = loaded.document;
        self.revision = loaded.revision;
        Ok(())
    }

    /// Validate and apply a mutation, then save it with its commit message.
    ///
    /// Returns None when the mutation was a no-op and nothing was written.
    pub async fn commit<F>(&mut self, mutator: F) -> Result<Option<Change>, SessionError>
    where
        F: FnOnce(&mut DataFile) -> Result<Change, ValidationError>,
    {
        let Some(staged) = stage(&self.document, mutator)? else {
            return Ok(None);
        };

        let revision = self
            .store
            .save(&staged.document, &self.revision, &staged.change.message)
            .await?;
        log::debug!("{} -> {}", staged.change.message, revision);

        self.document = staged.document;
        self.revision = revision;
        Ok(Some(staged.change))
    }

    /// Adopt a save that was performed elsewhere (the TUI saves in a
    /// background task).
    pub fn accept(&mut self, document: DataFile, revision: Revision) {
        self.document = document;
        self.revision = revision;
    }
}
