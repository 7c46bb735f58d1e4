use std::sync::Arc;

use super::domain::{Answer, DraftKey, DraftResponse, PhoneNumber};
use super::repository::{DraftResponseRepository, RepositoryError};

/// Find-or-create access to the single in-progress draft for a [`DraftKey`].
pub struct DraftResponseStore<D> {
    repository: Arc<D>,
}

impl<D> DraftResponseStore<D>
where
    D: DraftResponseRepository + 'static,
{
    pub fn new(repository: Arc<D>) -> Self {
        Self { repository }
    }

    /// Replace the draft's answers wholesale, creating the draft on first use.
    ///
    /// Nothing from a previous submission survives apart from the key: the
    /// completion flag is cleared and any comment is dropped.
    pub fn upsert(
        &self,
        key: DraftKey,
        phone_number: PhoneNumber,
        answers: Vec<Answer>,
    ) -> Result<DraftResponse, RepositoryError> {
        let draft = match self.repository.find_one(&key)? {
            Some(mut existing) => {
                existing.overwrite(phone_number, answers);
                existing
            }
            None => DraftResponse::new(key, phone_number, answers),
        };

        self.repository.save(draft)
    }
}
