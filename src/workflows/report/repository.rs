use super::domain::{DraftKey, DraftResponse, PhoneNumber, Reporter, Survey, SurveyId};

/// Read access to survey definitions.
pub trait SurveyRepository: Send + Sync {
    fn find_by_id(&self, id: &SurveyId) -> Result<Option<Survey>, RepositoryError>;
}

/// Reporter directory keyed by any of a reporter's phone numbers.
pub trait ReporterRepository: Send + Sync {
    fn find_by_phone(&self, phone_number: &PhoneNumber)
        -> Result<Option<Reporter>, RepositoryError>;
}

/// Storage for in-progress survey responses, at most one per [`DraftKey`].
pub trait DraftResponseRepository: Send + Sync {
    fn find_one(&self, key: &DraftKey) -> Result<Option<DraftResponse>, RepositoryError>;
    fn save(&self, draft: DraftResponse) -> Result<DraftResponse, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("record rejected: {0}")]
    Rejected(String),
}
