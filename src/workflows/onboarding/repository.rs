use super::domain::{ApplicantId, Application, ApplicationId, ApplicationStatus, RoleKind};

/// Storage abstraction over the persistence collaborator so the service can
/// be exercised in isolation.
///
/// `update_if_status` is the conditional-update primitive backing admin
/// transitions and resubmissions: implementations must persist the record
/// only while the stored status still equals `expected`, atomically with the
/// check, and report `RepositoryError::Stale` otherwise.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError>;
    /// Most recent application of the given kind for the applicant.
    fn latest_for(
        &self,
        applicant: &ApplicantId,
        kind: RoleKind,
    ) -> Result<Option<Application>, RepositoryError>;
    fn update_if_status(
        &self,
        expected: ApplicationStatus,
        application: Application,
    ) -> Result<Application, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("stored status no longer matches the expected status")]
    Stale,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
