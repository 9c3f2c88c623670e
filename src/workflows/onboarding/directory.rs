use super::domain::{Applicant, ApplicantId};

/// Seam to the identity subsystem owning applicant records.
pub trait ApplicantDirectory: Send + Sync {
    fn fetch(&self, id: &ApplicantId) -> Result<Option<Applicant>, DirectoryError>;
    fn find_by_email(&self, email: &str) -> Result<Option<Applicant>, DirectoryError>;
    fn update(&self, applicant: Applicant) -> Result<(), DirectoryError>;
    /// Generate a fresh random credential for the applicant and persist its
    /// hash. The plaintext is returned exactly once for the outbound
    /// notification and never retained.
    fn issue_credential(&self, id: &ApplicantId) -> Result<IssuedCredential, DirectoryError>;
}

/// One-time credential produced on service-provider approval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCredential {
    pub plaintext: String,
}

/// Error enumeration for identity-store failures.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("applicant not found")]
    NotFound,
    #[error("credential issuance failed: {0}")]
    Credential(String),
    #[error("identity store unavailable: {0}")]
    Unavailable(String),
}
