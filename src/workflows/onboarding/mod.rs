//! Partner onboarding: application intake, administrator status transitions,
//! and the side effects each terminal transition fans out to (role flags,
//! payment-account provisioning, outcome notifications).

pub mod directory;
pub mod domain;
pub mod notification;
pub mod payments;
pub(crate) mod phone;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use directory::{ApplicantDirectory, DirectoryError, IssuedCredential};
pub use domain::{
    Applicant, ApplicantId, Application, ApplicationId, ApplicationStatus, ApplicationStatusView,
    DocumentRef, IdentityDetails, LocalExpertProfile, PaymentAccountRef, Role, RoleKind,
    RoleProfile, ServiceProviderProfile, SocialLinks,
};
pub use notification::{Notice, NotificationError, Notifier};
pub use payments::{
    AccountRequest, PaymentProvisioner, ProvisioningError, SUPPORTED_ACCOUNT_COUNTRY,
};
pub use repository::{ApplicationRepository, RepositoryError};
pub use router::onboarding_router;
pub use service::{OnboardingConfig, OnboardingError, OnboardingService};
