use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::directory::{ApplicantDirectory, DirectoryError};
use super::domain::{
    Applicant, ApplicantId, Application, ApplicationId, ApplicationStatus, IdentityDetails, Role,
    RoleKind, RoleProfile,
};
use super::notification::{
    approval_notice, deletion_notice, rejection_notice, NotificationError, Notifier,
};
use super::payments::{AccountRequest, PaymentProvisioner, ProvisioningError};
use super::repository::{ApplicationRepository, RepositoryError};

/// Settings injected into the workflow in place of process-global state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingConfig {
    /// Login page referenced in outcome notifications.
    pub frontend_url: String,
    /// Public marketplace URL attached to provisioned payment accounts.
    pub marketplace_url: String,
}

/// Service composing the repository, identity directory, payment
/// provisioner, and notifier behind the onboarding operations.
pub struct OnboardingService<R, D, P, N> {
    repository: Arc<R>,
    directory: Arc<D>,
    payments: Arc<P>,
    notifier: Arc<N>,
    config: OnboardingConfig,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("form-{id:06}"))
}

impl<R, D, P, N> OnboardingService<R, D, P, N>
where
    R: ApplicationRepository + 'static,
    D: ApplicantDirectory + 'static,
    P: PaymentProvisioner + 'static,
    N: Notifier + 'static,
{
    pub fn new(
        repository: Arc<R>,
        directory: Arc<D>,
        payments: Arc<P>,
        notifier: Arc<N>,
        config: OnboardingConfig,
    ) -> Self {
        Self {
            repository,
            directory,
            payments,
            notifier,
            config,
        }
    }

    /// Submit a role application for the applicant.
    ///
    /// A local expert may apply once, ever. A service provider may resubmit
    /// only while the previous application is `rejected`, in which case the
    /// same row is reset to `pending` with the new profile.
    pub fn submit(
        &self,
        applicant_id: &ApplicantId,
        profile: RoleProfile,
    ) -> Result<Application, OnboardingError> {
        let kind = profile.kind();
        let applicant = self
            .directory
            .fetch(applicant_id)?
            .ok_or(OnboardingError::NotFound)?;

        match self.repository.latest_for(applicant_id, kind)? {
            Some(existing)
                if kind == RoleKind::ServiceProvider
                    && existing.status == ApplicationStatus::Rejected =>
            {
                return self.resubmit(existing, profile);
            }
            Some(existing) => {
                return Err(OnboardingError::DuplicateApplication {
                    kind,
                    status: existing.status,
                });
            }
            None => {}
        }

        if let RoleProfile::LocalExpert(details) = &profile {
            self.write_back_identity(applicant, &details.identity)?;
        }

        let application = Application {
            application_id: next_application_id(),
            applicant_id: applicant_id.clone(),
            profile,
            status: ApplicationStatus::Pending,
            rejection_message: None,
            created_at: Utc::now(),
        };

        let stored = self.repository.insert(application)?;
        info!(
            application = %stored.application_id.0,
            role = kind.label(),
            "onboarding application submitted"
        );
        Ok(stored)
    }

    /// Administrator transition of a pending application into a terminal
    /// status. `deleted` is additionally accepted from any non-deleted
    /// status so an already approved partner can be removed.
    pub fn transition(
        &self,
        application_id: &ApplicationId,
        target: ApplicationStatus,
        rejection_message: Option<String>,
    ) -> Result<Application, OnboardingError> {
        if target == ApplicationStatus::Pending {
            return Err(OnboardingError::InvalidStatus);
        }

        let application = self
            .repository
            .fetch(application_id)?
            .ok_or(OnboardingError::NotFound)?;
        let observed = application.status;

        let allowed = match target {
            ApplicationStatus::Deleted => observed != ApplicationStatus::Deleted,
            _ => observed == ApplicationStatus::Pending,
        };
        if !allowed {
            return Err(OnboardingError::StaleTransition);
        }

        let mut applicant = self
            .directory
            .fetch(&application.applicant_id)?
            .ok_or(OnboardingError::NotFound)?;
        let kind = application.role_kind();

        // Provision before committing so a provider failure leaves the
        // application pending and the role flag untouched.
        let provisioned = match (&target, &application.profile) {
            (ApplicationStatus::Approved, RoleProfile::ServiceProvider(profile)) => Some(
                self.payments.create_account(AccountRequest::for_provider(
                    &applicant,
                    profile,
                    &self.config.marketplace_url,
                ))?,
            ),
            _ => None,
        };

        let mut updated = application.clone();
        updated.status = target;
        updated.rejection_message = match target {
            ApplicationStatus::Approved => None,
            _ => Some(rejection_message.clone().unwrap_or_default()),
        };
        let committed = self.repository.update_if_status(observed, updated)?;

        match target {
            ApplicationStatus::Approved => match &committed.profile {
                RoleProfile::LocalExpert(_) => applicant.is_local_expert = true,
                RoleProfile::ServiceProvider(profile) => {
                    applicant.is_service_provider = true;
                    if !profile.mobile.trim().is_empty() {
                        applicant.phone_number = Some(profile.mobile.clone());
                    }
                    if !profile.country.trim().is_empty() {
                        applicant.country = Some(profile.country.clone());
                    }
                    if let Some(description) = &profile.description {
                        applicant.about_me = Some(description.clone());
                    }
                    applicant.payment_account = provisioned;
                }
            },
            ApplicationStatus::Rejected => {}
            ApplicationStatus::Deleted => {
                applicant.deleted = true;
                match kind {
                    RoleKind::LocalExpert => applicant.is_local_expert = false,
                    RoleKind::ServiceProvider => applicant.is_service_provider = false,
                }
            }
            ApplicationStatus::Pending => return Err(OnboardingError::InvalidStatus),
        }
        self.directory.update(applicant.clone())?;

        let credential = if target == ApplicationStatus::Approved
            && kind == RoleKind::ServiceProvider
        {
            Some(self.directory.issue_credential(&applicant.applicant_id)?)
        } else {
            None
        };

        let reason = rejection_message.unwrap_or_default();
        let notice = match target {
            ApplicationStatus::Approved => approval_notice(
                &applicant,
                kind,
                credential.as_ref(),
                &self.config.frontend_url,
            ),
            ApplicationStatus::Rejected => rejection_notice(&applicant, kind, &reason),
            _ => deletion_notice(&applicant, kind, &reason),
        };
        if let Err(source) = self.notifier.send(notice) {
            warn!(
                application = %committed.application_id.0,
                status = target.label(),
                "status committed but outcome notification failed"
            );
            return Err(OnboardingError::NotificationFailed(source));
        }

        info!(
            application = %committed.application_id.0,
            status = target.label(),
            "onboarding application transitioned"
        );
        Ok(committed)
    }

    /// Most recent application of the given kind for the applicant.
    pub fn current_application(
        &self,
        applicant_id: &ApplicantId,
        kind: RoleKind,
    ) -> Result<Application, OnboardingError> {
        self.repository
            .latest_for(applicant_id, kind)?
            .ok_or(OnboardingError::NotFound)
    }

    /// Effective partner standing, computed from application state instead of
    /// the stored role flags. When both roles are approved the most recent
    /// approval wins.
    pub fn role(&self, applicant_id: &ApplicantId) -> Result<Role, OnboardingError> {
        let expert = self
            .repository
            .latest_for(applicant_id, RoleKind::LocalExpert)?
            .filter(|application| application.status == ApplicationStatus::Approved);
        let provider = self
            .repository
            .latest_for(applicant_id, RoleKind::ServiceProvider)?
            .filter(|application| application.status == ApplicationStatus::Approved);

        Ok(match (expert, provider) {
            (None, None) => Role::User,
            (Some(expert), None) => Role::LocalExpert(expert),
            (None, Some(provider)) => Role::ServiceProvider(provider),
            (Some(expert), Some(provider)) => {
                if provider.created_at >= expert.created_at {
                    Role::ServiceProvider(provider)
                } else {
                    Role::LocalExpert(expert)
                }
            }
        })
    }

    fn resubmit(
        &self,
        existing: Application,
        profile: RoleProfile,
    ) -> Result<Application, OnboardingError> {
        let mut updated = existing;
        updated.profile = profile;
        updated.status = ApplicationStatus::Pending;
        updated.rejection_message = None;

        let stored = self
            .repository
            .update_if_status(ApplicationStatus::Rejected, updated)?;
        info!(
            application = %stored.application_id.0,
            "rejected application resubmitted"
        );
        Ok(stored)
    }

    /// Apply non-empty identity mirror fields onto the applicant record,
    /// guarding against email collisions with other applicants.
    fn write_back_identity(
        &self,
        mut applicant: Applicant,
        details: &IdentityDetails,
    ) -> Result<(), OnboardingError> {
        if let Some(email) = non_empty(details.email.as_deref()) {
            if email != applicant.email {
                if let Some(other) = self.directory.find_by_email(email)? {
                    if other.applicant_id != applicant.applicant_id {
                        return Err(OnboardingError::EmailConflict {
                            email: email.to_string(),
                        });
                    }
                }
                applicant.email = email.to_string();
            }
        }
        if let Some(first_name) = non_empty(details.first_name.as_deref()) {
            applicant.first_name = first_name.to_string();
        }
        if let Some(last_name) = non_empty(details.last_name.as_deref()) {
            applicant.last_name = last_name.to_string();
        }
        if let Some(phone_number) = non_empty(details.phone_number.as_deref()) {
            applicant.phone_number = Some(phone_number.to_string());
        }
        if let Some(country) = non_empty(details.country.as_deref()) {
            applicant.country = Some(country.to_string());
        }
        if let Some(city) = non_empty(details.city.as_deref()) {
            applicant.city = Some(city.to_string());
        }
        if let Some(date_of_birth) = details.date_of_birth {
            applicant.date_of_birth = Some(date_of_birth);
        }
        if let Some(about_me) = non_empty(details.about_me.as_deref()) {
            applicant.about_me = Some(about_me.to_string());
        }
        if let Some(image) = &details.image {
            applicant.image = Some(image.clone());
        }

        self.directory.update(applicant)?;
        Ok(())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}

/// Error raised by the onboarding service.
#[derive(Debug, thiserror::Error)]
pub enum OnboardingError {
    #[error("a {} application already exists with status '{}'", .kind.label(), .status.label())]
    DuplicateApplication {
        kind: RoleKind,
        status: ApplicationStatus,
    },
    #[error("email {email} already belongs to another account")]
    EmailConflict { email: String },
    #[error("status must be 'approved', 'rejected', or 'deleted'")]
    InvalidStatus,
    #[error("payment account provisioning failed: {0}")]
    ExternalProvisioningFailed(#[from] ProvisioningError),
    #[error("status was committed but the applicant notification failed: {0}")]
    NotificationFailed(#[from] NotificationError),
    #[error("application was changed by another administrator")]
    StaleTransition,
    #[error("application not found")]
    NotFound,
    #[error(transparent)]
    Repository(RepositoryError),
    #[error(transparent)]
    Directory(DirectoryError),
}

impl From<RepositoryError> for OnboardingError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound => OnboardingError::NotFound,
            RepositoryError::Stale => OnboardingError::StaleTransition,
            other => OnboardingError::Repository(other),
        }
    }
}

impl From<DirectoryError> for OnboardingError {
    fn from(value: DirectoryError) -> Self {
        match value {
            DirectoryError::NotFound => OnboardingError::NotFound,
            other => OnboardingError::Directory(other),
        }
    }
}
