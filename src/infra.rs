use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};
use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::Rng;
use tracing::info;

use wayfarer::workflows::onboarding::{
    Applicant, ApplicantDirectory, ApplicantId, Application, ApplicationId, ApplicationRepository,
    ApplicationStatus, DirectoryError, IssuedCredential, Notice, NotificationError, Notifier,
    PaymentAccountRef, PaymentProvisioner, ProvisioningError, RepositoryError, RoleKind,
    AccountRequest, SUPPORTED_ACCOUNT_COUNTRY,
};

const CREDENTIAL_LENGTH: usize = 12;

/// In-memory application store with the conditional status update the
/// workflow relies on.
#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationRepository {
    records: Arc<Mutex<HashMap<ApplicationId, Application>>>,
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&application.application_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(application.application_id.clone(), application.clone());
        Ok(application)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn latest_for(
        &self,
        applicant: &ApplicantId,
        kind: RoleKind,
    ) -> Result<Option<Application>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|application| {
                application.applicant_id == *applicant && application.role_kind() == kind
            })
            .max_by_key(|application| application.created_at)
            .cloned())
    }

    fn update_if_status(
        &self,
        expected: ApplicationStatus,
        application: Application,
    ) -> Result<Application, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let stored = guard
            .get_mut(&application.application_id)
            .ok_or(RepositoryError::NotFound)?;
        if stored.status != expected {
            return Err(RepositoryError::Stale);
        }
        *stored = application.clone();
        Ok(application)
    }
}

/// In-memory identity store. Issued credentials are persisted as argon2
/// hashes; the plaintext only travels in the returned value.
#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicantDirectory {
    applicants: Arc<Mutex<HashMap<ApplicantId, Applicant>>>,
    credential_hashes: Arc<Mutex<HashMap<ApplicantId, String>>>,
}

impl InMemoryApplicantDirectory {
    pub(crate) fn seed(&self, applicant: Applicant) {
        self.applicants
            .lock()
            .expect("directory mutex poisoned")
            .insert(applicant.applicant_id.clone(), applicant);
    }
}

impl ApplicantDirectory for InMemoryApplicantDirectory {
    fn fetch(&self, id: &ApplicantId) -> Result<Option<Applicant>, DirectoryError> {
        let guard = self.applicants.lock().expect("directory mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<Applicant>, DirectoryError> {
        let guard = self.applicants.lock().expect("directory mutex poisoned");
        Ok(guard
            .values()
            .find(|applicant| applicant.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    fn update(&self, applicant: Applicant) -> Result<(), DirectoryError> {
        let mut guard = self.applicants.lock().expect("directory mutex poisoned");
        if !guard.contains_key(&applicant.applicant_id) {
            return Err(DirectoryError::NotFound);
        }
        guard.insert(applicant.applicant_id.clone(), applicant);
        Ok(())
    }

    fn issue_credential(&self, id: &ApplicantId) -> Result<IssuedCredential, DirectoryError> {
        if self.fetch(id)?.is_none() {
            return Err(DirectoryError::NotFound);
        }

        let plaintext: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(CREDENTIAL_LENGTH)
            .map(char::from)
            .collect();

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|source| DirectoryError::Credential(source.to_string()))?
            .to_string();

        self.credential_hashes
            .lock()
            .expect("directory mutex poisoned")
            .insert(id.clone(), hash);

        Ok(IssuedCredential { plaintext })
    }
}

/// Offline stand-in for the payment processor, used when no real account
/// provisioning backend is configured.
#[derive(Default, Clone)]
pub(crate) struct SandboxPaymentProvisioner {
    sequence: Arc<AtomicU64>,
}

impl PaymentProvisioner for SandboxPaymentProvisioner {
    fn create_account(
        &self,
        request: AccountRequest,
    ) -> Result<PaymentAccountRef, ProvisioningError> {
        if !request.email.contains('@') {
            return Err(ProvisioningError::InvalidEmail);
        }
        if request.country != SUPPORTED_ACCOUNT_COUNTRY {
            return Err(ProvisioningError::InvalidCountry);
        }

        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        Ok(PaymentAccountRef(format!("acct_sandbox{id:08}")))
    }
}

/// Notifier that writes outbound notices to the log instead of an SMTP
/// relay.
#[derive(Default, Clone)]
pub(crate) struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, notice: Notice) -> Result<(), NotificationError> {
        info!(to = %notice.to, subject = %notice.subject, "outbound notification");
        Ok(())
    }
}

/// Notifier for the CLI demo: prints the full notice to stdout.
#[derive(Default, Clone)]
pub(crate) struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn send(&self, notice: Notice) -> Result<(), NotificationError> {
        println!("--- notification to {} ---", notice.to);
        println!("Subject: {}", notice.subject);
        println!("{}", notice.body);
        Ok(())
    }
}
