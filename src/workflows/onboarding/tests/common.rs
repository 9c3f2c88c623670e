use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::workflows::onboarding::directory::{
    ApplicantDirectory, DirectoryError, IssuedCredential,
};
use crate::workflows::onboarding::domain::{
    Applicant, ApplicantId, Application, ApplicationId, ApplicationStatus, IdentityDetails,
    LocalExpertProfile, PaymentAccountRef, RoleKind, ServiceProviderProfile, SocialLinks,
};
use crate::workflows::onboarding::notification::{Notice, NotificationError, Notifier};
use crate::workflows::onboarding::payments::{
    AccountRequest, PaymentProvisioner, ProvisioningError,
};
use crate::workflows::onboarding::repository::{ApplicationRepository, RepositoryError};
use crate::workflows::onboarding::service::{OnboardingConfig, OnboardingService};

pub(super) fn onboarding_config() -> OnboardingConfig {
    OnboardingConfig {
        frontend_url: "https://app.wayfarer.test".to_string(),
        marketplace_url: "https://wayfarer.test".to_string(),
    }
}

pub(super) fn sample_applicant(id: &str) -> Applicant {
    Applicant {
        applicant_id: ApplicantId(id.to_string()),
        email: format!("{id}@example.com"),
        first_name: "Avery".to_string(),
        last_name: "Quinn".to_string(),
        phone_number: Some("+92 300 555 01 34".to_string()),
        country: Some("Pakistan".to_string()),
        city: Some("Lahore".to_string()),
        date_of_birth: None,
        about_me: None,
        image: None,
        is_local_expert: false,
        is_service_provider: false,
        payment_account: None,
        deleted: false,
    }
}

pub(super) fn expert_profile() -> LocalExpertProfile {
    LocalExpertProfile {
        identity: IdentityDetails {
            about_me: Some("Street food and old-town history walks".to_string()),
            ..IdentityDetails::default()
        },
        languages: vec!["English".to_string(), "Urdu".to_string()],
        years_in_city: 5,
        offered_services: vec!["City tours".to_string(), "Food walks".to_string()],
        service_availability: Some("Weekends".to_string()),
        price_expectation: Some("40 USD/hour".to_string()),
        government_id: None,
        travel_licence: None,
        social_links: SocialLinks::default(),
        age_confirmed: true,
        terms_accepted: true,
        partnership_accepted: true,
    }
}

pub(super) fn provider_profile() -> ServiceProviderProfile {
    ServiceProviderProfile {
        business_name: "Prairie Trails Outfitters".to_string(),
        contact_name: "Devon Reyes".to_string(),
        email: "bookings@prairietrails.example".to_string(),
        mobile: "(515) 555-0134".to_string(),
        whatsapp: None,
        website: Some("https://prairietrails.example".to_string()),
        country: "United States".to_string(),
        address: Some("400 Locust St, Des Moines".to_string()),
        booking_link: None,
        tax_id: None,
        business_type: Some("Tour operator".to_string()),
        social_links: SocialLinks::default(),
        business_logo: None,
        business_licence: None,
        photos: Vec::new(),
        service_offers: vec!["Guided kayak trips".to_string()],
        description: Some("Guided river and trail excursions".to_string()),
        instant_booking: true,
        terms_accepted: true,
    }
}

pub(super) type TestService =
    OnboardingService<MemoryRepository, MemoryDirectory, MemoryPayments, MemoryNotifier>;

pub(super) fn build_service() -> (
    TestService,
    Arc<MemoryRepository>,
    Arc<MemoryDirectory>,
    Arc<MemoryPayments>,
    Arc<MemoryNotifier>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let directory = Arc::new(MemoryDirectory::default());
    let payments = Arc::new(MemoryPayments::default());
    let notifier = Arc::new(MemoryNotifier::default());
    let service = OnboardingService::new(
        repository.clone(),
        directory.clone(),
        payments.clone(),
        notifier.clone(),
        onboarding_config(),
    );
    (service, repository, directory, payments, notifier)
}

pub(super) fn build_service_with_failing_payments() -> (
    OnboardingService<MemoryRepository, MemoryDirectory, FailingPayments, MemoryNotifier>,
    Arc<MemoryRepository>,
    Arc<MemoryDirectory>,
    Arc<MemoryNotifier>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let directory = Arc::new(MemoryDirectory::default());
    let notifier = Arc::new(MemoryNotifier::default());
    let service = OnboardingService::new(
        repository.clone(),
        directory.clone(),
        Arc::new(FailingPayments),
        notifier.clone(),
        onboarding_config(),
    );
    (service, repository, directory, notifier)
}

pub(super) fn build_service_with_failing_notifier() -> (
    OnboardingService<MemoryRepository, MemoryDirectory, MemoryPayments, FailingNotifier>,
    Arc<MemoryRepository>,
    Arc<MemoryDirectory>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let directory = Arc::new(MemoryDirectory::default());
    let service = OnboardingService::new(
        repository.clone(),
        directory.clone(),
        Arc::new(MemoryPayments::default()),
        Arc::new(FailingNotifier),
        onboarding_config(),
    );
    (service, repository, directory)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    records: Arc<Mutex<HashMap<ApplicationId, Application>>>,
}

impl ApplicationRepository for MemoryRepository {
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

#[derive(Default, Clone)]
pub(super) struct MemoryDirectory {
    applicants: Arc<Mutex<HashMap<ApplicantId, Applicant>>>,
    issued: Arc<Mutex<Vec<ApplicantId>>>,
}

impl MemoryDirectory {
    pub(super) fn seed(&self, applicant: Applicant) {
        self.applicants
            .lock()
            .expect("directory mutex poisoned")
            .insert(applicant.applicant_id.clone(), applicant);
    }

    pub(super) fn applicant(&self, id: &ApplicantId) -> Option<Applicant> {
        self.applicants
            .lock()
            .expect("directory mutex poisoned")
            .get(id)
            .cloned()
    }

    pub(super) fn issued(&self) -> Vec<ApplicantId> {
        self.issued.lock().expect("directory mutex poisoned").clone()
    }
}

impl ApplicantDirectory for MemoryDirectory {
    fn fetch(&self, id: &ApplicantId) -> Result<Option<Applicant>, DirectoryError> {
        Ok(self.applicant(id))
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
        let mut issued = self.issued.lock().expect("directory mutex poisoned");
        issued.push(id.clone());
        Ok(IssuedCredential {
            plaintext: format!("OneTime{:04}", issued.len()),
        })
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryPayments {
    requests: Arc<Mutex<Vec<AccountRequest>>>,
}

impl MemoryPayments {
    pub(super) fn requests(&self) -> Vec<AccountRequest> {
        self.requests.lock().expect("payments mutex poisoned").clone()
    }
}

impl PaymentProvisioner for MemoryPayments {
    fn create_account(
        &self,
        request: AccountRequest,
    ) -> Result<PaymentAccountRef, ProvisioningError> {
        let mut guard = self.requests.lock().expect("payments mutex poisoned");
        guard.push(request);
        Ok(PaymentAccountRef(format!("acct_test{:04}", guard.len())))
    }
}

pub(super) struct FailingPayments;

impl PaymentProvisioner for FailingPayments {
    fn create_account(
        &self,
        _request: AccountRequest,
    ) -> Result<PaymentAccountRef, ProvisioningError> {
        Err(ProvisioningError::InvalidPhone)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl MemoryNotifier {
    pub(super) fn events(&self) -> Vec<Notice> {
        self.notices.lock().expect("notifier mutex poisoned").clone()
    }
}

impl Notifier for MemoryNotifier {
    fn send(&self, notice: Notice) -> Result<(), NotificationError> {
        self.notices
            .lock()
            .expect("notifier mutex poisoned")
            .push(notice);
        Ok(())
    }
}

pub(super) struct FailingNotifier;

impl Notifier for FailingNotifier {
    fn send(&self, _notice: Notice) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("smtp relay offline".to_string()))
    }
}
