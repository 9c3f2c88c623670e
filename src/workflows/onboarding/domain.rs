use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for applicant identity records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicantId(pub String);

/// Identifier wrapper for onboarding applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// External payment-account reference returned by the payment collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentAccountRef(pub String);

/// Partner roles a traveller can onboard into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKind {
    LocalExpert,
    ServiceProvider,
}

impl RoleKind {
    pub const fn label(self) -> &'static str {
        match self {
            RoleKind::LocalExpert => "local_expert",
            RoleKind::ServiceProvider => "service_provider",
        }
    }

    /// Human-facing name used in outbound notifications.
    pub const fn display_name(self) -> &'static str {
        match self {
            RoleKind::LocalExpert => "Local Expert",
            RoleKind::ServiceProvider => "Service Provider",
        }
    }

    /// Parse the role segment used in request paths.
    pub fn from_path_segment(segment: &str) -> Option<Self> {
        match segment {
            "local-expert" => Some(RoleKind::LocalExpert),
            "service-provider" => Some(RoleKind::ServiceProvider),
            _ => None,
        }
    }
}

/// Lifecycle status of an onboarding application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
    Deleted,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Deleted => "deleted",
        }
    }

    /// Terminal statuses never transition again without a new submission.
    pub const fn is_terminal(self) -> bool {
        !matches!(self, ApplicationStatus::Pending)
    }

    pub fn from_label(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(ApplicationStatus::Pending),
            "approved" => Some(ApplicationStatus::Approved),
            "rejected" => Some(ApplicationStatus::Rejected),
            "deleted" => Some(ApplicationStatus::Deleted),
            _ => None,
        }
    }
}

/// Identity record the workflow reads and mutates; its lifecycle is owned by
/// the identity subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Applicant {
    pub applicant_id: ApplicantId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub about_me: Option<String>,
    pub image: Option<DocumentRef>,
    pub is_local_expert: bool,
    pub is_service_provider: bool,
    pub payment_account: Option<PaymentAccountRef>,
    pub deleted: bool,
}

/// Pointer to an uploaded document held by the media-storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub name: String,
    pub storage_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    pub instagram: Option<String>,
    pub facebook: Option<String>,
    pub linkedin: Option<String>,
}

/// Identity mirror fields a local-expert submission may write back onto the
/// applicant record. Empty values are skipped during write-back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityDetails {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub about_me: Option<String>,
    pub image: Option<DocumentRef>,
}

/// Profile fields collected from a local-expert applicant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalExpertProfile {
    #[serde(default)]
    pub identity: IdentityDetails,
    pub languages: Vec<String>,
    pub years_in_city: u8,
    #[serde(default)]
    pub offered_services: Vec<String>,
    #[serde(default)]
    pub service_availability: Option<String>,
    #[serde(default)]
    pub price_expectation: Option<String>,
    #[serde(default)]
    pub government_id: Option<DocumentRef>,
    #[serde(default)]
    pub travel_licence: Option<DocumentRef>,
    #[serde(default)]
    pub social_links: SocialLinks,
    pub age_confirmed: bool,
    pub terms_accepted: bool,
    #[serde(default)]
    pub partnership_accepted: bool,
}

/// Profile fields collected from a service-provider business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceProviderProfile {
    pub business_name: String,
    pub contact_name: String,
    pub email: String,
    pub mobile: String,
    #[serde(default)]
    pub whatsapp: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    pub country: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub booking_link: Option<String>,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub business_type: Option<String>,
    #[serde(default)]
    pub social_links: SocialLinks,
    #[serde(default)]
    pub business_logo: Option<DocumentRef>,
    #[serde(default)]
    pub business_licence: Option<DocumentRef>,
    #[serde(default)]
    pub photos: Vec<DocumentRef>,
    #[serde(default)]
    pub service_offers: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub instant_booking: bool,
    pub terms_accepted: bool,
}

/// Role-specific submission payload attached to an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoleProfile {
    LocalExpert(LocalExpertProfile),
    ServiceProvider(ServiceProviderProfile),
}

impl RoleProfile {
    pub fn kind(&self) -> RoleKind {
        match self {
            RoleProfile::LocalExpert(_) => RoleKind::LocalExpert,
            RoleProfile::ServiceProvider(_) => RoleKind::ServiceProvider,
        }
    }
}

/// One role-onboarding request tied to a single applicant and role-kind.
///
/// Rows are never removed; `Deleted` is a terminal status, not a deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub application_id: ApplicationId,
    pub applicant_id: ApplicantId,
    pub profile: RoleProfile,
    pub status: ApplicationStatus,
    pub rejection_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Application {
    pub fn role_kind(&self) -> RoleKind {
        self.profile.kind()
    }

    pub fn status_view(&self) -> ApplicationStatusView {
        ApplicationStatusView {
            application_id: self.application_id.clone(),
            applicant_id: self.applicant_id.clone(),
            role: self.role_kind().label(),
            status: self.status.label(),
            rejection_message: self.rejection_message.clone(),
            created_at: self.created_at,
        }
    }
}

/// Sanitized representation of an application's exposed status.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub applicant_id: ApplicantId,
    pub role: &'static str,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Effective partner standing computed from current application state rather
/// than the stored role flags, so read paths cannot observe the two diverging.
#[derive(Debug, Clone, PartialEq)]
pub enum Role {
    User,
    LocalExpert(Application),
    ServiceProvider(Application),
}
