use serde::Serialize;

use super::domain::{Applicant, PaymentAccountRef, ServiceProviderProfile};
use super::phone::normalize_us_phone;

/// Only account country the payment collaborator currently accepts.
pub const SUPPORTED_ACCOUNT_COUNTRY: &str = "US";

const FALLBACK_FIRST_NAME: &str = "User";
const FALLBACK_LAST_NAME: &str = "Account";
const FALLBACK_PRODUCT_DESCRIPTION: &str = "Travel services";

/// Payload handed to the payment collaborator when provisioning an account
/// for an approved service provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Normalized to the supported format; omitted when the source number
    /// has fewer than ten digits.
    pub phone: Option<String>,
    pub country: String,
    pub product_description: String,
    pub business_url: String,
}

impl AccountRequest {
    /// Assemble the provisioning payload from the applicant's identity record
    /// and the approved business profile. The profile's mobile number wins
    /// over the stored phone number when both are present.
    pub fn for_provider(
        applicant: &Applicant,
        profile: &ServiceProviderProfile,
        marketplace_url: &str,
    ) -> Self {
        let raw_phone = if profile.mobile.trim().is_empty() {
            applicant.phone_number.clone().unwrap_or_default()
        } else {
            profile.mobile.clone()
        };

        Self {
            email: applicant.email.clone(),
            first_name: fallback(&applicant.first_name, FALLBACK_FIRST_NAME),
            last_name: fallback(&applicant.last_name, FALLBACK_LAST_NAME),
            phone: normalize_us_phone(&raw_phone),
            country: SUPPORTED_ACCOUNT_COUNTRY.to_string(),
            product_description: profile
                .description
                .as_deref()
                .filter(|description| !description.trim().is_empty())
                .unwrap_or(FALLBACK_PRODUCT_DESCRIPTION)
                .to_string(),
            business_url: marketplace_url.to_string(),
        }
    }
}

fn fallback(value: &str, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

/// Seam to the external payment processor.
pub trait PaymentProvisioner: Send + Sync {
    fn create_account(&self, request: AccountRequest)
        -> Result<PaymentAccountRef, ProvisioningError>;
}

/// Structured provisioning failures surfaced by the payment collaborator.
#[derive(Debug, thiserror::Error)]
pub enum ProvisioningError {
    #[error("payment collaborator rejected the phone number")]
    InvalidPhone,
    #[error("payment collaborator rejected the email address")]
    InvalidEmail,
    #[error("payment collaborator rejected the account country")]
    InvalidCountry,
    #[error("payment collaborator error: {0}")]
    Provider(String),
}
