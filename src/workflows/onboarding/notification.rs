use super::directory::IssuedCredential;
use super::domain::{Applicant, RoleKind};

/// Seam to the outbound email collaborator. No retry lives here; a failed
/// send surfaces to the caller.
pub trait Notifier: Send + Sync {
    fn send(&self, notice: Notice) -> Result<(), NotificationError>;
}

/// Templated message delivered to an applicant after a terminal transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Notification dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

const SIGNATURE: &str = "Best regards,\nThe Wayfarer Team";

pub fn approval_notice(
    applicant: &Applicant,
    kind: RoleKind,
    credential: Option<&IssuedCredential>,
    frontend_url: &str,
) -> Notice {
    let login = match credential {
        Some(credential) => format!(
            "You can log in at {frontend_url}/ with these credentials:\n\
             Email: {email}\n\
             Password: {password}\n\n\
             Make sure to change your password after your first login. This \
             password is system-generated and we do not store it.",
            email = applicant.email,
            password = credential.plaintext,
        ),
        None => format!("You can log in at {frontend_url}/ with your existing credentials."),
    };

    Notice {
        to: applicant.email.clone(),
        subject: format!("{} Application Approved", kind.display_name()),
        body: format!(
            "Hi {first_name},\n\n\
             Your request to become a {role} has been approved!\n\n\
             {login}\n\n\
             {SIGNATURE}\n",
            first_name = applicant.first_name,
            role = kind.display_name(),
        ),
    }
}

pub fn rejection_notice(applicant: &Applicant, kind: RoleKind, reason: &str) -> Notice {
    Notice {
        to: applicant.email.clone(),
        subject: format!("{} Application Rejected", kind.display_name()),
        body: format!(
            "Hi {first_name},\n\n\
             Unfortunately, your request to become a {role} has been rejected.\n\n\
             Reason: {reason}\n\n\
             You can review and apply again in the future.\n\n\
             {SIGNATURE}\n",
            first_name = applicant.first_name,
            role = kind.display_name(),
        ),
    }
}

pub fn deletion_notice(applicant: &Applicant, kind: RoleKind, reason: &str) -> Notice {
    Notice {
        to: applicant.email.clone(),
        subject: format!("{} Account Deleted", kind.display_name()),
        body: format!(
            "Hi {first_name},\n\n\
             Your {role} account has been deleted by an administrator.\n\n\
             Reason: {reason}\n\n\
             If you believe this was done in error, please contact support.\n\n\
             {SIGNATURE}\n",
            first_name = applicant.first_name,
            role = kind.display_name(),
        ),
    }
}
