use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::directory::ApplicantDirectory;
use super::domain::{
    ApplicantId, ApplicationId, ApplicationStatus, LocalExpertProfile, RoleKind, RoleProfile,
    ServiceProviderProfile,
};
use super::notification::Notifier;
use super::payments::PaymentProvisioner;
use super::repository::ApplicationRepository;
use super::service::{OnboardingError, OnboardingService};

/// Router builder exposing the onboarding endpoints per role-kind.
pub fn onboarding_router<R, D, P, N>(service: Arc<OnboardingService<R, D, P, N>>) -> Router
where
    R: ApplicationRepository + 'static,
    D: ApplicantDirectory + 'static,
    P: PaymentProvisioner + 'static,
    N: Notifier + 'static,
{
    Router::new()
        .route(
            "/api/v1/onboarding/:role/applications",
            post(submit_handler::<R, D, P, N>),
        )
        .route(
            "/api/v1/onboarding/:role/applications/:applicant_id",
            get(current_handler::<R, D, P, N>),
        )
        .route(
            "/api/v1/onboarding/applications/:application_id/status",
            patch(transition_handler::<R, D, P, N>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitRequest {
    applicant_id: String,
    profile: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransitionRequest {
    status: String,
    #[serde(default)]
    rejection_message: Option<String>,
}

pub(crate) async fn submit_handler<R, D, P, N>(
    State(service): State<Arc<OnboardingService<R, D, P, N>>>,
    Path(role): Path<String>,
    axum::Json(payload): axum::Json<SubmitRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    D: ApplicantDirectory + 'static,
    P: PaymentProvisioner + 'static,
    N: Notifier + 'static,
{
    let Some(kind) = RoleKind::from_path_segment(&role) else {
        return unknown_role_response(&role);
    };

    let profile = match kind {
        RoleKind::LocalExpert => {
            serde_json::from_value::<LocalExpertProfile>(payload.profile).map(RoleProfile::LocalExpert)
        }
        RoleKind::ServiceProvider => serde_json::from_value::<ServiceProviderProfile>(payload.profile)
            .map(RoleProfile::ServiceProvider),
    };
    let profile = match profile {
        Ok(profile) => profile,
        Err(source) => {
            let body = json!({
                "error": format!("invalid {} profile: {source}", kind.label()),
            });
            return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(body)).into_response();
        }
    };

    match service.submit(&ApplicantId(payload.applicant_id), profile) {
        Ok(application) => {
            (StatusCode::CREATED, axum::Json(application.status_view())).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn current_handler<R, D, P, N>(
    State(service): State<Arc<OnboardingService<R, D, P, N>>>,
    Path((role, applicant_id)): Path<(String, String)>,
) -> Response
where
    R: ApplicationRepository + 'static,
    D: ApplicantDirectory + 'static,
    P: PaymentProvisioner + 'static,
    N: Notifier + 'static,
{
    let Some(kind) = RoleKind::from_path_segment(&role) else {
        return unknown_role_response(&role);
    };

    match service.current_application(&ApplicantId(applicant_id), kind) {
        Ok(application) => {
            (StatusCode::OK, axum::Json(application.status_view())).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn transition_handler<R, D, P, N>(
    State(service): State<Arc<OnboardingService<R, D, P, N>>>,
    Path(application_id): Path<String>,
    axum::Json(payload): axum::Json<TransitionRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    D: ApplicantDirectory + 'static,
    P: PaymentProvisioner + 'static,
    N: Notifier + 'static,
{
    let Some(target) = ApplicationStatus::from_label(&payload.status) else {
        return error_response(OnboardingError::InvalidStatus);
    };

    match service.transition(
        &ApplicationId(application_id),
        target,
        payload.rejection_message,
    ) {
        Ok(application) => {
            (StatusCode::OK, axum::Json(application.status_view())).into_response()
        }
        Err(error) => error_response(error),
    }
}

fn unknown_role_response(role: &str) -> Response {
    let body = json!({
        "error": format!("unknown onboarding role '{role}'"),
    });
    (StatusCode::NOT_FOUND, axum::Json(body)).into_response()
}

fn error_response(error: OnboardingError) -> Response {
    let status = match &error {
        OnboardingError::DuplicateApplication { .. } | OnboardingError::StaleTransition => {
            StatusCode::CONFLICT
        }
        OnboardingError::EmailConflict { .. }
        | OnboardingError::ExternalProvisioningFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
        OnboardingError::InvalidStatus => StatusCode::BAD_REQUEST,
        OnboardingError::NotFound => StatusCode::NOT_FOUND,
        OnboardingError::NotificationFailed(_) => StatusCode::BAD_GATEWAY,
        OnboardingError::Repository(_) | OnboardingError::Directory(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let mut body = json!({ "error": error.to_string() });
    if matches!(error, OnboardingError::NotificationFailed(_)) {
        // The transition itself committed; only the outbound notice failed.
        body["status_committed"] = json!(true);
    }

    (status, axum::Json(body)).into_response()
}
