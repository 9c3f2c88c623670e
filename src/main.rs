mod infra;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand, ValueEnum};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;
use wayfarer::config::AppConfig;
use wayfarer::error::AppError;
use wayfarer::telemetry;
use wayfarer::workflows::onboarding::{
    onboarding_router, Applicant, ApplicantDirectory, ApplicantId, ApplicationStatus,
    IdentityDetails, LocalExpertProfile, OnboardingError, OnboardingService, RoleProfile,
    ServiceProviderProfile, SocialLinks,
};

use infra::{
    ConsoleNotifier, InMemoryApplicantDirectory, InMemoryApplicationRepository, LogNotifier,
    SandboxPaymentProvisioner,
};

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Wayfarer Onboarding",
    about = "Run the partner onboarding workflow service from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Walk an application through submission and approval with the
    /// in-memory adapters, printing each step
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug)]
struct DemoArgs {
    /// Role to onboard in the walkthrough
    #[arg(long, value_enum, default_value_t = DemoRole::ServiceProvider)]
    role: DemoRole,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum DemoRole {
    LocalExpert,
    ServiceProvider,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Demo(args) => run_demo(args),
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let repository = Arc::new(InMemoryApplicationRepository::default());
    let directory = Arc::new(InMemoryApplicantDirectory::default());
    let payments = Arc::new(SandboxPaymentProvisioner::default());
    let notifier = Arc::new(LogNotifier);
    let service = Arc::new(OnboardingService::new(
        repository,
        directory,
        payments,
        notifier,
        config.onboarding.clone(),
    ));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(onboarding_router(service))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "onboarding workflow service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;

    let repository = Arc::new(InMemoryApplicationRepository::default());
    let directory = Arc::new(InMemoryApplicantDirectory::default());
    let payments = Arc::new(SandboxPaymentProvisioner::default());
    let notifier = Arc::new(ConsoleNotifier);
    let service = OnboardingService::new(
        repository,
        directory.clone(),
        payments,
        notifier,
        config.onboarding,
    );

    let applicant_id = ApplicantId("demo-applicant".to_string());
    directory.seed(Applicant {
        applicant_id: applicant_id.clone(),
        email: "demo@wayfarer.travel".to_string(),
        first_name: "Devon".to_string(),
        last_name: "Reyes".to_string(),
        phone_number: Some("(515) 555-0134".to_string()),
        country: Some("United States".to_string()),
        city: Some("Des Moines".to_string()),
        date_of_birth: None,
        about_me: None,
        image: None,
        is_local_expert: false,
        is_service_provider: false,
        payment_account: None,
        deleted: false,
    });

    let profile = match args.role {
        DemoRole::LocalExpert => RoleProfile::LocalExpert(LocalExpertProfile {
            identity: IdentityDetails {
                about_me: Some("Food and architecture walks downtown".to_string()),
                ..IdentityDetails::default()
            },
            languages: vec!["English".to_string(), "Spanish".to_string()],
            years_in_city: 5,
            offered_services: vec!["City tours".to_string()],
            service_availability: Some("Weekends".to_string()),
            price_expectation: Some("40 USD/hour".to_string()),
            government_id: None,
            travel_licence: None,
            social_links: SocialLinks::default(),
            age_confirmed: true,
            terms_accepted: true,
            partnership_accepted: true,
        }),
        DemoRole::ServiceProvider => RoleProfile::ServiceProvider(ServiceProviderProfile {
            business_name: "Prairie Trails Outfitters".to_string(),
            contact_name: "Devon Reyes".to_string(),
            email: "demo@wayfarer.travel".to_string(),
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
        }),
    };

    println!("Onboarding workflow demo");

    let application = service.submit(&applicant_id, profile)?;
    println!(
        "Submitted {} application {} (status {})",
        application.role_kind().label(),
        application.application_id.0,
        application.status.label()
    );

    let approved = service.transition(
        &application.application_id,
        ApplicationStatus::Approved,
        None,
    )?;
    println!(
        "Administrator approved {} (status {})",
        approved.application_id.0,
        approved.status.label()
    );

    if let Some(applicant) = directory
        .fetch(&applicant_id)
        .map_err(OnboardingError::from)?
    {
        println!(
            "Applicant flags: local_expert={} service_provider={} payment_account={:?}",
            applicant.is_local_expert,
            applicant.is_service_provider,
            applicant.payment_account.map(|account| account.0)
        );
    }

    Ok(())
}
