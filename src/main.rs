use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use homeward::config::AppConfig;
use homeward::error::AppError;
use homeward::telemetry;
use homeward::workflows::adoption::{
    adoption_router, Adopter, AdopterId, AdopterStatus, AdoptionState, AdoptionWorkflow,
    Announcement, AnnouncementDirectory, AnnouncementFilter, AnnouncementId, AnnouncementStatus,
    Clock, LogDispatcher, MemoryStore, Pet, PetId, PetSex, PetStatus, PostalAddress,
    RecordingDispatcher, ReportDesk, RetentionSweep, Shelter, ShelterId, SystemClock,
    VerificationGate, WorkflowError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

const RETENTION_SWEEP_PERIOD: std::time::Duration = std::time::Duration::from_secs(60 * 60);

#[derive(Clone)]
struct ServerState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Homeward Adoption Marketplace",
    about = "Run the adoption marketplace backend or walk through its workflow from the command line",
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
    /// Seed an in-memory catalog and walk the accept-cascade scenario
    Demo,
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
        Command::Demo => run_demo(),
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

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let server_state = ServerState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let store = Arc::new(MemoryStore::default());
    let dispatcher = Arc::new(LogDispatcher);
    let clock = Arc::new(SystemClock);

    let sweep = RetentionSweep::new(store.clone(), clock.clone(), config.retention.window());
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(RETENTION_SWEEP_PERIOD);
        loop {
            ticker.tick().await;
            if let Err(err) = sweep.run() {
                warn!(error = %err, "retention sweep failed");
            }
        }
    });

    let adoption_state = Arc::new(AdoptionState {
        workflow: AdoptionWorkflow::new(store.clone(), dispatcher, clock.clone()),
        directory: AnnouncementDirectory::new(store.clone(), clock.clone()),
        gate: VerificationGate::new(store.clone(), clock),
        reports: ReportDesk::new(store),
    });

    let ops = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(server_state);

    let app = adoption_router(adoption_state)
        .merge(ops)
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "adoption marketplace backend ready");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<ServerState>) -> impl IntoResponse {
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

async fn metrics_endpoint(State(state): State<ServerState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

fn run_demo() -> Result<(), AppError> {
    let store = Arc::new(MemoryStore::default());
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let clock = Arc::new(SystemClock);
    seed_catalog(&store, clock.now().date_naive())?;

    let workflow = AdoptionWorkflow::new(store.clone(), dispatcher.clone(), clock.clone());
    let directory = AnnouncementDirectory::new(store.clone(), clock.clone());
    let gate = VerificationGate::new(store, clock);

    let announcement = AnnouncementId("ann-001".to_string());
    let avery = AdopterId("adp-001".to_string());
    let morgan = AdopterId("adp-002".to_string());
    let shelter = ShelterId("shl-001".to_string());

    println!("Adoption workflow demo");
    println!("Two adopters apply for the same announcement; one is verified and accepted.\n");

    let first = workflow.create(announcement.clone(), avery.clone())?;
    let second = workflow.create(announcement.clone(), morgan.clone())?;
    println!(
        "Applications submitted: {} ({}), {} ({})",
        first.application.id,
        first.application.state.label(),
        second.application.id,
        second.application.state.label()
    );

    gate.grant(&avery, &shelter)?;
    println!("Shelter {} verified adopter {}", shelter, avery);

    let accepted = workflow.accept(&first.application.id)?;
    println!(
        "\nAccepted {} -> announcement {} is now {}",
        accepted.application.id,
        accepted.announcement.id,
        accepted.announcement.status.label()
    );

    let loser = workflow.get(&second.application.id)?;
    println!(
        "Cascade: {} flipped to {}",
        loser.application.id,
        loser.application.state.label()
    );

    println!("\nNotifications dispatched");
    for event in dispatcher.events() {
        println!(
            "- {} <{}>: application {}",
            event.recipient_name, event.recipient_email, event.status_label
        );
    }

    let open = directory.query(&AnnouncementFilter::default())?;
    println!("\nOpen announcements remaining: {}", open.len());

    Ok(())
}

fn seed_catalog(store: &MemoryStore, today: NaiveDate) -> Result<(), WorkflowError> {
    let now = SystemClock.now();

    store.insert_shelter(Shelter {
        id: ShelterId("shl-001".to_string()),
        name: "Cedar Hollow Rescue".to_string(),
        email: "contact@cedarhollow.example".to_string(),
        phone: "555-0100".to_string(),
        address: PostalAddress {
            street: "14 Birch Lane".to_string(),
            city: "Springfield".to_string(),
            postal_code: "62701".to_string(),
        },
        is_authorized: Some(true),
    })?;

    store.insert_pet(Pet {
        id: PetId("pet-001".to_string()),
        shelter_id: ShelterId("shl-001".to_string()),
        name: "Biscuit".to_string(),
        species: "Dog".to_string(),
        breed: "Labrador Retriever".to_string(),
        birthday: today - chrono::Duration::days(3 * 365),
        sex: PetSex::Male,
        status: PetStatus::Active,
    })?;

    store.insert_announcement(Announcement {
        id: AnnouncementId("ann-001".to_string()),
        shelter_id: ShelterId("shl-001".to_string()),
        pet_id: PetId("pet-001".to_string()),
        title: "Biscuit is looking for a home".to_string(),
        description: "Three-year-old lab, good with kids.".to_string(),
        status: AnnouncementStatus::Open,
        creation_date: now,
        closing_date: None,
        last_update_date: now,
    })?;

    for (id, name, email) in [
        ("adp-001", "Avery Quinn", "avery@example.com"),
        ("adp-002", "Morgan Lee", "morgan@example.com"),
    ] {
        store.insert_adopter(Adopter {
            id: AdopterId(id.to_string()),
            name: name.to_string(),
            email: email.to_string(),
            phone: "555-0199".to_string(),
            address: PostalAddress {
                street: "8 Elm Street".to_string(),
                city: "Springfield".to_string(),
                postal_code: "62704".to_string(),
            },
            status: AdopterStatus::Active,
            deletion_time: None,
        })?;
    }

    Ok(())
}
