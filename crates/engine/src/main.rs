//! Waytrail Engine - main entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::header::HeaderName;
use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use waytrail_domain::{
    Campaign, CampaignId, GeoPoint, MarkerSource, Question, QuestionKind, Route, RouteMarker,
    UserId, WaypointId,
};
use waytrail_engine::app::App;
use waytrail_engine::infrastructure::ports::{UserRecord, UserRole};
use waytrail_engine::infrastructure::settings::AppSettings;
use waytrail_engine::{api, infrastructure};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "waytrail_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Waytrail Engine");

    let settings = AppSettings::from_env();
    let app = Arc::new(App::new(&settings));

    seed_demo_data(&app.store);

    let mut router = api::http::routes()
        .with_state(app)
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = build_cors_layer_from_env() {
        router = router.layer(cors);
    }

    let addr: SocketAddr = format!("{}:{}", settings.server_host, settings.server_port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

/// Load a small walkable campaign and an admin account into the in-memory
/// store so the engine is usable out of the box.
fn seed_demo_data(store: &infrastructure::memory::MemoryStore) {
    let campaign_id = CampaignId::new();

    let civic = Route::new(campaign_id, 0, "Civic District")
        .with_starting_hint("Begin where the river meets the bay, at the city's guardian statue.");
    let merlion = RouteMarker::new(
        civic.id(),
        0,
        MarkerSource::Waypoint {
            id: WaypointId::new(),
        },
        "Merlion Park",
        GeoPoint::new(1.2868, 103.8545),
    )
    .with_description("Half lion, half fish, wholly iconic.")
    .with_hint_to_next("Walk upriver to the grand old bridge named after a colonial engineer.");
    let merlion_q = Question::new(
        merlion.id(),
        0,
        QuestionKind::MultipleChoice {
            options: vec!["1964".into(), "1972".into(), "1989".into()],
        },
        "In which year was the Merlion statue unveiled?",
        "1972",
    );
    let merlion = merlion.with_questions(vec![merlion_q]);

    let anderson = RouteMarker::new(
        civic.id(),
        1,
        MarkerSource::Waypoint {
            id: WaypointId::new(),
        },
        "Anderson Bridge",
        GeoPoint::new(1.2871, 103.8520),
    )
    .with_description("Steel bridge opened in 1910, once part of the Grand Prix circuit.")
    .with_hint_to_next("Follow the river to the white dome of the old Supreme Court.");
    let anderson_q = Question::new(
        anderson.id(),
        0,
        QuestionKind::TrueFalse,
        "Anderson Bridge once formed part of a Formula One street circuit.",
        "true",
    );
    let anderson = anderson.with_questions(vec![anderson_q]);

    let civic = civic.with_markers(vec![merlion, anderson]);
    let campaign = Campaign::new("Singapore River Heritage Trail")
        .with_id(campaign_id)
        .with_description("A walk through the civic district's waterfront history.")
        .with_routes(vec![civic]);

    store.put_campaign(campaign);

    let admin_id = UserId::new();
    store.put_user(UserRecord {
        id: admin_id,
        username: "admin".into(),
        role: UserRole::Admin,
    });

    tracing::info!(%campaign_id, %admin_id, "seeded demo campaign and admin user");
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

fn build_cors_layer_from_env() -> Option<CorsLayer> {
    let allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())?;

    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        // The client sends X-User-Id and JSON content types, which trigger
        // CORS preflights.
        .allow_headers([
            HeaderName::from_static("x-user-id"),
            axum::http::header::CONTENT_TYPE,
        ]);

    if allowed_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        if origins.is_empty() {
            return None;
        }

        cors = cors.allow_origin(origins);
    }

    Some(cors)
}
