mod config;
mod error;
mod state;
mod telemetry;
pub mod routes {
    pub mod explain;
    pub mod health;
    pub mod jobs;
    pub mod schedule;
    pub mod validate;
}

use axum::{
    routing::{get, post},
    Router,
};

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
        paths(
            routes::health::health,
            routes::schedule::schedule,
            routes::schedule::enqueue,
            routes::jobs::status,
            routes::jobs::result,
            routes::validate::validate_handler,
            routes::explain::explain,
        ),
        components(schemas(
            types::ScheduleRequest, types::ScheduleParams, types::OptimizeMode,
            types::Student, types::SubjectMeta, types::ClassRoom,
            types::ScheduleResult, types::ScheduleBlock, types::InstanceDetail,
            types::ScheduleMetrics, types::InstanceInfo,
            types::StudentId, types::HomeroomId, types::SubjectCode, types::InstanceId,
            jobs::JobId, jobs::JobStatus,
            routes::validate::ValidationReport,
            routes::schedule::JobCreated,
            routes::explain::ExplainIn,
            routes::explain::ExplainOut
        )),
        tags(
            (name = "movesched", description = "Moving-class block scheduling API")
        )
    )]
struct ApiDoc;

fn app(app_state: state::AppState, cfg: &config::AppConfig) -> Router {
    Router::new()
        .route("/v1/health", get(routes::health::health))
        .route("/v1/schedule", post(routes::schedule::schedule))
        .route("/v1/jobs", post(routes::schedule::enqueue))
        .route("/v1/jobs/:id", get(routes::jobs::status))
        .route("/v1/jobs/:id/result", get(routes::jobs::result))
        .route("/v1/validate", post(routes::validate::validate_handler))
        .route("/v1/explain", post(routes::explain::explain))
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(telemetry::stack(cfg.body_limit_bytes, cfg.request_timeout()))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    let cfg = config::AppConfig::from_env()?;
    let app = app(state::AppState::from_config(&cfg), &cfg);

    let addr = cfg.listen_addr();
    tracing::info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
