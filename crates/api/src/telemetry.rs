use std::time::Duration;

use tower::layer::util::{Identity, Stack};
use tower::ServiceBuilder;
use tower_http::trace::HttpMakeClassifier;
use tower_http::{
    cors::CorsLayer, limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}

type HttpStack = Stack<
    TimeoutLayer,
    Stack<RequestBodyLimitLayer, Stack<CorsLayer, Stack<TraceLayer<HttpMakeClassifier>, Identity>>>,
>;

/// Requests running past `timeout` get a 408. A blocking engine run keeps
/// going in the background, so callers also cap the work they hand it.
pub fn stack(body_limit: usize, timeout: Duration) -> ServiceBuilder<HttpStack> {
    let trace = TraceLayer::new_for_http();
    let cors = CorsLayer::permissive();
    let limit = RequestBodyLimitLayer::new(body_limit);

    ServiceBuilder::new()
        .layer(trace)
        .layer(cors)
        .layer(limit)
        .layer(TimeoutLayer::new(timeout))
}
