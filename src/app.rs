use axum::{
    extract::{DefaultBodyLimit, Extension},
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use rand::Rng;
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::{
    auth, config,
    db::DB,
    errors::{self, on_error},
    notes, users,
};

// matches the original deployment's 20mb body cap for editor payloads
const BODY_LIMIT: usize = 20 * 1024 * 1024;

pub async fn create(db: DB) -> errors::Result<Router> {
    let app = Router::new()
        .route("/__heartbeat__", get(heartbeat))
        .route("/__lbheartbeat__", get(lbheartbeat))
        .merge(auth::router())
        .merge(users::router())
        .merge(notes::router())
        .nest_service("/uploads", ServeDir::new(&config().uploads_dir))
        .layer(
            ServiceBuilder::new()
                .layer(Extension(db))
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(BODY_LIMIT))
                .layer(middleware::from_fn(on_error)),
        );

    Ok(app)
}

async fn heartbeat() -> impl IntoResponse {
    let mut rng = rand::thread_rng();
    let random: u32 = rng.gen_range(0..=10000);

    Json(json!({
        "status" : "ok",
        "random": random,
    }))
}

async fn lbheartbeat() -> impl IntoResponse {
    ""
}
