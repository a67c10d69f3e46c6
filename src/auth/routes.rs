use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::{config, ctx::BaseParams, db::DB, Result};

use super::{handlers, token, LoginResponse, LoginUser, RegisterUser, ValidateResponse};

pub fn router() -> Router {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/validate", get(validate))
}

async fn register(Extension(db): Extension<DB>, Json(args): Json<RegisterUser>) -> Result<impl IntoResponse> {
    handlers::register(args, db).await?;
    // no token on purpose: the client logs in separately
    Ok((StatusCode::CREATED, Json(json!({ "msg": "User registered successfully" }))))
}

async fn login(Extension(db): Extension<DB>, Json(args): Json<LoginUser>) -> Result<impl IntoResponse> {
    let user = handlers::login(args, db).await?;
    let token = token::issue(&user, &config().jwt_secret)?;

    Ok(Json(LoginResponse {
        msg: "Login successful".into(),
        token,
        user,
    }))
}

/// Stateless acknowledgement. Tokens stay valid until natural expiry.
async fn logout() -> impl IntoResponse {
    Json(json!({ "msg": "Logout successful" }))
}

async fn validate(BaseParams { db, user }: BaseParams) -> Result<impl IntoResponse> {
    let alive = handlers::user_exists(user.id, db).await?;

    let status = if alive { StatusCode::OK } else { StatusCode::UNAUTHORIZED };
    Ok((status, Json(ValidateResponse { is_valid: alive })))
}
