use axum::{
    extract::{Extension, Multipart, Path},
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};

use crate::{
    auth::token,
    config,
    ctx::BaseParams,
    db::DB,
    Error, Result,
};

use super::{handlers, Avatar, ExistsResponse, ProfileUpdatedResponse, UpdateProfile, UserId, UserResponse};

pub fn router() -> Router {
    Router::new()
        .route("/api/user", get(me))
        .route("/api/user/update", put(update_profile))
        .route("/api/user/exists/{username}", get(username_exists))
        .route("/api/user/{id}", get(get_user))
}

/// The caller's own profile, read fresh from the store rather than echoed
/// back from the token.
async fn me(base: BaseParams) -> Result<impl IntoResponse> {
    let user = handlers::get_profile(base.user.id, base.db).await?;
    Ok(Json(UserResponse { user }))
}

async fn get_user(Path(user_id): Path<UserId>, Extension(db): Extension<DB>) -> Result<impl IntoResponse> {
    let user = handlers::get_profile(user_id, db).await?;
    Ok(Json(UserResponse { user }))
}

async fn username_exists(Path(username): Path<String>, Extension(db): Extension<DB>) -> Result<impl IntoResponse> {
    let exists = handlers::username_exists(username, db).await?;
    Ok(Json(ExistsResponse { exists }))
}

async fn update_profile(base: BaseParams, mut multipart: Multipart) -> Result<impl IntoResponse> {
    let mut args = UpdateProfile::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "username" => args.username = field.text().await.map_err(|e| Error::BadRequest(e.to_string()))?,
            "bio" => args.bio = Some(field.text().await.map_err(|e| Error::BadRequest(e.to_string()))?),
            "profilePic" => {
                let file_name = field.file_name().unwrap_or("avatar").to_string();
                let bytes = field.bytes().await.map_err(|e| Error::BadRequest(e.to_string()))?;
                args.avatar = Some(Avatar { file_name, bytes });
            }
            _ => {}
        }
    }

    let user = handlers::update_profile(args, base).await?;

    // the token is the client's only profile cache, so re-issue it with
    // the new snapshot
    let token = token::issue(&user, &config().jwt_secret)?;

    Ok(Json(ProfileUpdatedResponse {
        msg: "Profile updated successfully".into(),
        token,
        user,
    }))
}
