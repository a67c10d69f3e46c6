use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::{
    auth::token::{self, Claims},
    config,
    db::DB,
    Error,
};

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Verified identity of the caller. Rejects with 401 when the bearer token
/// is missing, malformed, badly signed or expired.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Claims);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| Error::Unauthorized("No token, authorization denied".into()))?;
        let claims = token::verify(token, &config().jwt_secret)?;
        Ok(Self(claims))
    }
}

/// Identity when present. An absent or invalid token degrades to anonymous
/// instead of rejecting; used by read paths that gate on note visibility.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<Claims>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = bearer_token(parts).and_then(|token| token::verify(token, &config().jwt_secret).ok());
        Ok(Self(claims))
    }
}

/// Everything a protected handler needs: the store handle and the caller.
#[derive(Clone)]
pub struct BaseParams {
    pub db: DB,
    pub user: Claims,
}

impl<S> FromRequestParts<S> for BaseParams
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        let Extension(db) = Extension::<DB>::from_request_parts(parts, state)
            .await
            .map_err(|_| Error::Unexpected("database extension missing".into()))?;

        Ok(Self { db, user })
    }
}
