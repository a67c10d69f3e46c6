use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{users::UserProfile, Error, Result};

/// Tokens are valid for one hour from issuance. There is no refresh
/// mechanism; expiry forces a re-login.
pub const TOKEN_TTL: i64 = 3600;

/// Signed snapshot of the profile at issuance time. The client treats the
/// token as its only profile cache, so a profile update re-issues one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub bio: Option<String>,
    pub profile_pic_url: Option<String>,
    pub joined_date: DateTime<Utc>,
    pub iat: i64,
    pub exp: i64,
}

pub fn issue(user: &UserProfile, secret: &str) -> Result<String> {
    issue_at(user, secret, Utc::now())
}

pub(crate) fn issue_at(user: &UserProfile, secret: &str, issued_at: DateTime<Utc>) -> Result<String> {
    let claims = Claims {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        bio: user.bio.clone(),
        profile_pic_url: user.profile_pic_url.clone(),
        joined_date: user.joined_date,
        iat: issued_at.timestamp(),
        exp: (issued_at + Duration::seconds(TOKEN_TTL)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::Unexpected(format!("token signing failed: {e}")))
}

/// Fails on malformed tokens, bad signatures and expiry alike.
pub fn verify(token: &str, secret: &str) -> Result<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|_| Error::Unauthorized("Invalid or expired token".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    fn user() -> UserProfile {
        UserProfile {
            id: 1,
            username: "alice".into(),
            email: "a@x.com".into(),
            bio: Some("hi".into()),
            profile_pic_url: None,
            joined_date: Utc::now(),
        }
    }

    #[test]
    fn issued_token_round_trips() {
        let token = issue(&user(), SECRET).unwrap();
        let claims = verify(&token, SECRET).unwrap();

        assert_eq!(claims.id, 1);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL);
    }

    #[test]
    fn token_still_valid_before_expiry() {
        let token = issue_at(&user(), SECRET, Utc::now() - Duration::minutes(59)).unwrap();
        assert!(verify(&token, SECRET).is_ok());
    }

    #[test]
    fn token_rejected_after_expiry() {
        let token = issue_at(&user(), SECRET, Utc::now() - Duration::minutes(61)).unwrap();
        assert!(verify(&token, SECRET).is_err());
    }

    #[test]
    fn token_rejected_with_wrong_secret() {
        let token = issue(&user(), SECRET).unwrap();
        assert!(verify(&token, "other-secret").is_err());
    }

    #[test]
    fn garbage_rejected() {
        assert!(verify("not-a-token", SECRET).is_err());
    }
}
