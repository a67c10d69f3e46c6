use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

pub type UserId = i64;

/// Public profile fields, the only user shape that ever leaves the API.
/// The password hash stays in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub bio: Option<String>,
    pub profile_pic_url: Option<String>,
    pub joined_date: DateTime<Utc>,
}

/// Column order: id, username, email, bio, profile_pic_url, created_at
impl<'a> TryFrom<&Row<'a>> for UserProfile {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'a>) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            id: row.get(0)?,
            username: row.get(1)?,
            email: row.get(2)?,
            bio: row.get(3)?,
            profile_pic_url: row.get(4)?,
            joined_date: row.get(5)?,
        })
    }
}

pub const PROFILE_COLUMNS: &str = "id, username, email, bio, profile_pic_url, created_at";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistsResponse {
    pub exists: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdatedResponse {
    pub msg: String,
    pub token: String,
    pub user: UserProfile,
}

/// Parsed out of the multipart update form.
#[derive(Debug, Default)]
pub struct UpdateProfile {
    pub username: String,
    pub bio: Option<String>,
    pub avatar: Option<Avatar>,
}

#[derive(Debug)]
pub struct Avatar {
    pub file_name: String,
    pub bytes: axum::body::Bytes,
}
