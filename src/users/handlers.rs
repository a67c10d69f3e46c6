use std::path::Path;

use rusqlite::params;

use crate::{config, ctx::BaseParams, db, db::DB, uploads, Error, Result};

use super::{UpdateProfile, UserId, UserProfile, PROFILE_COLUMNS};

pub async fn get_profile(user_id: UserId, db: DB) -> Result<UserProfile> {
    db.call(move |conn| {
        conn.query_row(
            &format!("SELECT {PROFILE_COLUMNS} FROM users WHERE id = ?"),
            params![user_id],
            |row| UserProfile::try_from(row),
        )
        .map_err(|e| e.into())
    })
    .await
    .map_err(db::Error::from)
    .map_err(|e| e.not_found_message("User not found"))
    .map_err(Error::from)
}

/// Advisory only: nothing locks the name between this check and a later
/// write. The UNIQUE constraint is the real arbiter.
pub async fn username_exists(username: String, db: DB) -> Result<bool> {
    db.call(move |conn| {
        let exists = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)",
            params![username],
            |row| row.get::<_, bool>(0),
        )?;
        Ok(exists)
    })
    .await
    .map_err(Error::from)
}

/// Updates username/bio and, when a new avatar arrives, swaps the stored
/// file: write the new one first, then best-effort delete the old one.
pub async fn update_profile(args: UpdateProfile, BaseParams { db, user }: BaseParams) -> Result<UserProfile> {
    let UpdateProfile { username, bio, avatar } = args;

    if username.trim().is_empty() {
        return Err(Error::BadRequest("Please provide a username".into()));
    }

    let mut profile_pic_url = user.profile_pic_url.clone();
    if let Some(avatar) = avatar {
        let dir = Path::new(&config().uploads_dir);
        let stored = uploads::store_avatar(dir, &avatar.file_name, avatar.bytes).await?;
        if let Some(old) = &user.profile_pic_url {
            uploads::remove_avatar(dir, old).await;
        }
        profile_pic_url = Some(stored);
    }

    let user_id = user.id;
    db.call(move |conn| {
        conn.query_row(
            &format!(
                r#"UPDATE users SET username = ?, bio = ?, profile_pic_url = ?, updated_at = ?
                WHERE id = ?
                RETURNING {PROFILE_COLUMNS}"#
            ),
            params![username, bio, profile_pic_url, chrono::Utc::now(), user_id],
            |row| UserProfile::try_from(row),
        )
        .map_err(|e| e.into())
    })
    .await
    .map_err(db::Error::from)
    .map_err(|e| e.not_found_message("User not found"))
    .map_err(|e| e.conflict_message("Username is already taken"))
    .map_err(Error::from)
}
