use rusqlite::{params, OptionalExtension};

use crate::{
    db::DB,
    users::{UserId, UserProfile, PROFILE_COLUMNS},
    Error, Result,
};

use super::{password, LoginUser, RegisterUser};

pub async fn register(args: RegisterUser, db: DB) -> Result<()> {
    let RegisterUser {
        username,
        email,
        password,
        bio,
    } = args;

    if username.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
        return Err(Error::BadRequest("Please provide all required fields".into()));
    }

    let hashed = password::hash(&password)?;

    db.call(move |conn| {
        let taken = conn.query_row("SELECT EXISTS(SELECT 1 FROM users WHERE email = ?)", params![email], |row| {
            row.get::<_, bool>(0)
        })?;
        if taken {
            return Err(Error::Conflict("Email is already registered".into()).into());
        }

        conn.execute(
            "INSERT INTO users (username, email, password, bio) VALUES (?, ?, ?, ?)",
            params![username, email, hashed, bio],
        )?;
        Ok(())
    })
    .await
    // a concurrent registration still trips the UNIQUE backstop
    .map_err(Error::from)
    .map_err(|e| match e {
        Error::Conflict(_) => Error::Conflict("Email is already registered".into()),
        e => e,
    })
}

/// Unknown email and wrong password are deliberately indistinguishable.
pub async fn login(args: LoginUser, db: DB) -> Result<UserProfile> {
    let LoginUser { email, password } = args;

    if email.trim().is_empty() || password.is_empty() {
        return Err(Error::BadRequest("Please provide email and password".into()));
    }

    let row = db
        .call(move |conn| {
            let row = conn
                .query_row(
                    &format!("SELECT {PROFILE_COLUMNS}, password FROM users WHERE email = ?"),
                    params![email],
                    |row| Ok((UserProfile::try_from(row)?, row.get::<_, String>(6)?)),
                )
                .optional()?;
            Ok(row)
        })
        .await
        .map_err(Error::from)?;

    let Some((user, stored_hash)) = row else {
        return Err(Error::Unauthorized("Invalid email or password".into()));
    };

    if !password::verify(&password, &stored_hash)? {
        return Err(Error::Unauthorized("Invalid email or password".into()));
    }

    Ok(user)
}

/// Liveness of the user row itself; the token was already verified by the
/// extractor.
pub async fn user_exists(user_id: UserId, db: DB) -> Result<bool> {
    db.call(move |conn| {
        let alive = conn.query_row("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)", params![user_id], |row| {
            row.get::<_, bool>(0)
        })?;
        Ok(alive)
    })
    .await
    .map_err(Error::from)
}
