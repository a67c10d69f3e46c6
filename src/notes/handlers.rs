use rusqlite::{params, OptionalExtension};

use crate::{ctx::BaseParams, db, db::DB, users::UserId, Error, Result};

use super::{CreateNote, Note, NoteStatus, PublicNote, UpdateNote, NOTE_COLUMNS};

/// All public notes joined with their owner's username, newest first.
pub async fn list_public(db: DB) -> Result<Vec<PublicNote>> {
    db.call(move |conn| {
        let notes = conn
            .prepare(
                r#"SELECT n.id, n.title, n.content, n.share_id, n.status, n.created_at, u.username
                FROM notes n JOIN users u ON u.id = n.user_id
                WHERE n.status = 'public'
                ORDER BY n.created_at DESC, n.id DESC"#,
            )?
            .query_map([], |row| PublicNote::try_from(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(notes)
    })
    .await
    .map_err(Error::from)
}

/// Single note by share identifier. Public notes are readable by anyone;
/// a protected note only by its owner, and to everyone else it does not
/// exist.
pub async fn get_by_share_id(share_id: String, viewer: Option<UserId>, db: DB) -> Result<Note> {
    let note = db
        .call(move |conn| {
            let note = conn
                .query_row(
                    &format!("SELECT {NOTE_COLUMNS} FROM notes WHERE share_id = ?"),
                    params![share_id],
                    |row| Note::try_from(row),
                )
                .optional()?;
            Ok(note)
        })
        .await
        .map_err(Error::from)?;

    match note {
        Some(note) if note.status == NoteStatus::Public || viewer == Some(note.user_id) => Ok(note),
        _ => Err(Error::NotFound("Note not found".into())),
    }
}

/// The owner's full note list. Callers may only list themselves.
pub async fn list_owned(user_id: UserId, BaseParams { db, user }: BaseParams) -> Result<Vec<Note>> {
    if user.id != user_id {
        return Err(Error::Forbidden("Forbidden".into()));
    }

    db.call(move |conn| {
        let notes = conn
            .prepare(&format!(
                "SELECT {NOTE_COLUMNS} FROM notes WHERE user_id = ? ORDER BY created_at DESC, id DESC"
            ))?
            .query_map(params![user_id], |row| Note::try_from(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(notes)
    })
    .await
    .map_err(Error::from)
}

/// Another user's profile view: their public notes only.
pub async fn list_public_by(user_id: UserId, db: DB) -> Result<Vec<Note>> {
    db.call(move |conn| {
        let notes = conn
            .prepare(&format!(
                "SELECT {NOTE_COLUMNS} FROM notes WHERE user_id = ? AND status = 'public' ORDER BY created_at DESC, id DESC"
            ))?
            .query_map(params![user_id], |row| Note::try_from(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(notes)
    })
    .await
    .map_err(Error::from)
}

/// Exact share-identifier lookup, same visibility gate as a direct fetch.
pub async fn search(query: String, viewer: Option<UserId>, db: DB) -> Result<Vec<Note>> {
    if query.trim().is_empty() {
        return Err(Error::BadRequest("Query is required".into()));
    }

    let notes = db
        .call(move |conn| {
            let notes = conn
                .prepare(&format!("SELECT {NOTE_COLUMNS} FROM notes WHERE share_id = ?"))?
                .query_map(params![query], |row| Note::try_from(row))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(notes)
        })
        .await
        .map_err(Error::from)?;

    let notes: Vec<Note> = notes
        .into_iter()
        .filter(|note| note.status == NoteStatus::Public || viewer == Some(note.user_id))
        .collect();

    if notes.is_empty() {
        return Err(Error::NotFound("No notes found".into()));
    }
    Ok(notes)
}

pub async fn create(args: CreateNote, BaseParams { db, user }: BaseParams) -> Result<Note> {
    let CreateNote {
        title,
        content,
        share_id,
        status,
    } = args;

    if title.trim().is_empty() || content.trim().is_empty() || share_id.trim().is_empty() {
        return Err(Error::BadRequest("Please provide all required fields".into()));
    }

    let user_id = user.id;
    db.call(move |conn| {
        conn.query_row(
            &format!(
                r#"INSERT INTO notes (user_id, title, content, share_id, status) VALUES (?, ?, ?, ?, ?)
                RETURNING {NOTE_COLUMNS}"#
            ),
            params![user_id, title, content, share_id, status],
            |row| Note::try_from(row),
        )
        .map_err(|e| e.into())
    })
    .await
    .map_err(db::Error::from)
    .map_err(|e| e.conflict_message("Share ID is already taken"))
    .map_err(Error::from)
}

/// The `(id, user_id)` condition doubles as the ownership check: updating
/// someone else's note is indistinguishable from updating a missing one.
pub async fn update(note_id: i64, args: UpdateNote, BaseParams { db, user }: BaseParams) -> Result<Note> {
    let UpdateNote { title, content, status } = args;

    if title.trim().is_empty() || content.trim().is_empty() {
        return Err(Error::BadRequest("Please provide all required fields".into()));
    }

    let user_id = user.id;
    db.call(move |conn| {
        conn.query_row(
            &format!(
                r#"UPDATE notes SET title = ?, content = ?, status = ?, updated_at = ?
                WHERE id = ? AND user_id = ?
                RETURNING {NOTE_COLUMNS}"#
            ),
            params![title, content, status, chrono::Utc::now(), note_id, user_id],
            |row| Note::try_from(row),
        )
        .map_err(|e| e.into())
    })
    .await
    .map_err(db::Error::from)
    .map_err(|e| e.not_found_message("Note not found or unauthorized"))
    .map_err(Error::from)
}

/// Deletion is immediate and permanent; same ownership condition as update.
pub async fn delete(note_id: i64, BaseParams { db, user }: BaseParams) -> Result<Note> {
    let user_id = user.id;
    db.call(move |conn| {
        conn.query_row(
            &format!(
                r#"DELETE FROM notes
                WHERE id = ? AND user_id = ?
                RETURNING {NOTE_COLUMNS}"#
            ),
            params![note_id, user_id],
            |row| Note::try_from(row),
        )
        .map_err(|e| e.into())
    })
    .await
    .map_err(db::Error::from)
    .map_err(|e| e.not_found_message("Note not found or unauthorized"))
    .map_err(Error::from)
}
