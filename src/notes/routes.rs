use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    ctx::{BaseParams, MaybeUser},
    db::DB,
    users::UserId,
    Result,
};

use super::{handlers, CreateNote, NoteCreatedResponse, NoteResponse, NotesResponse, UpdateNote};

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    query: String,
}

pub fn router() -> Router {
    Router::new()
        .route("/api/notes/data", get(list_public))
        .route("/api/notes/search", get(search))
        .route("/api/notes", post(create_note))
        .route("/api/notes/all/{userid}", get(user_notes))
        .route("/api/notes/all/public/{userid}", get(public_user_notes))
        .route("/api/notes/{id}", get(get_note).put(update_note).delete(delete_note))
}

async fn list_public(Extension(db): Extension<DB>) -> Result<impl IntoResponse> {
    let notes = handlers::list_public(db).await?;
    Ok(Json(NotesResponse { notes }))
}

async fn get_note(
    Path(share_id): Path<String>,
    MaybeUser(viewer): MaybeUser,
    Extension(db): Extension<DB>,
) -> Result<impl IntoResponse> {
    let note = handlers::get_by_share_id(share_id, viewer.map(|claims| claims.id), db).await?;
    Ok(Json(NoteResponse { note }))
}

async fn user_notes(Path(user_id): Path<UserId>, base: BaseParams) -> Result<impl IntoResponse> {
    let notes = handlers::list_owned(user_id, base).await?;
    Ok(Json(NotesResponse { notes }))
}

async fn public_user_notes(Path(user_id): Path<UserId>, Extension(db): Extension<DB>) -> Result<impl IntoResponse> {
    let notes = handlers::list_public_by(user_id, db).await?;
    Ok(Json(NotesResponse { notes }))
}

async fn search(
    Query(SearchParams { query }): Query<SearchParams>,
    MaybeUser(viewer): MaybeUser,
    Extension(db): Extension<DB>,
) -> Result<impl IntoResponse> {
    let notes = handlers::search(query, viewer.map(|claims| claims.id), db).await?;
    Ok(Json(NotesResponse { notes }))
}

async fn create_note(base: BaseParams, Json(args): Json<CreateNote>) -> Result<impl IntoResponse> {
    let note = handlers::create(args, base).await?;
    Ok((
        StatusCode::CREATED,
        Json(NoteCreatedResponse {
            msg: "Note created successfully".into(),
            note,
        }),
    ))
}

async fn update_note(Path(note_id): Path<i64>, base: BaseParams, Json(args): Json<UpdateNote>) -> Result<impl IntoResponse> {
    let note = handlers::update(note_id, args, base).await?;
    Ok(Json(json!({ "msg": "Note updated successfully", "note": note })))
}

async fn delete_note(Path(note_id): Path<i64>, base: BaseParams) -> Result<impl IntoResponse> {
    handlers::delete(note_id, base).await?;
    Ok(Json(json!({ "msg": "Note deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use crate::{
        db::init_test_db,
        notes::{Note, NoteResponse, NotesResponse, PublicNote},
        tests::{auth_token, auth_user, test_server},
        Result,
    };
    use axum_test::TestServer;
    use serde_json::{json, Value};

    async fn create_note(server: &TestServer, token: &str, title: &str, share_id: &str, status: &str) -> Value {
        let response = server
            .post("/api/notes")
            .authorization_bearer(token)
            .json(&json!({
                "title": title,
                "content": format!("<p>{title}</p>"),
                "shareId": share_id,
                "status": status,
            }))
            .await;

        assert_eq!(response.status_code(), 201);
        response.json::<Value>()
    }

    #[tokio::test]
    async fn share_scenario_end_to_end() -> Result<()> {
        let db = init_test_db().await?;
        let server = test_server(db).await?;

        let response = server
            .post("/api/auth/register")
            .json(&json!({ "username": "alice", "email": "a@x.com", "password": "Passw0rd!" }))
            .await;
        assert_eq!(response.status_code(), 201);

        let response = server
            .post("/api/auth/login")
            .json(&json!({ "email": "a@x.com", "password": "Passw0rd!" }))
            .await;
        assert_eq!(response.status_code(), 200);
        let token = response.json::<Value>()["token"].as_str().unwrap().to_string();

        let created = create_note(&server, &token, "T", "abc123xyz", "public").await;
        let note_id = created["note"]["id"].as_i64().unwrap();

        let response = server.get("/api/notes/abc123xyz").await;
        assert_eq!(response.status_code(), 200);
        assert_eq!(response.json::<NoteResponse>().note.title, "T");

        let response = server
            .delete(&format!("/api/notes/{note_id}"))
            .authorization_bearer(&token)
            .await;
        assert_eq!(response.status_code(), 200);

        let response = server.get("/api/notes/abc123xyz").await;
        assert_eq!(response.status_code(), 404);
        Ok(())
    }

    #[tokio::test]
    async fn create_requires_token_and_fields() -> Result<()> {
        let db = init_test_db().await?;
        let server = test_server(db).await?;

        let response = server
            .post("/api/notes")
            .json(&json!({ "title": "T", "content": "c", "shareId": "s1" }))
            .await;
        assert_eq!(response.status_code(), 401);

        let token = auth_token(&server, "alice", "a@x.com").await;
        let response = server
            .post("/api/notes")
            .authorization_bearer(&token)
            .json(&json!({ "title": "", "content": "c", "shareId": "s1" }))
            .await;
        assert_eq!(response.status_code(), 400);
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_share_id_conflicts() -> Result<()> {
        let db = init_test_db().await?;
        let server = test_server(db).await?;
        let token = auth_token(&server, "alice", "a@x.com").await;

        create_note(&server, &token, "first", "same-id", "public").await;

        let response = server
            .post("/api/notes")
            .authorization_bearer(&token)
            .json(&json!({ "title": "second", "content": "c", "shareId": "same-id" }))
            .await;

        assert_eq!(response.status_code(), 409);
        assert_eq!(response.json::<Value>()["msg"], "Share ID is already taken");
        Ok(())
    }

    #[tokio::test]
    async fn protected_notes_are_owner_only() -> Result<()> {
        let db = init_test_db().await?;
        let server = test_server(db).await?;

        let (alice_id, alice) = auth_user(&server, "alice", "a@x.com").await;
        let bob = auth_token(&server, "bob", "b@x.com").await;

        create_note(&server, &alice, "open", "share-open", "public").await;
        create_note(&server, &alice, "secret", "share-secret", "protected").await;

        // public feed never includes the protected note
        let feed = server.get("/api/notes/data").await.json::<NotesResponse<PublicNote>>();
        assert!(feed.notes.iter().any(|n| n.title == "open"));
        assert!(feed.notes.iter().all(|n| n.title != "secret"));

        // public-by-user path excludes it too
        let response = server.get(&format!("/api/notes/all/public/{alice_id}")).await;
        let notes = response.json::<NotesResponse<Note>>().notes;
        assert!(notes.iter().all(|n| n.title != "secret"));

        // direct fetch: anonymous and other users get 404, the owner gets it
        assert_eq!(server.get("/api/notes/share-secret").await.status_code(), 404);
        assert_eq!(
            server
                .get("/api/notes/share-secret")
                .authorization_bearer(&bob)
                .await
                .status_code(),
            404
        );
        let response = server.get("/api/notes/share-secret").authorization_bearer(&alice).await;
        assert_eq!(response.status_code(), 200);
        assert_eq!(response.json::<NoteResponse>().note.title, "secret");

        // the owner's own listing includes both, and only the owner may call it
        let response = server
            .get(&format!("/api/notes/all/{alice_id}"))
            .authorization_bearer(&alice)
            .await;
        assert_eq!(response.status_code(), 200);
        assert_eq!(response.json::<NotesResponse<Note>>().notes.len(), 2);

        let response = server
            .get(&format!("/api/notes/all/{alice_id}"))
            .authorization_bearer(&bob)
            .await;
        assert_eq!(response.status_code(), 403);
        Ok(())
    }

    #[tokio::test]
    async fn non_owner_update_and_delete_look_like_missing_notes() -> Result<()> {
        let db = init_test_db().await?;
        let server = test_server(db).await?;

        let alice = auth_token(&server, "alice", "a@x.com").await;
        let bob = auth_token(&server, "bob", "b@x.com").await;

        let created = create_note(&server, &alice, "mine", "share-mine", "public").await;
        let note_id = created["note"]["id"].as_i64().unwrap();

        let response = server
            .put(&format!("/api/notes/{note_id}"))
            .authorization_bearer(&bob)
            .json(&json!({ "title": "stolen", "content": "x", "status": "public" }))
            .await;
        assert_eq!(response.status_code(), 404);

        let response = server
            .delete(&format!("/api/notes/{note_id}"))
            .authorization_bearer(&bob)
            .await;
        assert_eq!(response.status_code(), 404);

        // row unchanged
        let response = server.get("/api/notes/share-mine").await;
        assert_eq!(response.status_code(), 200);
        assert_eq!(response.json::<NoteResponse>().note.title, "mine");
        Ok(())
    }

    #[tokio::test]
    async fn owner_update_changes_title_and_status() -> Result<()> {
        let db = init_test_db().await?;
        let server = test_server(db).await?;
        let token = auth_token(&server, "alice", "a@x.com").await;

        let created = create_note(&server, &token, "draft", "share-draft", "public").await;
        let note_id = created["note"]["id"].as_i64().unwrap();

        let response = server
            .put(&format!("/api/notes/{note_id}"))
            .authorization_bearer(&token)
            .json(&json!({ "title": "final", "content": "<p>done</p>", "status": "protected" }))
            .await;
        assert_eq!(response.status_code(), 200);

        // now protected: gone from the anonymous path, visible to the owner
        assert_eq!(server.get("/api/notes/share-draft").await.status_code(), 404);
        let response = server.get("/api/notes/share-draft").authorization_bearer(&token).await;
        assert_eq!(response.json::<NoteResponse>().note.title, "final");
        Ok(())
    }

    #[tokio::test]
    async fn search_by_share_id() -> Result<()> {
        let db = init_test_db().await?;
        let server = test_server(db).await?;
        let token = auth_token(&server, "alice", "a@x.com").await;

        create_note(&server, &token, "findme", "needle", "public").await;

        let response = server.get("/api/notes/search").add_query_param("query", "needle").await;
        assert_eq!(response.status_code(), 200);
        assert_eq!(response.json::<NotesResponse<Note>>().notes[0].title, "findme");

        let response = server.get("/api/notes/search").add_query_param("query", "").await;
        assert_eq!(response.status_code(), 400);

        let response = server.get("/api/notes/search").add_query_param("query", "missing").await;
        assert_eq!(response.status_code(), 404);
        Ok(())
    }

    #[tokio::test]
    async fn public_feed_is_newest_first() -> Result<()> {
        let db = init_test_db().await?;
        let server = test_server(db).await?;
        let token = auth_token(&server, "alice", "a@x.com").await;

        create_note(&server, &token, "older", "share-a", "public").await;
        create_note(&server, &token, "newer", "share-b", "public").await;

        let feed = server.get("/api/notes/data").await.json::<NotesResponse<PublicNote>>();
        assert_eq!(feed.notes[0].title, "newer");
        assert_eq!(feed.notes[1].title, "older");
        Ok(())
    }
}
