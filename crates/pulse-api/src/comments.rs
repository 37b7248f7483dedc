use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde_json::json;
use tracing::error;

use pulse_db::models::{CommentRow, parse_sqlite_ts};
use pulse_gateway::dispatcher::idea_room;
use pulse_types::api::{CommentResponse, CreateCommentRequest};
use pulse_types::events::GatewayEvent;

use crate::auth::AppState;
use crate::{identity, store_status};

pub async fn list_comments(
    State(state): State<AppState>,
    Path(idea_id): Path<i64>,
) -> Result<impl IntoResponse, StatusCode> {
    let st = state.clone();
    let comments = tokio::task::spawn_blocking(move || {
        if !st.db.idea_exists(idea_id).map_err(store_status)? {
            return Err(StatusCode::NOT_FOUND);
        }
        let rows = st.db.comments_by_idea(idea_id).map_err(store_status)?;
        Ok::<_, StatusCode>(rows.into_iter().map(to_response).collect::<Vec<_>>())
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })??;

    Ok(Json(json!({ "data": comments })))
}

/// Persist a comment, then push `new_comment` to the idea's room. Blank
/// content is rejected before anything is stored, so no event is ever
/// observed for it.
pub async fn create_comment(
    State(state): State<AppState>,
    Path(idea_id): Path<i64>,
    headers: HeaderMap,
    Json(req): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let token = identity::bearer_token(&headers);

    let st = state.clone();
    let comment = tokio::task::spawn_blocking(move || {
        let user = token
            .as_deref()
            .and_then(|t| identity::resolve(&st.db, t))
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let content = req.content.trim();
        if content.is_empty() {
            return Err(StatusCode::BAD_REQUEST);
        }

        let row = st
            .db
            .insert_comment(idea_id, user.id, content)
            .map_err(store_status)?;
        Ok::<_, StatusCode>(to_response(row))
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })??;

    state
        .dispatcher
        .publish(
            &idea_room(idea_id),
            GatewayEvent::NewComment {
                id: comment.id,
                content: comment.content.clone(),
                author_name: comment.author_name.clone(),
                idea_id: comment.idea_id,
                created_at: comment.created_at,
            },
        )
        .await;

    Ok(Json(json!({ "data": comment })))
}

/// Stated but intentionally unimplemented capability: the caller is
/// authenticated and acknowledged, yet nothing is deleted. Ownership
/// semantics are pending product clarification.
pub async fn delete_comment(
    State(state): State<AppState>,
    Path((_idea_id, _comment_id)): Path<(i64, i64)>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, StatusCode> {
    let token = identity::bearer_token(&headers);

    let st = state.clone();
    tokio::task::spawn_blocking(move || {
        token
            .as_deref()
            .and_then(|t| identity::resolve(&st.db, t))
            .ok_or(StatusCode::UNAUTHORIZED)
            .map(|_| ())
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })??;

    Ok(Json(json!({ "data": "deleted" })))
}

fn to_response(row: CommentRow) -> CommentResponse {
    CommentResponse {
        id: row.id,
        content: row.content,
        author_name: row.author_name,
        idea_id: row.idea_id,
        created_at: parse_sqlite_ts(&row.created_at),
    }
}
