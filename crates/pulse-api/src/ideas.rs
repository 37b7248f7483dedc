use std::collections::{HashMap, HashSet};

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde_json::json;
use tracing::error;

use pulse_db::models::{IdeaRow, ReactionChange, parse_sqlite_ts};
use pulse_gateway::dispatcher::idea_room;
use pulse_types::api::{CreateIdeaRequest, ReactRequest, VoteRequest};
use pulse_types::events::GatewayEvent;
use pulse_types::models::{IdeaSummary, ReactionCounts, ReactionKind};

use crate::auth::AppState;
use crate::{identity, store_status};

/// List all ideas with aggregates and reaction tallies. When the caller is
/// authenticated the summaries also carry their own vote/reaction status.
pub async fn list_ideas(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, StatusCode> {
    let token = identity::bearer_token(&headers);

    let st = state.clone();
    let summaries = tokio::task::spawn_blocking(move || {
        let viewer = token.as_deref().and_then(|t| identity::resolve(&st.db, t));

        let rows = st.db.list_ideas().map_err(store_status)?;
        let tallies = st.db.reaction_counts_all().map_err(store_status)?;

        let mut counts_by_idea: HashMap<i64, ReactionCounts> = HashMap::new();
        for (idea_id, kind, count) in tallies {
            counts_by_idea.entry(idea_id).or_default().insert(kind, count);
        }

        let (voted, own_reactions) = match &viewer {
            Some(user) => {
                let voted: HashSet<i64> = st
                    .db
                    .voted_idea_ids(user.id)
                    .map_err(store_status)?
                    .into_iter()
                    .collect();
                let own: HashMap<i64, String> = st
                    .db
                    .user_reactions(user.id)
                    .map_err(store_status)?
                    .into_iter()
                    .collect();
                (Some(voted), own)
            }
            None => (None, HashMap::new()),
        };

        let summaries: Vec<IdeaSummary> = rows
            .into_iter()
            .map(|row| {
                let counts = counts_by_idea.remove(&row.id).unwrap_or_default();
                let voted_by_you = voted.as_ref().map(|v| v.contains(&row.id));
                let user_reaction = own_reactions.get(&row.id).cloned();
                summarize(row, counts, voted_by_you, user_reaction)
            })
            .collect();

        Ok::<_, StatusCode>(summaries)
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })??;

    Ok(Json(json!({ "data": summaries })))
}

pub async fn create_idea(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateIdeaRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let token = identity::bearer_token(&headers);

    let st = state.clone();
    let summary = tokio::task::spawn_blocking(move || {
        let user = token
            .as_deref()
            .and_then(|t| identity::resolve(&st.db, t))
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let title = req.title.trim();
        if title.is_empty() {
            return Err(StatusCode::BAD_REQUEST);
        }

        let row = st
            .db
            .create_idea(title, &req.description, user.id)
            .map_err(store_status)?;

        Ok::<_, StatusCode>(summarize(row, ReactionCounts::new(), None, None))
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })??;

    // Real-time push is best-effort enhancement; the idea is already durable
    state
        .dispatcher
        .broadcast_all(GatewayEvent::IdeaCreated(summary.clone()))
        .await;

    Ok(Json(json!({ "data": summary })))
}

/// Pure vote toggle: first request creates the vote, a second identical
/// request removes it. The committed aggregates fan out to the idea's room.
pub async fn vote(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(req): Json<VoteRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let token = identity::bearer_token(&headers);

    let st = state.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let user = token
            .as_deref()
            .and_then(|t| identity::resolve(&st.db, t))
            .ok_or(StatusCode::UNAUTHORIZED)?;

        st.db.toggle_vote(id, user.id, req.vote).map_err(store_status)
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })??;

    state
        .dispatcher
        .publish(
            &idea_room(id),
            GatewayEvent::VoteUpdate {
                idea_id: id,
                score: outcome.score,
                upvote_count: outcome.upvote_count,
            },
        )
        .await;

    Ok(Json(json!({ "stats": { "score": outcome.score } })))
}

/// Reaction toggle: absent -> added, same kind -> removed, different kind ->
/// updated in place. Unknown kind names coerce to LIKE.
pub async fn react(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(req): Json<ReactRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let token = identity::bearer_token(&headers);
    let kind = ReactionKind::parse_or_default(req.reaction.as_deref().unwrap_or("LIKE"));

    let st = state.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let user = token
            .as_deref()
            .and_then(|t| identity::resolve(&st.db, t))
            .ok_or(StatusCode::UNAUTHORIZED)?;

        st.db.toggle_reaction(id, user.id, kind).map_err(store_status)
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })??;

    let body = match outcome.change {
        ReactionChange::Added => json!({ "added": true, "reaction_counts": outcome.counts }),
        ReactionChange::Removed => json!({ "removed": true, "reaction_counts": outcome.counts }),
        ReactionChange::Changed => json!({ "updated": true, "reaction_counts": outcome.counts }),
    };
    Ok(Json(body))
}

fn summarize(
    row: IdeaRow,
    reaction_counts: ReactionCounts,
    voted_by_you: Option<bool>,
    user_reaction: Option<String>,
) -> IdeaSummary {
    IdeaSummary {
        id: row.id,
        title: row.title,
        description: row.description,
        score: row.score,
        upvote_count: row.upvote_count,
        created_at: parse_sqlite_ts(&row.created_at),
        author_name: row.author_name,
        reaction_counts,
        voted_by_you,
        user_reaction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    use crate::auth::{AppState, signup};
    use crate::testutil::{body_json, test_state};
    use pulse_types::api::{AuthResponse, SignupRequest};

    async fn signed_up(state: &AppState, email: &str) -> AuthResponse {
        let resp = signup(
            State(state.clone()),
            Json(SignupRequest {
                email: email.into(),
                name: None,
                password: "hunter22".into(),
            }),
        )
        .await
        .unwrap()
        .into_response();
        body_json(resp).await
    }

    fn auth_headers(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn vote_requires_authentication() {
        let state = test_state();
        let err = vote(
            State(state),
            Path(1),
            HeaderMap::new(),
            Json(VoteRequest { vote: 1 }),
        )
        .await
        .err()
        .unwrap();
        assert_eq!(err, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn vote_toggle_publishes_updates_to_room() {
        let state = test_state();
        let user = signed_up(&state, "a@example.com").await;
        let idea = state.db.create_idea("Night bus", "", user.user.id).unwrap();

        // An unauthenticated viewer joined to the idea's room
        let (conn, mut rx) = state.dispatcher.register(None).await;
        state.dispatcher.join(conn, idea.id).await;

        let resp = vote(
            State(state.clone()),
            Path(idea.id),
            auth_headers(&user.token),
            Json(VoteRequest { vote: 1 }),
        )
        .await
        .unwrap()
        .into_response();
        let body: serde_json::Value = body_json(resp).await;
        assert_eq!(body["stats"]["score"], 1);

        match rx.try_recv().unwrap() {
            GatewayEvent::VoteUpdate {
                idea_id,
                score,
                upvote_count,
            } => {
                assert_eq!(idea_id, idea.id);
                assert_eq!(score, 1);
                assert_eq!(upvote_count, 1);
            }
            other => panic!("expected vote_update, got {other:?}"),
        }

        // Second identical request removes the vote
        let resp = vote(
            State(state.clone()),
            Path(idea.id),
            auth_headers(&user.token),
            Json(VoteRequest { vote: 1 }),
        )
        .await
        .unwrap()
        .into_response();
        let body: serde_json::Value = body_json(resp).await;
        assert_eq!(body["stats"]["score"], 0);

        match rx.try_recv().unwrap() {
            GatewayEvent::VoteUpdate {
                score,
                upvote_count,
                ..
            } => {
                assert_eq!(score, 0);
                assert_eq!(upvote_count, 0);
            }
            other => panic!("expected vote_update, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn vote_on_unknown_idea_is_404() {
        let state = test_state();
        let user = signed_up(&state, "a@example.com").await;
        let err = vote(
            State(state),
            Path(999),
            auth_headers(&user.token),
            Json(VoteRequest { vote: 1 }),
        )
        .await
        .err()
        .unwrap();
        assert_eq!(err, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn react_coerces_unknown_kind_to_like() {
        let state = test_state();
        let user = signed_up(&state, "a@example.com").await;
        let idea = state.db.create_idea("Night bus", "", user.user.id).unwrap();

        let resp = react(
            State(state.clone()),
            Path(idea.id),
            auth_headers(&user.token),
            Json(ReactRequest {
                reaction: Some("THUMBS_UP".into()),
            }),
        )
        .await
        .unwrap()
        .into_response();
        let body: serde_json::Value = body_json(resp).await;
        assert_eq!(body["added"], true);
        assert_eq!(body["reaction_counts"]["LIKE"], 1);
    }

    #[tokio::test]
    async fn idea_created_broadcasts_to_all_connections() {
        let state = test_state();
        let user = signed_up(&state, "a@example.com").await;
        let (_conn, mut rx) = state.dispatcher.register(None).await;

        let resp = create_idea(
            State(state.clone()),
            auth_headers(&user.token),
            Json(CreateIdeaRequest {
                title: "  Shade sails over the quad  ".into(),
                description: "It gets hot".into(),
            }),
        )
        .await
        .unwrap()
        .into_response();
        let body: serde_json::Value = body_json(resp).await;
        assert_eq!(body["data"]["title"], "Shade sails over the quad");
        assert_eq!(body["data"]["author_name"], "a");

        assert!(matches!(
            rx.try_recv().unwrap(),
            GatewayEvent::IdeaCreated(_)
        ));
    }

    #[tokio::test]
    async fn listing_reflects_viewer_state() {
        let state = test_state();
        let user = signed_up(&state, "a@example.com").await;
        let idea = state.db.create_idea("Night bus", "", user.user.id).unwrap();
        state.db.toggle_vote(idea.id, user.user.id, 1).unwrap();
        state
            .db
            .toggle_reaction(idea.id, user.user.id, ReactionKind::Wow)
            .unwrap();

        let resp = list_ideas(State(state.clone()), auth_headers(&user.token))
            .await
            .unwrap()
            .into_response();
        let body: serde_json::Value = body_json(resp).await;
        let entry = &body["data"][0];
        assert_eq!(entry["voted_by_you"], true);
        assert_eq!(entry["user_reaction"], "WOW");
        assert_eq!(entry["reaction_counts"]["WOW"], 1);
        assert_eq!(entry["score"], 1);

        // Anonymous listing omits the viewer fields
        let resp = list_ideas(State(state), HeaderMap::new())
            .await
            .unwrap()
            .into_response();
        let body: serde_json::Value = body_json(resp).await;
        assert!(body["data"][0].get("voted_by_you").is_none());
    }
}
