use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State, WebSocketUpgrade},
    http::HeaderMap,
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use pulse_api::auth::{self, AppState, AppStateInner};
use pulse_api::{comments, identity, ideas};
use pulse_gateway::connection::{self, ConnectionIdentity};
use pulse_gateway::dispatcher::Dispatcher;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pulse=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let db_path = std::env::var("PULSE_DB_PATH").unwrap_or_else(|_| "pulse.db".into());
    let host = std::env::var("PULSE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("PULSE_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    // Init database
    let db = pulse_db::Database::open(&PathBuf::from(&db_path))?;

    // Shared state
    let dispatcher = Dispatcher::new();
    let state: AppState = Arc::new(AppStateInner { db, dispatcher });

    // Routes
    let app = Router::new()
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/signin", post(auth::signin))
        .route("/api/ideas", get(ideas::list_ideas))
        .route("/api/ideas", post(ideas::create_idea))
        .route("/api/ideas/{id}/vote", post(ideas::vote))
        .route("/api/ideas/{id}/react", post(ideas::react))
        .route("/api/ideas/{id}/comments", get(comments::list_comments))
        .route("/api/ideas/{id}/comments", post(comments::create_comment))
        .route(
            "/api/ideas/{id}/comments/{comment_id}",
            delete(comments::delete_comment),
        )
        .route("/socket", get(ws_upgrade))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Pulse server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(Debug, Deserialize)]
struct SocketQuery {
    token: Option<String>,
}

/// Upgrade to the real-time channel. The credential comes from the `token`
/// query parameter or the Authorization header; either way it is resolved
/// once, and a missing or invalid credential means an anonymous connection,
/// not a rejection.
async fn ws_upgrade(
    State(state): State<AppState>,
    Query(query): Query<SocketQuery>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let token = query.token.or_else(|| identity::bearer_token(&headers));

    let st = state.clone();
    let resolved = tokio::task::spawn_blocking(move || {
        token
            .as_deref()
            .and_then(|t| identity::resolve(&st.db, t))
            .map(|user| ConnectionIdentity {
                user_id: user.id,
                name: user.name,
            })
    })
    .await
    .unwrap_or_else(|e| {
        error!("spawn_blocking join error: {}", e);
        None
    });

    ws.on_upgrade(move |socket| {
        connection::handle_connection(socket, state.dispatcher.clone(), resolved)
    })
}
