use serde::{Deserialize, Serialize};

use crate::models::IdeaSummary;

/// Events pushed from the server to gateway clients.
///
/// `new_comment` and `vote_update` are scoped to the idea's room; clients only
/// see them while joined. `idea_created` goes to every live connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum GatewayEvent {
    NewComment {
        id: i64,
        content: String,
        author_name: Option<String>,
        idea_id: i64,
        created_at: chrono::DateTime<chrono::Utc>,
    },
    VoteUpdate {
        idea_id: i64,
        score: i64,
        upvote_count: i64,
    },
    IdeaCreated(IdeaSummary),
}

/// Commands sent FROM client TO server over the gateway.
///
/// Room membership is the only client-driven state; everything else arrives
/// through the HTTP API and fans out as [`GatewayEvent`]s.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ClientCommand {
    /// Join the room for an idea the client is viewing.
    JoinIdea(i64),
    /// Leave an idea's room.
    LeaveIdea(i64),
}
