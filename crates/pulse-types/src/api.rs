use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// -- Auth --

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    /// Defaults to the email local part when omitted.
    pub name: Option<String>,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserPublic {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserPublic,
}

// -- Ideas --

#[derive(Debug, Deserialize)]
pub struct CreateIdeaRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    /// Signed vote value, only consulted when creating a vote; a second
    /// request from the same user removes the existing vote regardless.
    #[serde(default = "default_vote")]
    pub vote: i64,
}

fn default_vote() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct ReactRequest {
    /// Reaction kind name; missing or unknown values coerce to LIKE.
    #[serde(default)]
    pub reaction: Option<String>,
}

// -- Comments --

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: i64,
    pub content: String,
    pub author_name: Option<String>,
    pub idea_id: i64,
    pub created_at: DateTime<Utc>,
}
