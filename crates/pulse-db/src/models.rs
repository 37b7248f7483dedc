//! Database row types — these map directly to SQLite rows.
//! Distinct from pulse-types API models to keep the DB layer independent.

use chrono::{DateTime, Utc};

use pulse_types::models::{ReactionCounts, Role};

pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: String,
}

pub struct IdeaRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub author_name: Option<String>,
    pub created_at: String,
    pub upvote_count: i64,
    pub score: i64,
}

pub struct CommentRow {
    pub id: i64,
    pub idea_id: i64,
    pub author_name: Option<String>,
    pub content: String,
    pub created_at: String,
}

/// Result of a vote toggle: the idea's aggregates as committed, plus whether
/// the caller's vote now exists.
pub struct VoteOutcome {
    pub voted: bool,
    pub score: i64,
    pub upvote_count: i64,
}

/// Which transition a reaction toggle took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionChange {
    Added,
    Removed,
    Changed,
}

pub struct ReactionOutcome {
    pub change: ReactionChange,
    pub counts: ReactionCounts,
}

/// Parse a stored timestamp. SQLite's `datetime('now')` produces
/// "YYYY-MM-DD HH:MM:SS" without a timezone; RFC 3339 is tried first so
/// externally written rows still parse.
pub fn parse_sqlite_ts(raw: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::warn!("Corrupt timestamp '{}': {}", raw, e);
            DateTime::default()
        })
}
