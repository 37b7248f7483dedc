use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User role. Stored as its uppercase name in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Admin,
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
            Role::SuperAdmin => "SUPER_ADMIN",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "USER" => Some(Role::User),
            "ADMIN" => Some(Role::Admin),
            "SUPER_ADMIN" => Some(Role::SuperAdmin),
            _ => None,
        }
    }
}

/// The fixed set of idea reactions. At most one per (idea, user); resubmitting
/// the same kind toggles it off, a different kind replaces it in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReactionKind {
    Like,
    Love,
    Haha,
    Wow,
    Sad,
    Angry,
}

impl ReactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionKind::Like => "LIKE",
            ReactionKind::Love => "LOVE",
            ReactionKind::Haha => "HAHA",
            ReactionKind::Wow => "WOW",
            ReactionKind::Sad => "SAD",
            ReactionKind::Angry => "ANGRY",
        }
    }

    pub fn parse(s: &str) -> Option<ReactionKind> {
        match s.to_ascii_uppercase().as_str() {
            "LIKE" => Some(ReactionKind::Like),
            "LOVE" => Some(ReactionKind::Love),
            "HAHA" => Some(ReactionKind::Haha),
            "WOW" => Some(ReactionKind::Wow),
            "SAD" => Some(ReactionKind::Sad),
            "ANGRY" => Some(ReactionKind::Angry),
            _ => None,
        }
    }

    /// Unrecognized reaction strings coerce to LIKE rather than rejecting.
    pub fn parse_or_default(s: &str) -> ReactionKind {
        Self::parse(s).unwrap_or(ReactionKind::Like)
    }
}

/// Per-kind reaction tally for one idea. Kinds with zero occurrences are
/// omitted, not zero-filled.
pub type ReactionCounts = BTreeMap<String, i64>;

/// Full idea summary as returned by the ideas listing and carried in the
/// `idea_created` broadcast. `voted_by_you` / `user_reaction` are only
/// populated when the caller is authenticated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdeaSummary {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub score: i64,
    pub upvote_count: i64,
    pub created_at: DateTime<Utc>,
    pub author_name: Option<String>,
    pub reaction_counts: ReactionCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voted_by_you: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_reaction: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reaction_kind_round_trips_names() {
        for kind in [
            ReactionKind::Like,
            ReactionKind::Love,
            ReactionKind::Haha,
            ReactionKind::Wow,
            ReactionKind::Sad,
            ReactionKind::Angry,
        ] {
            assert_eq!(ReactionKind::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn role_names_round_trip() {
        for role in [Role::User, Role::Admin, Role::SuperAdmin] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("user"), None);
    }

    #[test]
    fn unknown_reaction_coerces_to_like() {
        assert_eq!(ReactionKind::parse_or_default("THUMBS"), ReactionKind::Like);
        assert_eq!(ReactionKind::parse_or_default("love"), ReactionKind::Love);
    }
}
