use rusqlite::{Connection, OptionalExtension, Transaction, params};

use pulse_types::models::{ReactionCounts, ReactionKind, Role};

use crate::models::{
    CommentRow, IdeaRow, ReactionChange, ReactionOutcome, UserRow, VoteOutcome,
};
use crate::error::is_unique_violation;
use crate::{Database, Result, StoreError};

impl Database {
    // -- Users --

    pub fn create_user(&self, email: &str, name: &str, password_hash: &str) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (email, name, password_hash) VALUES (?1, ?2, ?3)",
                params![email, name, password_hash],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            query_user(
                conn,
                "SELECT id, email, name, password_hash, role, created_at
                 FROM users WHERE email = ?1",
                email,
            )
        })
    }

    // -- Auth tokens --

    /// Store an opaque session token for a user. Tokens never expire; many
    /// may exist per user (one per device).
    pub fn insert_token(&self, token: &str, user_id: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO auth_tokens (token, user_id) VALUES (?1, ?2)",
                params![token, user_id],
            )?;
            Ok(())
        })
    }

    /// Exact-match token lookup. Unknown tokens are `None`, never an error.
    pub fn user_by_token(&self, token: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT u.id, u.email, u.name, u.password_hash, u.role, u.created_at
                 FROM auth_tokens t
                 JOIN users u ON u.id = t.user_id
                 WHERE t.token = ?1",
            )?;
            Ok(stmt.query_row([token], map_user).optional()?)
        })
    }

    /// Admin purge: drop every session the user holds.
    pub fn delete_tokens_for_user(&self, user_id: i64) -> Result<usize> {
        self.with_conn(|conn| {
            Ok(conn.execute("DELETE FROM auth_tokens WHERE user_id = ?1", [user_id])?)
        })
    }

    // -- Ideas --

    pub fn create_idea(&self, title: &str, description: &str, author_id: i64) -> Result<IdeaRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO ideas (title, description, author_id) VALUES (?1, ?2, ?3)",
                params![title, description, author_id],
            )?;
            let id = conn.last_insert_rowid();
            query_idea(conn, id)?.ok_or(StoreError::NotFound)
        })
    }

    pub fn idea_exists(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| idea_exists(conn, id))
    }

    pub fn list_ideas(&self) -> Result<Vec<IdeaRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT i.id, i.title, i.description, u.name, i.created_at,
                        i.upvote_count, i.score
                 FROM ideas i
                 LEFT JOIN users u ON i.author_id = u.id
                 ORDER BY i.id DESC",
            )?;
            let rows = stmt
                .query_map([], map_idea)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn idea_by_id(&self, id: i64) -> Result<Option<IdeaRow>> {
        self.with_conn(|conn| query_idea(conn, id))
    }

    // -- Votes --

    /// Pure vote toggle for one (idea, user) pair, run as a single
    /// transaction so the aggregate counters and the vote set can never
    /// drift apart. The incoming value only matters when creating a vote;
    /// removal always subtracts the value the stored vote was created with.
    pub fn toggle_vote(&self, idea_id: i64, user_id: i64, value: i64) -> Result<VoteOutcome> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            if !idea_exists(&tx, idea_id)? {
                return Err(StoreError::NotFound);
            }

            let existing: Option<(i64, i64)> = tx
                .query_row(
                    "SELECT id, value FROM votes WHERE idea_id = ?1 AND user_id = ?2",
                    params![idea_id, user_id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;

            let voted = match existing {
                Some((vote_id, prev_value)) => {
                    remove_vote(&tx, idea_id, vote_id, prev_value)?;
                    false
                }
                None => {
                    let inserted = tx.execute(
                        "INSERT INTO votes (idea_id, user_id, value) VALUES (?1, ?2, ?3)",
                        params![idea_id, user_id, value],
                    );
                    match inserted {
                        Ok(_) => {
                            tx.execute(
                                "UPDATE ideas
                                 SET upvote_count = upvote_count + 1, score = score + ?2
                                 WHERE id = ?1",
                                params![idea_id, value],
                            )?;
                            true
                        }
                        // Lost the insert race: the row exists now, so the
                        // request resolves as a removal.
                        Err(e) if is_unique_violation(&e) => {
                            let (vote_id, prev_value): (i64, i64) = tx.query_row(
                                "SELECT id, value FROM votes WHERE idea_id = ?1 AND user_id = ?2",
                                params![idea_id, user_id],
                                |row| Ok((row.get(0)?, row.get(1)?)),
                            )?;
                            remove_vote(&tx, idea_id, vote_id, prev_value)?;
                            false
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
            };

            let (score, upvote_count) = tx.query_row(
                "SELECT score, upvote_count FROM ideas WHERE id = ?1",
                [idea_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;

            tx.commit()?;
            Ok(VoteOutcome {
                voted,
                score,
                upvote_count,
            })
        })
    }

    /// Ideas the user currently has an active vote on.
    pub fn voted_idea_ids(&self, user_id: i64) -> Result<Vec<i64>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT idea_id FROM votes WHERE user_id = ?1")?;
            let ids = stmt
                .query_map([user_id], |row| row.get(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(ids)
        })
    }

    // -- Reactions --

    /// Reaction toggle for one (idea, user) pair: absent -> created, same
    /// kind -> removed, different kind -> updated in place. No idea
    /// aggregate is touched.
    pub fn toggle_reaction(
        &self,
        idea_id: i64,
        user_id: i64,
        kind: ReactionKind,
    ) -> Result<ReactionOutcome> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            if !idea_exists(&tx, idea_id)? {
                return Err(StoreError::NotFound);
            }

            let existing: Option<(i64, String)> = tx
                .query_row(
                    "SELECT id, kind FROM reactions WHERE idea_id = ?1 AND user_id = ?2",
                    params![idea_id, user_id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;

            let change = match existing {
                Some((reaction_id, old_kind)) => {
                    resolve_existing_reaction(&tx, reaction_id, &old_kind, kind)?
                }
                None => {
                    let inserted = tx.execute(
                        "INSERT INTO reactions (idea_id, user_id, kind) VALUES (?1, ?2, ?3)",
                        params![idea_id, user_id, kind.as_str()],
                    );
                    match inserted {
                        Ok(_) => ReactionChange::Added,
                        Err(e) if is_unique_violation(&e) => {
                            let (reaction_id, old_kind): (i64, String) = tx.query_row(
                                "SELECT id, kind FROM reactions
                                 WHERE idea_id = ?1 AND user_id = ?2",
                                params![idea_id, user_id],
                                |row| Ok((row.get(0)?, row.get(1)?)),
                            )?;
                            resolve_existing_reaction(&tx, reaction_id, &old_kind, kind)?
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
            };

            let counts = reaction_counts_inner(&tx, idea_id)?;
            tx.commit()?;
            Ok(ReactionOutcome { change, counts })
        })
    }

    /// Per-kind reaction tally for one idea; zero-count kinds are omitted.
    pub fn reaction_counts(&self, idea_id: i64) -> Result<ReactionCounts> {
        self.with_conn(|conn| reaction_counts_inner(conn, idea_id))
    }

    /// Batch tally for the ideas listing: (idea_id, kind, count) tuples.
    pub fn reaction_counts_all(&self) -> Result<Vec<(i64, String, i64)>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT idea_id, kind, COUNT(*) FROM reactions GROUP BY idea_id, kind",
            )?;
            let rows = stmt
                .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// The user's own reactions: (idea_id, kind) pairs.
    pub fn user_reactions(&self, user_id: i64) -> Result<Vec<(i64, String)>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT idea_id, kind FROM reactions WHERE user_id = ?1")?;
            let rows = stmt
                .query_map([user_id], |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Comments --

    pub fn insert_comment(&self, idea_id: i64, user_id: i64, content: &str) -> Result<CommentRow> {
        self.with_conn(|conn| {
            if !idea_exists(conn, idea_id)? {
                return Err(StoreError::NotFound);
            }
            conn.execute(
                "INSERT INTO comments (idea_id, user_id, content) VALUES (?1, ?2, ?3)",
                params![idea_id, user_id, content],
            )?;
            let id = conn.last_insert_rowid();
            let mut stmt = conn.prepare(
                "SELECT c.id, c.idea_id, u.name, c.content, c.created_at
                 FROM comments c
                 LEFT JOIN users u ON c.user_id = u.id
                 WHERE c.id = ?1",
            )?;
            Ok(stmt.query_row([id], map_comment)?)
        })
    }

    /// Comments for one idea, creation time ascending (insertion order as
    /// the tiebreak within a second).
    pub fn comments_by_idea(&self, idea_id: i64) -> Result<Vec<CommentRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT c.id, c.idea_id, u.name, c.content, c.created_at
                 FROM comments c
                 LEFT JOIN users u ON c.user_id = u.id
                 WHERE c.idea_id = ?1
                 ORDER BY c.created_at ASC, c.id ASC",
            )?;
            let rows = stmt
                .query_map([idea_id], map_comment)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn remove_vote(tx: &Transaction, idea_id: i64, vote_id: i64, prev_value: i64) -> Result<()> {
    tx.execute("DELETE FROM votes WHERE id = ?1", [vote_id])?;
    // The transaction is the sole writer of the aggregates; the MAX(0, ..)
    // clamp mirrors the documented floor on decrement.
    tx.execute(
        "UPDATE ideas
         SET upvote_count = MAX(0, upvote_count - 1), score = MAX(0, score - ?2)
         WHERE id = ?1",
        params![idea_id, prev_value],
    )?;
    Ok(())
}

fn resolve_existing_reaction(
    tx: &Transaction,
    reaction_id: i64,
    old_kind: &str,
    new_kind: ReactionKind,
) -> Result<ReactionChange> {
    if old_kind == new_kind.as_str() {
        tx.execute("DELETE FROM reactions WHERE id = ?1", [reaction_id])?;
        Ok(ReactionChange::Removed)
    } else {
        tx.execute(
            "UPDATE reactions SET kind = ?2 WHERE id = ?1",
            params![reaction_id, new_kind.as_str()],
        )?;
        Ok(ReactionChange::Changed)
    }
}

fn idea_exists(conn: &Connection, idea_id: i64) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row("SELECT id FROM ideas WHERE id = ?1", [idea_id], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(found.is_some())
}

fn reaction_counts_inner(conn: &Connection, idea_id: i64) -> Result<ReactionCounts> {
    let mut stmt =
        conn.prepare("SELECT kind, COUNT(*) FROM reactions WHERE idea_id = ?1 GROUP BY kind")?;
    let mut counts = ReactionCounts::new();
    let rows = stmt.query_map([idea_id], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
    })?;
    for row in rows {
        let (kind, count) = row?;
        counts.insert(kind, count);
    }
    Ok(counts)
}

fn query_user(conn: &Connection, sql: &str, param: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(sql)?;
    Ok(stmt.query_row([param], map_user).optional()?)
}

fn query_idea(conn: &Connection, id: i64) -> Result<Option<IdeaRow>> {
    let mut stmt = conn.prepare(
        "SELECT i.id, i.title, i.description, u.name, i.created_at,
                i.upvote_count, i.score
         FROM ideas i
         LEFT JOIN users u ON i.author_id = u.id
         WHERE i.id = ?1",
    )?;
    Ok(stmt.query_row([id], map_idea).optional()?)
}

fn map_user(row: &rusqlite::Row) -> rusqlite::Result<UserRow> {
    // Unknown role names degrade to the least-privileged role
    let role: String = row.get(4)?;
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        password_hash: row.get(3)?,
        role: Role::parse(&role).unwrap_or(Role::User),
        created_at: row.get(5)?,
    })
}

fn map_idea(row: &rusqlite::Row) -> rusqlite::Result<IdeaRow> {
    Ok(IdeaRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        author_name: row.get(3)?,
        created_at: row.get(4)?,
        upvote_count: row.get(5)?,
        score: row.get(6)?,
    })
}

fn map_comment(row: &rusqlite::Row) -> rusqlite::Result<CommentRow> {
    Ok(CommentRow {
        id: row.get(0)?,
        idea_id: row.get(1)?,
        author_name: row.get(2)?,
        content: row.get(3)?,
        created_at: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn test_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn seed_user(db: &Database, email: &str) -> i64 {
        db.create_user(email, email.split('@').next().unwrap(), "hash")
            .unwrap()
    }

    fn seed_idea(db: &Database, author: i64) -> i64 {
        db.create_idea("More water fountains", "", author).unwrap().id
    }

    /// Recompute the aggregates from the vote rows and compare against the
    /// stored counters.
    fn assert_aggregates_consistent(db: &Database, idea_id: i64) {
        let (count, sum, stored_count, stored_score) = db
            .with_conn(|conn| {
                let (count, sum): (i64, i64) = conn.query_row(
                    "SELECT COUNT(*), COALESCE(SUM(value), 0) FROM votes WHERE idea_id = ?1",
                    [idea_id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )?;
                let (stored_count, stored_score): (i64, i64) = conn.query_row(
                    "SELECT upvote_count, score FROM ideas WHERE id = ?1",
                    [idea_id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )?;
                Ok((count, sum, stored_count, stored_score))
            })
            .unwrap();
        assert_eq!(stored_count, count, "upvote_count drifted from vote rows");
        assert_eq!(stored_score, sum, "score drifted from vote values");
    }

    #[test]
    fn vote_toggle_on_then_off() {
        let db = test_db();
        let user = seed_user(&db, "a@example.com");
        let idea = seed_idea(&db, user);

        let on = db.toggle_vote(idea, user, 1).unwrap();
        assert!(on.voted);
        assert_eq!(on.score, 1);
        assert_eq!(on.upvote_count, 1);

        let off = db.toggle_vote(idea, user, 1).unwrap();
        assert!(!off.voted);
        assert_eq!(off.score, 0);
        assert_eq!(off.upvote_count, 0);

        // Third identical call toggles back on
        let on_again = db.toggle_vote(idea, user, 1).unwrap();
        assert!(on_again.voted);
        assert_eq!(on_again.upvote_count, 1);
        assert_aggregates_consistent(&db, idea);
    }

    #[test]
    fn vote_value_ignored_on_removal() {
        let db = test_db();
        let user = seed_user(&db, "a@example.com");
        let idea = seed_idea(&db, user);

        db.toggle_vote(idea, user, 3).unwrap();
        // Removal subtracts the stored value, not the incoming one
        let off = db.toggle_vote(idea, user, 7).unwrap();
        assert!(!off.voted);
        assert_eq!(off.score, 0);
        assert_aggregates_consistent(&db, idea);
    }

    #[test]
    fn vote_unknown_idea_is_not_found() {
        let db = test_db();
        let user = seed_user(&db, "a@example.com");
        assert!(matches!(
            db.toggle_vote(999, user, 1),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn at_most_one_vote_per_pair() {
        let db = test_db();
        let user = seed_user(&db, "a@example.com");
        let idea = seed_idea(&db, user);

        db.toggle_vote(idea, user, 1).unwrap();
        let err = db
            .with_conn(|conn| {
                conn.execute(
                    "INSERT INTO votes (idea_id, user_id, value) VALUES (?1, ?2, 1)",
                    params![idea, user],
                )?;
                Ok(())
            })
            .unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[test]
    fn cross_user_votes_accumulate() {
        let db = test_db();
        let author = seed_user(&db, "author@example.com");
        let idea = seed_idea(&db, author);

        for i in 0..5 {
            let user = seed_user(&db, &format!("voter{i}@example.com"));
            db.toggle_vote(idea, user, 1).unwrap();
        }

        let row = db.idea_by_id(idea).unwrap().unwrap();
        assert_eq!(row.upvote_count, 5);
        assert_eq!(row.score, 5);
        assert_aggregates_consistent(&db, idea);
    }

    #[test]
    fn concurrent_votes_keep_counters_exact() {
        let db = Arc::new(test_db());
        let author = seed_user(&db, "author@example.com");
        let idea = seed_idea(&db, author);

        let users: Vec<i64> = (0..8)
            .map(|i| seed_user(&db, &format!("u{i}@example.com")))
            .collect();

        let handles: Vec<_> = users
            .into_iter()
            .map(|user| {
                let db = db.clone();
                std::thread::spawn(move || {
                    // Toggle three times: net effect is one active vote
                    for _ in 0..3 {
                        db.toggle_vote(idea, user, 1).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let row = db.idea_by_id(idea).unwrap().unwrap();
        assert_eq!(row.upvote_count, 8);
        assert_eq!(row.score, 8);
        assert_aggregates_consistent(&db, idea);
    }

    #[test]
    fn same_user_racing_converges_to_valid_state() {
        let db = Arc::new(test_db());
        let author = seed_user(&db, "author@example.com");
        let idea = seed_idea(&db, author);
        let user = seed_user(&db, "racer@example.com");

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let db = db.clone();
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        db.toggle_vote(idea, user, 1).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        // Never a torn state: counters always match the rows, whichever
        // toggle outcome won.
        assert_aggregates_consistent(&db, idea);
        let row = db.idea_by_id(idea).unwrap().unwrap();
        assert!(row.upvote_count == 0 || row.upvote_count == 1);
    }

    #[test]
    fn reaction_add_remove_change() {
        let db = test_db();
        let user = seed_user(&db, "a@example.com");
        let idea = seed_idea(&db, user);

        let added = db.toggle_reaction(idea, user, ReactionKind::Love).unwrap();
        assert_eq!(added.change, ReactionChange::Added);
        assert_eq!(added.counts.get("LOVE"), Some(&1));

        let changed = db.toggle_reaction(idea, user, ReactionKind::Wow).unwrap();
        assert_eq!(changed.change, ReactionChange::Changed);
        assert_eq!(changed.counts.get("WOW"), Some(&1));
        // Old kind is gone entirely, not zero-filled
        assert!(!changed.counts.contains_key("LOVE"));

        let removed = db.toggle_reaction(idea, user, ReactionKind::Wow).unwrap();
        assert_eq!(removed.change, ReactionChange::Removed);
        assert!(removed.counts.is_empty());
    }

    #[test]
    fn reaction_change_leaves_vote_aggregates_alone() {
        let db = test_db();
        let user = seed_user(&db, "a@example.com");
        let idea = seed_idea(&db, user);

        db.toggle_vote(idea, user, 1).unwrap();
        db.toggle_reaction(idea, user, ReactionKind::Haha).unwrap();
        db.toggle_reaction(idea, user, ReactionKind::Sad).unwrap();

        let row = db.idea_by_id(idea).unwrap().unwrap();
        assert_eq!(row.score, 1);
        assert_eq!(row.upvote_count, 1);
    }

    #[test]
    fn at_most_one_reaction_per_pair() {
        let db = test_db();
        let user = seed_user(&db, "a@example.com");
        let idea = seed_idea(&db, user);

        db.toggle_reaction(idea, user, ReactionKind::Like).unwrap();
        db.toggle_reaction(idea, user, ReactionKind::Love).unwrap();

        let count: i64 = db
            .with_conn(|conn| {
                Ok(conn.query_row(
                    "SELECT COUNT(*) FROM reactions WHERE idea_id = ?1 AND user_id = ?2",
                    params![idea, user],
                    |row| row.get(0),
                )?)
            })
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn comments_ordered_by_creation() {
        let db = test_db();
        let user = seed_user(&db, "a@example.com");
        let idea = seed_idea(&db, user);

        db.insert_comment(idea, user, "first").unwrap();
        db.insert_comment(idea, user, "second").unwrap();
        db.insert_comment(idea, user, "third").unwrap();

        let comments = db.comments_by_idea(idea).unwrap();
        let contents: Vec<&str> = comments.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, ["first", "second", "third"]);
    }

    #[test]
    fn comment_on_unknown_idea_is_not_found() {
        let db = test_db();
        let user = seed_user(&db, "a@example.com");
        assert!(matches!(
            db.insert_comment(999, user, "hello"),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn users_carry_typed_roles() {
        let db = test_db();
        let user = seed_user(&db, "a@example.com");
        assert_eq!(
            db.user_by_email("a@example.com").unwrap().unwrap().role,
            Role::User
        );

        db.with_conn(|conn| {
            conn.execute("UPDATE users SET role = 'ADMIN' WHERE id = ?1", [user])?;
            Ok(())
        })
        .unwrap();
        assert_eq!(
            db.user_by_email("a@example.com").unwrap().unwrap().role,
            Role::Admin
        );
    }

    #[test]
    fn token_resolution_and_purge() {
        let db = test_db();
        let user = seed_user(&db, "a@example.com");

        // Multi-device: several live tokens per user
        db.insert_token("tok-laptop", user).unwrap();
        db.insert_token("tok-phone", user).unwrap();

        assert_eq!(db.user_by_token("tok-laptop").unwrap().unwrap().id, user);
        assert_eq!(db.user_by_token("tok-phone").unwrap().unwrap().id, user);
        assert!(db.user_by_token("tok-unknown").unwrap().is_none());

        let purged = db.delete_tokens_for_user(user).unwrap();
        assert_eq!(purged, 2);
        assert!(db.user_by_token("tok-laptop").unwrap().is_none());
    }

    #[test]
    fn reaction_counts_grouped_per_idea() {
        let db = test_db();
        let a = seed_user(&db, "a@example.com");
        let b = seed_user(&db, "b@example.com");
        let idea1 = seed_idea(&db, a);
        let idea2 = seed_idea(&db, a);

        db.toggle_reaction(idea1, a, ReactionKind::Like).unwrap();
        db.toggle_reaction(idea1, b, ReactionKind::Like).unwrap();
        db.toggle_reaction(idea2, b, ReactionKind::Angry).unwrap();

        let counts = db.reaction_counts(idea1).unwrap();
        assert_eq!(counts.get("LIKE"), Some(&2));
        assert_eq!(counts.len(), 1);

        let all = db.reaction_counts_all().unwrap();
        assert!(all.contains(&(idea1, "LIKE".to_string(), 2)));
        assert!(all.contains(&(idea2, "ANGRY".to_string(), 1)));
    }
}
