use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use super::models::{Polarity, UserId, VoteOutcome, VoteSummary, VoteTarget};
use super::{Store, StoreError, StoreResult};

impl Store {
    /// Toggle `user_id`'s vote on `target`.
    ///
    /// Repeating the same polarity retracts the vote; the opposite polarity
    /// flips it in place. The read and the write share one IMMEDIATE
    /// transaction, so concurrent toggles on one (user, target) pair serialize.
    pub fn toggle_like(
        &self,
        user_id: UserId,
        target: VoteTarget,
        polarity: Polarity,
    ) -> StoreResult<VoteOutcome> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if !target_exists(&tx, target)? {
            return Err(StoreError::NotFound(format!("{} not found", target.label())));
        }

        let column = target.column();
        let existing: Option<(i64, bool)> = tx
            .query_row(
                &format!("SELECT id, is_like FROM likes WHERE user_id = ?1 AND {column} = ?2"),
                params![user_id, target.id()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let outcome = match existing {
            None => {
                tx.execute(
                    &format!("INSERT INTO likes (user_id, {column}, is_like) VALUES (?1, ?2, ?3)"),
                    params![user_id, target.id(), polarity.is_like()],
                )?;
                VoteOutcome::Created
            }
            Some((id, is_like)) if is_like == polarity.is_like() => {
                tx.execute("DELETE FROM likes WHERE id = ?1", params![id])?;
                VoteOutcome::Retracted
            }
            Some((id, _)) => {
                tx.execute(
                    "UPDATE likes SET is_like = ?1 WHERE id = ?2",
                    params![polarity.is_like(), id],
                )?;
                VoteOutcome::Flipped
            }
        };

        tx.commit()?;
        tracing::debug!(user_id, ?target, ?polarity, ?outcome, "vote toggled");
        Ok(outcome)
    }

    /// Like/dislike totals for `target` plus `viewer`'s own vote, in one query.
    pub fn vote_summary(
        &self,
        target: VoteTarget,
        viewer: Option<UserId>,
    ) -> StoreResult<VoteSummary> {
        let conn = self.conn()?;
        let column = target.column();
        let summary = conn.query_row(
            &format!(
                "SELECT COALESCE(SUM(CASE WHEN is_like THEN 1 ELSE 0 END), 0),
                        COALESCE(SUM(CASE WHEN is_like THEN 0 ELSE 1 END), 0),
                        MAX(CASE WHEN user_id = ?2 THEN is_like END)
                 FROM likes WHERE {column} = ?1"
            ),
            params![target.id(), viewer],
            |row| {
                let vote: Option<bool> = row.get(2)?;
                Ok(VoteSummary {
                    likes: row.get(0)?,
                    dislikes: row.get(1)?,
                    user_vote: vote.map(Polarity::from_is_like),
                })
            },
        )?;
        Ok(summary)
    }
}

fn target_exists(conn: &Connection, target: VoteTarget) -> rusqlite::Result<bool> {
    let found = conn
        .query_row(
            &format!("SELECT 1 FROM {} WHERE id = ?1", target.table()),
            params![target.id()],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}
