use crate::model::enums::VoteAction;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError, RwLock};
use thiserror::Error;
use tracing::warn;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Error)]
#[error(transparent)]
pub enum LedgerError {
    Io(#[from] std::io::Error),
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
#[error(transparent)]
pub enum VoteError {
    Ledger(#[from] LedgerError),
    Persist(#[from] diesel::result::Error),
}

/// One device's vote on one post. `liked` and `disliked` are mutually
/// exclusive; [`VoteState::apply`] is the only place transitions happen.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VoteState {
    pub liked: bool,
    pub disliked: bool,
}

/// Result of applying a vote action: the new state plus the counter deltas
/// it implies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteOutcome {
    pub state: VoteState,
    pub like_delta: i32,
    pub dislike_delta: i32,
}

impl VoteState {
    pub fn apply(self, action: VoteAction) -> VoteOutcome {
        match action {
            VoteAction::Like if self.liked => VoteOutcome {
                state: Self::default(),
                like_delta: -1,
                dislike_delta: 0,
            },
            VoteAction::Like => VoteOutcome {
                state: Self {
                    liked: true,
                    disliked: false,
                },
                like_delta: 1,
                dislike_delta: if self.disliked { -1 } else { 0 },
            },
            VoteAction::Dislike if self.disliked => VoteOutcome {
                state: Self::default(),
                like_delta: 0,
                dislike_delta: -1,
            },
            VoteAction::Dislike => VoteOutcome {
                state: Self {
                    liked: false,
                    disliked: true,
                },
                like_delta: if self.liked { -1 } else { 0 },
                dislike_delta: 1,
            },
        }
    }
}

/// A post's like/dislike totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counters {
    pub likes: i32,
    pub dislikes: i32,
}

impl Counters {
    /// Applies counter deltas, clamping both totals at zero.
    pub fn apply(self, outcome: &VoteOutcome) -> Self {
        Self {
            likes: (self.likes + outcome.like_delta).max(0),
            dislikes: (self.dislikes + outcome.dislike_delta).max(0),
        }
    }
}

/// Prior and next snapshots of a vote, computed up front so that rolling
/// back is a single assignment of the prior snapshot rather than ad hoc
/// variable juggling.
#[derive(Debug, Clone, Copy)]
pub struct VoteTransaction {
    pub prior_state: VoteState,
    pub next_state: VoteState,
    pub prior_counters: Counters,
    pub next_counters: Counters,
}

impl VoteTransaction {
    pub fn new(prior_state: VoteState, prior_counters: Counters, action: VoteAction) -> Self {
        let outcome = prior_state.apply(action);
        Self {
            prior_state,
            next_state: outcome.state,
            prior_counters,
            next_counters: prior_counters.apply(&outcome),
        }
    }
}

/// What a vote request resolved to.
pub enum VoteReceipt {
    Applied { state: VoteState, counters: Counters },
    /// Another vote for the same (device, post) pair was already in flight;
    /// the request was ignored.
    Busy,
}

type Entries = HashMap<Uuid, HashMap<i64, VoteState>>;

/// Device-scoped vote storage, keyed per post. The server-side stand-in for
/// the browser-local storage the web client used: a single JSON file under
/// the data directory, loaded once at startup and written through on every
/// vote or rollback. Every caller presenting the same device id shares vote
/// state. Not synchronized across devices.
pub struct VoteLedger {
    path: PathBuf,
    entries: RwLock<Entries>,
    in_flight: Mutex<HashSet<(Uuid, i64)>>,
}

impl VoteLedger {
    /// Loads the ledger file at `path`, or starts empty if there is none.
    pub fn load(path: PathBuf) -> Result<Self, LedgerError> {
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Entries::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            path,
            entries: RwLock::new(entries),
            in_flight: Mutex::new(HashSet::new()),
        })
    }

    /// The device's current vote on a post. Unknown pairs are unvoted.
    pub fn state(&self, device: Uuid, post_id: i64) -> VoteState {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(&device)
            .and_then(|votes| votes.get(&post_id))
            .copied()
            .unwrap_or_default()
    }

    /// Records a vote state and writes the ledger file through.
    fn set(&self, device: Uuid, post_id: i64, state: VoteState) -> Result<(), LedgerError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if state == VoteState::default() {
            if let Some(votes) = entries.get_mut(&device) {
                votes.remove(&post_id);
                if votes.is_empty() {
                    entries.remove(&device);
                }
            }
        } else {
            entries.entry(device).or_default().insert(post_id, state);
        }

        let serialized = serde_json::to_string(&*entries)?;
        std::fs::write(&self.path, serialized)?;
        Ok(())
    }

    /// Claims the (device, post) pair for a vote mutation. Returns None if
    /// one is already in flight.
    fn begin(&self, device: Uuid, post_id: i64) -> Option<InFlightVote<'_>> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        in_flight
            .insert((device, post_id))
            .then_some(InFlightVote { ledger: self, device, post_id })
    }

    /// Toggles a device's vote on a post. Side effects happen in a fixed
    /// order: the new state is recorded in the ledger first, then `persist`
    /// is given the transaction to push the new counters to the database.
    /// If persisting fails, the ledger entry is restored to its prior
    /// snapshot and the error is returned. Re-entrant calls for the same
    /// (device, post) pair are ignored while one is pending.
    pub fn commit<F>(
        &self,
        device: Uuid,
        post_id: i64,
        counters: Counters,
        action: VoteAction,
        persist: F,
    ) -> Result<VoteReceipt, VoteError>
    where
        F: FnOnce(&VoteTransaction) -> diesel::QueryResult<()>,
    {
        let Some(_guard) = self.begin(device, post_id) else {
            return Ok(VoteReceipt::Busy);
        };

        let transaction = VoteTransaction::new(self.state(device, post_id), counters, action);
        self.set(device, post_id, transaction.next_state)?;

        if let Err(err) = persist(&transaction) {
            if let Err(rollback_err) = self.set(device, post_id, transaction.prior_state) {
                warn!("Failed to roll back vote ledger for post {post_id}. Details:\n{rollback_err}");
            }
            return Err(err.into());
        }

        Ok(VoteReceipt::Applied {
            state: transaction.next_state,
            counters: transaction.next_counters,
        })
    }
}

struct InFlightVote<'a> {
    ledger: &'a VoteLedger,
    device: Uuid,
    post_id: i64,
}

impl Drop for InFlightVote<'_> {
    fn drop(&mut self) {
        let mut in_flight = self.ledger.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        in_flight.remove(&(self.device, self.post_id));
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::temp_data_dir;

    const UNVOTED: VoteState = VoteState {
        liked: false,
        disliked: false,
    };
    const LIKED: VoteState = VoteState {
        liked: true,
        disliked: false,
    };
    const DISLIKED: VoteState = VoteState {
        liked: false,
        disliked: true,
    };

    fn test_ledger() -> VoteLedger {
        VoteLedger::load(temp_data_dir().join("votes.json")).unwrap()
    }

    #[test]
    fn transition_table() {
        let cases = [
            (UNVOTED, VoteAction::Like, LIKED, 1, 0),
            (LIKED, VoteAction::Like, UNVOTED, -1, 0),
            (DISLIKED, VoteAction::Like, LIKED, 1, -1),
            (UNVOTED, VoteAction::Dislike, DISLIKED, 0, 1),
            (DISLIKED, VoteAction::Dislike, UNVOTED, 0, -1),
            (LIKED, VoteAction::Dislike, DISLIKED, -1, 1),
        ];
        for (current, action, expected, like_delta, dislike_delta) in cases {
            let outcome = current.apply(action);
            assert_eq!(outcome.state, expected, "{current:?} + {action:?}");
            assert_eq!(outcome.like_delta, like_delta, "{current:?} + {action:?}");
            assert_eq!(outcome.dislike_delta, dislike_delta, "{current:?} + {action:?}");
            assert!(!(outcome.state.liked && outcome.state.disliked));
        }
    }

    #[test]
    fn double_toggle_returns_to_original() {
        let counters = Counters { likes: 3, dislikes: 1 };
        let first = UNVOTED.apply(VoteAction::Like);
        let second = first.state.apply(VoteAction::Like);
        assert_eq!(second.state, UNVOTED);
        assert_eq!(counters.apply(&first).apply(&second), counters);
    }

    #[test]
    fn like_replaces_dislike() {
        let transaction = VoteTransaction::new(DISLIKED, Counters { likes: 0, dislikes: 5 }, VoteAction::Like);
        assert_eq!(transaction.next_state, LIKED);
        assert_eq!(transaction.next_counters, Counters { likes: 1, dislikes: 4 });
    }

    #[test]
    fn counters_clamp_at_zero() {
        let counters = Counters { likes: 0, dislikes: 0 };
        let undo_like = LIKED.apply(VoteAction::Like);
        assert_eq!(counters.apply(&undo_like), counters);
    }

    #[test]
    fn ledger_survives_reload() {
        let dir = temp_data_dir();
        let device = Uuid::new_v4();
        let ledger = VoteLedger::load(dir.join("votes.json")).unwrap();
        ledger.set(device, 7, LIKED).unwrap();
        drop(ledger);

        let reloaded = VoteLedger::load(dir.join("votes.json")).unwrap();
        assert_eq!(reloaded.state(device, 7), LIKED);
        assert_eq!(reloaded.state(device, 8), UNVOTED);
    }

    #[test]
    fn unvoted_entries_are_dropped_from_the_file() {
        let dir = temp_data_dir();
        let device = Uuid::new_v4();
        let ledger = VoteLedger::load(dir.join("votes.json")).unwrap();
        ledger.set(device, 7, LIKED).unwrap();
        ledger.set(device, 7, UNVOTED).unwrap();

        let contents = std::fs::read_to_string(dir.join("votes.json")).unwrap();
        assert_eq!(contents, "{}");
    }

    #[test]
    fn commit_applies_state_and_counters() {
        let ledger = test_ledger();
        let device = Uuid::new_v4();
        let receipt = ledger
            .commit(device, 1, Counters { likes: 0, dislikes: 0 }, VoteAction::Like, |_| Ok(()))
            .unwrap();

        let VoteReceipt::Applied { state, counters } = receipt else {
            panic!("vote should not be busy");
        };
        assert_eq!(state, LIKED);
        assert_eq!(counters, Counters { likes: 1, dislikes: 0 });
        assert_eq!(ledger.state(device, 1), LIKED);
    }

    #[test]
    fn failed_persist_rolls_back_ledger() {
        let dir = temp_data_dir();
        let ledger = VoteLedger::load(dir.join("votes.json")).unwrap();
        let device = Uuid::new_v4();
        ledger.set(device, 1, DISLIKED).unwrap();
        let file_before = std::fs::read_to_string(dir.join("votes.json")).unwrap();

        let result = ledger.commit(device, 1, Counters { likes: 0, dislikes: 5 }, VoteAction::Like, |_| {
            Err(diesel::result::Error::RollbackTransaction)
        });
        assert!(matches!(result, Err(VoteError::Persist(_))));

        // In-memory and on-disk state are bit-identical to before the vote
        assert_eq!(ledger.state(device, 1), DISLIKED);
        let file_after = std::fs::read_to_string(dir.join("votes.json")).unwrap();
        assert_eq!(file_after, file_before);
    }

    #[test]
    fn reentrant_votes_are_ignored() {
        let ledger = test_ledger();
        let device = Uuid::new_v4();
        let guard = ledger.begin(device, 1);
        assert!(guard.is_some());

        let receipt = ledger
            .commit(device, 1, Counters { likes: 0, dislikes: 0 }, VoteAction::Like, |_| Ok(()))
            .unwrap();
        assert!(matches!(receipt, VoteReceipt::Busy));
        assert_eq!(ledger.state(device, 1), UNVOTED);

        // Once the pending vote settles, the next one goes through
        drop(guard);
        let receipt = ledger
            .commit(device, 1, Counters { likes: 0, dislikes: 0 }, VoteAction::Like, |_| Ok(()))
            .unwrap();
        assert!(matches!(receipt, VoteReceipt::Applied { .. }));
    }
}
