use serde::{Deserialize, Serialize};

/// Handle for cancelling one scheduled transition.
pub type TimerId = u64;

/// A state change that happens some time after it is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Deferred {
    /// Swap the current question for a new one (hint).
    RegenerateQuestion,
    /// End the post-collision invulnerability window.
    Unfreeze,
    /// End the slowed penalty.
    EndSlow,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Scheduled {
    id: TimerId,
    due_ms: u64,
    transition: Deferred,
}

/// Pending deferred transitions keyed by the round's active clock.
///
/// Due times are in active (pause-excluded) milliseconds, so nothing fires
/// while the round is paused. Dropping the whole set on teardown keeps a torn
/// down round from mutating afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scheduler {
    next_id: TimerId,
    pending: Vec<Scheduled>,
}

impl Scheduler {
    pub fn schedule(&mut self, due_ms: u64, transition: Deferred) -> TimerId {
        self.next_id += 1;
        let id = self.next_id;
        self.pending.push(Scheduled {
            id,
            due_ms,
            transition,
        });
        id
    }

    /// Returns true if the timer was still pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|s| s.id != id);
        self.pending.len() != before
    }

    /// Cancel everything; returns how many were pending.
    pub fn cancel_all(&mut self) -> usize {
        let n = self.pending.len();
        self.pending.clear();
        n
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove and return every transition due at `now_ms`, earliest first.
    pub fn drain_due(&mut self, now_ms: u64) -> Vec<(TimerId, Deferred)> {
        let mut due: Vec<Scheduled> = Vec::new();
        self.pending.retain(|s| {
            if s.due_ms <= now_ms {
                due.push(s.clone());
                false
            } else {
                true
            }
        });
        due.sort_by_key(|s| (s.due_ms, s.id));
        due.into_iter().map(|s| (s.id, s.transition)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_in_due_order() {
        let mut s = Scheduler::default();
        let late = s.schedule(300, Deferred::EndSlow);
        let early = s.schedule(100, Deferred::Unfreeze);
        assert!(s.drain_due(50).is_empty());
        let fired = s.drain_due(400);
        assert_eq!(
            fired,
            vec![(early, Deferred::Unfreeze), (late, Deferred::EndSlow)]
        );
        assert!(s.is_empty());
    }

    #[test]
    fn cancel_single_timer() {
        let mut s = Scheduler::default();
        let a = s.schedule(100, Deferred::RegenerateQuestion);
        let b = s.schedule(100, Deferred::Unfreeze);
        assert!(s.cancel(a));
        assert!(!s.cancel(a));
        assert!(!s.is_pending(a));
        assert!(s.is_pending(b));
        assert_eq!(s.drain_due(100), vec![(b, Deferred::Unfreeze)]);
    }

    #[test]
    fn cancel_all_drops_everything() {
        let mut s = Scheduler::default();
        s.schedule(10, Deferred::EndSlow);
        s.schedule(20, Deferred::Unfreeze);
        assert_eq!(s.cancel_all(), 2);
        assert!(s.drain_due(u64::MAX).is_empty());
    }

    #[test]
    fn only_due_entries_drain() {
        let mut s = Scheduler::default();
        s.schedule(100, Deferred::Unfreeze);
        let later = s.schedule(200, Deferred::EndSlow);
        assert_eq!(s.drain_due(150).len(), 1);
        assert_eq!(s.len(), 1);
        assert!(s.is_pending(later));
    }
}
