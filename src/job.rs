//! Component H: single-writer job lifecycle (`spec.md` §4.H, §5).
//!
//! Grounded on the source's `start`/`job.message +=`/`finish` contract
//! (`variants.py`'s `generate_variants(job=...)` and the job model it reads);
//! the in-memory [`InMemoryJobStore`] is a reference adapter for
//! [`JobPort`], the way the teacher crate's games ship an in-memory `Deck`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use strum::Display;

/// Monotonic lifecycle (`spec.md` §4.H "Transitions are monotonic").
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum JobStatus {
    Pending,
    Running,
    Success,
    Failure,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Job {
    pub name: String,
    pub status: JobStatus,
    pub message: String,
    pub user: Option<String>,
}

/// Write-side job contract (`spec.md` §6 "Job port").
pub trait JobPort {
    /// Registers a job under `name`, or returns `None` if one is already
    /// running for that name and its lease has not expired
    /// (`spec.md` §4.H "`start(name) -> job | null`").
    fn start(&mut self, name: &str, lease: Duration, user: Option<String>) -> Option<Job>;

    /// Appends `message` to the job's progress log, in its own short
    /// transaction so it stays visible during a long-running commit
    /// (`spec.md` §4.G "job progress messages are written in a separate,
    /// short transaction").
    fn log(&mut self, name: &str, message: &str);

    fn finish(&mut self, name: &str, status: JobStatus);

    /// True once `finish` has been called with `Failure` and a cancellation
    /// was requested via [`InMemoryJobStore::cancel`] (or an equivalent on a
    /// real adapter) — cooperative cancellation point (`spec.md` §5).
    fn is_cancelled(&self, name: &str) -> bool;
}

struct Entry {
    job: Job,
    lease_expires_at: Instant,
    cancelled: bool,
}

/// Reference, process-local [`JobPort`] adapter. A crash recovery story for
/// a real backend is "lease expires, a fresh driver reclaims the name";
/// this store honours the same lease check.
#[derive(Default)]
pub struct InMemoryJobStore {
    entries: HashMap<String, Entry>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cooperative cancellation of a running job.
    pub fn cancel(&mut self, name: &str) {
        if let Some(entry) = self.entries.get_mut(name) {
            entry.cancelled = true;
        }
    }
}

impl JobPort for InMemoryJobStore {
    fn start(&mut self, name: &str, lease: Duration, user: Option<String>) -> Option<Job> {
        let now = Instant::now();
        if let Some(existing) = self.entries.get(name) {
            if existing.job.status == JobStatus::Running && existing.lease_expires_at > now {
                return None;
            }
        }
        let job = Job {
            name: name.to_string(),
            status: JobStatus::Running,
            message: String::new(),
            user,
        };
        self.entries.insert(
            name.to_string(),
            Entry { job: job.clone(), lease_expires_at: now + lease, cancelled: false },
        );
        Some(job)
    }

    fn log(&mut self, name: &str, message: &str) {
        if let Some(entry) = self.entries.get_mut(name) {
            entry.job.message.push_str(message);
            entry.job.message.push('\n');
        }
    }

    fn finish(&mut self, name: &str, status: JobStatus) {
        if let Some(entry) = self.entries.get_mut(name) {
            entry.job.status = status;
        }
    }

    fn is_cancelled(&self, name: &str) -> bool {
        self.entries.get(name).map_or(false, |e| e.cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_second_start_for_the_same_running_name_returns_none() {
        let mut store = InMemoryJobStore::new();
        assert!(store.start("generate-variants", Duration::from_secs(60), None).is_some());
        assert!(store.start("generate-variants", Duration::from_secs(60), None).is_none());
    }

    #[test]
    fn starting_again_after_finish_succeeds() {
        let mut store = InMemoryJobStore::new();
        store.start("generate-variants", Duration::from_secs(60), None);
        store.finish("generate-variants", JobStatus::Success);
        assert!(store.start("generate-variants", Duration::from_secs(60), None).is_some());
    }

    #[test]
    fn expired_lease_is_reclaimable() {
        let mut store = InMemoryJobStore::new();
        store.start("generate-variants", Duration::from_millis(0), None);
        std::thread::sleep(Duration::from_millis(5));
        assert!(store.start("generate-variants", Duration::from_secs(60), None).is_some());
    }

    #[test]
    fn cancellation_is_observable_through_the_port() {
        let mut store = InMemoryJobStore::new();
        store.start("generate-variants", Duration::from_secs(60), None);
        assert!(!store.is_cancelled("generate-variants"));
        store.cancel("generate-variants");
        assert!(store.is_cancelled("generate-variants"));
    }
}
