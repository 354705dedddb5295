use crate::domain::model::{Job, Logo, Opacity};
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Outcome of acting on a stored job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    Ok,
    /// Unknown id, either never existed or already swept.
    Expired,
    /// The acting user did not create the job.
    NotOwner,
}

#[derive(Default)]
struct Inner {
    pending: HashMap<Uuid, Job>,
    /// user id -> job awaiting a custom opacity number from that user.
    waiting: HashMap<i64, Uuid>,
}

/// In-memory store for in-flight jobs. Each upload is independent; the
/// waiting map is the only state that outlives a single update.
#[derive(Default)]
pub struct JobStore {
    inner: Mutex<Inner>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, job: Job) {
        let mut inner = self.inner.lock().await;
        inner.pending.insert(job.id, job);
    }

    /// Clone of a pending job, if still present.
    pub async fn get(&self, job_id: Uuid) -> Option<Job> {
        let inner = self.inner.lock().await;
        inner.pending.get(&job_id).cloned()
    }

    pub async fn contains(&self, job_id: Uuid) -> bool {
        let inner = self.inner.lock().await;
        inner.pending.contains_key(&job_id)
    }

    /// Snapshot of pending job ids.
    pub async fn pending_ids(&self) -> Vec<Uuid> {
        let inner = self.inner.lock().await;
        inner.pending.keys().copied().collect()
    }

    /// Drop jobs older than the TTL and unlink their source files.
    pub async fn sweep_expired(&self) {
        self.sweep_at(Instant::now()).await;
    }

    async fn sweep_at(&self, now: Instant) {
        let mut inner = self.inner.lock().await;
        let stale: Vec<Uuid> = inner
            .pending
            .iter()
            .filter(|(_, job)| job.is_expired(now))
            .map(|(id, _)| *id)
            .collect();
        for id in stale {
            if let Some(job) = inner.pending.remove(&id) {
                tracing::debug!("sweeping expired job {}", id);
                remove_file_quiet(&job.src);
            }
        }
        let Inner { pending, waiting } = &mut *inner;
        waiting.retain(|_, job_id| pending.contains_key(job_id));
    }

    pub async fn set_logo(&self, job_id: Uuid, user_id: i64, logo: Logo) -> SelectOutcome {
        let mut inner = self.inner.lock().await;
        match inner.pending.get_mut(&job_id) {
            None => SelectOutcome::Expired,
            Some(job) if job.user_id != user_id => SelectOutcome::NotOwner,
            Some(job) => {
                job.logo = Some(logo);
                SelectOutcome::Ok
            }
        }
    }

    pub async fn set_opacity(&self, job_id: Uuid, user_id: i64, opacity: Opacity) -> SelectOutcome {
        let mut inner = self.inner.lock().await;
        match inner.pending.get_mut(&job_id) {
            None => SelectOutcome::Expired,
            Some(job) if job.user_id != user_id => SelectOutcome::NotOwner,
            Some(job) => {
                job.opacity = Some(opacity);
                SelectOutcome::Ok
            }
        }
    }

    /// Register the user as owing a custom opacity number for this job.
    pub async fn begin_custom(&self, job_id: Uuid, user_id: i64) -> SelectOutcome {
        let mut inner = self.inner.lock().await;
        match inner.pending.get(&job_id) {
            None => SelectOutcome::Expired,
            Some(job) if job.user_id != user_id => SelectOutcome::NotOwner,
            Some(_) => {
                inner.waiting.insert(user_id, job_id);
                SelectOutcome::Ok
            }
        }
    }

    pub async fn waiting_job(&self, user_id: i64) -> Option<Uuid> {
        let inner = self.inner.lock().await;
        inner.waiting.get(&user_id).copied()
    }

    pub async fn clear_waiting(&self, user_id: i64) {
        let mut inner = self.inner.lock().await;
        inner.waiting.remove(&user_id);
    }

    /// Remove and return a job once both selections are present. Processing
    /// happens at most once per job.
    pub async fn take_ready(&self, job_id: Uuid) -> Option<Job> {
        let mut inner = self.inner.lock().await;
        let ready = inner
            .pending
            .get(&job_id)
            .map(Job::is_ready)
            .unwrap_or(false);
        if ready {
            inner.pending.remove(&job_id)
        } else {
            None
        }
    }

    /// Remove the job and delete its temp file. Returns true when it existed.
    pub async fn cancel(&self, job_id: Uuid) -> bool {
        let mut inner = self.inner.lock().await;
        let removed = inner.pending.remove(&job_id);
        inner.waiting.retain(|_, id| *id != job_id);
        match removed {
            Some(job) => {
                remove_file_quiet(&job.src);
                true
            }
            None => false,
        }
    }
}

pub(crate) fn remove_file_quiet(path: &Path) {
    if let Err(err) = std::fs::remove_file(path) {
        if err.kind() != std::io::ErrorKind::NotFound {
            tracing::debug!("could not remove {}: {}", path.display(), err);
        }
    }
}
