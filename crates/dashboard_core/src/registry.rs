use thiserror::Error;

use crate::{JobId, JobSnapshot};

/// Number of jobs kept in the recent-jobs history.
pub const REGISTRY_CAPACITY: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("job {0} is already registered")]
    Duplicate(JobId),
}

/// Bounded history of known jobs, most recently created first.
///
/// Position is decided once, at admission. Reconciling a newer snapshot
/// replaces the value in place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobRegistry {
    entries: Vec<JobSnapshot>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a brand-new job at the front.
    ///
    /// When the history overflows, the oldest entry other than `protected`
    /// is evicted. Returns the id of the evicted job, if any.
    pub fn admit(
        &mut self,
        snapshot: JobSnapshot,
        protected: Option<&str>,
    ) -> Result<Option<JobId>, RegistryError> {
        if self.contains(&snapshot.job_id) {
            return Err(RegistryError::Duplicate(snapshot.job_id));
        }
        self.entries.insert(0, snapshot);

        if self.entries.len() <= REGISTRY_CAPACITY {
            return Ok(None);
        }
        let victim = self
            .entries
            .iter()
            .rposition(|entry| Some(entry.job_id.as_str()) != protected);
        Ok(victim.map(|index| self.entries.remove(index).job_id))
    }

    /// Replace the snapshot of a known job. Unknown ids are ignored.
    pub fn reconcile(&mut self, job_id: &str, snapshot: JobSnapshot) -> bool {
        match self.entries.iter_mut().find(|entry| entry.job_id == job_id) {
            Some(entry) => {
                *entry = snapshot;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, job_id: &str) -> Option<&JobSnapshot> {
        self.entries.iter().find(|entry| entry.job_id == job_id)
    }

    pub fn contains(&self, job_id: &str) -> bool {
        self.get(job_id).is_some()
    }

    pub fn list_recent(&self) -> &[JobSnapshot] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
