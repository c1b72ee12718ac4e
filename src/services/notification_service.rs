use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Repeat {
    #[default]
    None,
    Daily,
    Weekly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub id: i32,
    pub title: String,
    pub body: String,
    /// RFC 3339 timestamp of first delivery.
    pub at: String,
    #[serde(default)]
    pub repeat: Repeat,
}

/// Local notification scheduling. Only available inside a native shell; the
/// browser context gets [`NoopScheduler`] where every operation is a no-op.
pub trait NotificationScheduler: Send + Sync {
    fn schedule(&self, request: ScheduleRequest) -> bool;
    fn cancel(&self, id: i32) -> bool;
    fn pending(&self) -> Vec<ScheduleRequest>;
}

#[derive(Default)]
pub struct NoopScheduler;

impl NotificationScheduler for NoopScheduler {
    fn schedule(&self, _request: ScheduleRequest) -> bool {
        false
    }

    fn cancel(&self, _id: i32) -> bool {
        false
    }

    fn pending(&self) -> Vec<ScheduleRequest> {
        Vec::new()
    }
}

/// In-memory registry standing in for the native shell's scheduler.
#[derive(Default)]
pub struct LocalScheduler {
    pending: Mutex<HashMap<i32, ScheduleRequest>>,
}

impl LocalScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NotificationScheduler for LocalScheduler {
    fn schedule(&self, request: ScheduleRequest) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(request.id, request);
        true
    }

    fn cancel(&self, id: i32) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&id)
            .is_some()
    }

    fn pending(&self) -> Vec<ScheduleRequest> {
        let mut list: Vec<ScheduleRequest> = self
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .values()
            .cloned()
            .collect();
        list.sort_by_key(|r| r.id);
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(id: i32) -> ScheduleRequest {
        ScheduleRequest {
            id,
            title: "Morning Aarti".to_string(),
            body: "Time for the daily aarti".to_string(),
            at: "2025-09-01T06:00:00Z".to_string(),
            repeat: Repeat::Daily,
        }
    }

    #[test]
    fn test_noop_scheduler_does_nothing() {
        let scheduler = NoopScheduler;
        assert!(!scheduler.schedule(request(1)));
        assert!(!scheduler.cancel(1));
        assert!(scheduler.pending().is_empty());
    }

    #[test]
    fn test_local_scheduler_roundtrip() {
        let scheduler = LocalScheduler::new();
        assert!(scheduler.schedule(request(2)));
        assert!(scheduler.schedule(request(1)));

        let pending = scheduler.pending();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].id, 1);

        assert!(scheduler.cancel(2));
        assert!(!scheduler.cancel(2));
        assert_eq!(scheduler.pending().len(), 1);
    }

    #[test]
    fn test_reschedule_replaces_by_id() {
        let scheduler = LocalScheduler::new();
        scheduler.schedule(request(1));
        let mut updated = request(1);
        updated.repeat = Repeat::Weekly;
        scheduler.schedule(updated);

        let pending = scheduler.pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].repeat, Repeat::Weekly);
    }
}
