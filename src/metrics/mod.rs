use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;

/// Counters accumulated by a [`StatusBarHost`](crate::StatusBarHost).
#[derive(Debug, Default, Clone)]
pub struct HostMetrics {
    widgets_added: u64,
    widgets_removed: u64,
    widgets_updated: u64,
    replicas_created: u64,
    replication_failures: u64,
    pointer_events: u64,
    popups_opened: u64,
    listener_failures: u64,
    tasks_drained: u64,
}

impl HostMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_added(&mut self) {
        self.widgets_added = self.widgets_added.saturating_add(1);
    }

    pub fn record_removed(&mut self) {
        self.widgets_removed = self.widgets_removed.saturating_add(1);
    }

    pub fn record_updated(&mut self) {
        self.widgets_updated = self.widgets_updated.saturating_add(1);
    }

    pub fn record_replica(&mut self) {
        self.replicas_created = self.replicas_created.saturating_add(1);
    }

    pub fn record_replication_failure(&mut self) {
        self.replication_failures = self.replication_failures.saturating_add(1);
    }

    pub fn record_pointer_event(&mut self) {
        self.pointer_events = self.pointer_events.saturating_add(1);
    }

    pub fn record_popup(&mut self) {
        self.popups_opened = self.popups_opened.saturating_add(1);
    }

    pub fn record_listener_failures(&mut self, count: usize) {
        if count > 0 {
            self.listener_failures = self.listener_failures.saturating_add(count as u64);
        }
    }

    pub fn record_tasks(&mut self, count: usize) {
        self.tasks_drained = self.tasks_drained.saturating_add(count as u64);
    }

    pub fn snapshot(&self) -> MetricSnapshot {
        MetricSnapshot {
            widgets_added: self.widgets_added,
            widgets_removed: self.widgets_removed,
            widgets_updated: self.widgets_updated,
            replicas_created: self.replicas_created,
            replication_failures: self.replication_failures,
            pointer_events: self.pointer_events,
            popups_opened: self.popups_opened,
            listener_failures: self.listener_failures,
            tasks_drained: self.tasks_drained,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub widgets_added: u64,
    pub widgets_removed: u64,
    pub widgets_updated: u64,
    pub replicas_created: u64,
    pub replication_failures: u64,
    pub pointer_events: u64,
    pub popups_opened: u64,
    pub listener_failures: u64,
    pub tasks_drained: u64,
}

impl MetricSnapshot {
    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("widgets_added".to_string(), json!(self.widgets_added));
        map.insert("widgets_removed".to_string(), json!(self.widgets_removed));
        map.insert("widgets_updated".to_string(), json!(self.widgets_updated));
        map.insert("replicas_created".to_string(), json!(self.replicas_created));
        map.insert(
            "replication_failures".to_string(),
            json!(self.replication_failures),
        );
        map.insert("pointer_events".to_string(), json!(self.pointer_events));
        map.insert("popups_opened".to_string(), json!(self.popups_opened));
        map.insert("listener_failures".to_string(), json!(self.listener_failures));
        map.insert("tasks_drained".to_string(), json!(self.tasks_drained));
        map
    }

    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "host_metrics", self.as_fields())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_counters() {
        let mut metrics = HostMetrics::new();
        metrics.record_added();
        metrics.record_added();
        metrics.record_listener_failures(0);
        metrics.record_listener_failures(3);
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.widgets_added, 2);
        assert_eq!(snapshot.listener_failures, 3);

        let event = snapshot.to_log_event("room::statusbar.metrics");
        assert_eq!(event.fields["widgets_added"], json!(2));
    }
}
