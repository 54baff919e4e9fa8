//! Per-instance broadcast of widget lifecycle notifications.
//!
//! Listeners are delivered to synchronously and in registration order. A
//! listener that returns an error or panics is logged and skipped; the mutation
//! that triggered the notification is never affected.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use serde_json::json;

use crate::error::WidgetError;
use crate::logging::{LISTENER_TARGET, LogLevel, Logger, event_with_fields, json_kv};
use crate::registry::Anchor;
use crate::widget::WidgetHandle;

pub type ListenerResult = std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Observer of widget changes on one status-bar instance.
pub trait StatusBarListener: Send {
    fn widget_added(&mut self, _widget: &WidgetHandle, _anchor: &Anchor) -> ListenerResult {
        Ok(())
    }

    fn widget_updated(&mut self, _id: &str) -> ListenerResult {
        Ok(())
    }

    fn widget_removed(&mut self, _id: &str) -> ListenerResult {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// Notification published through a [`ListenerHub`].
#[derive(Debug, Clone, Copy)]
pub enum WidgetNotice<'a> {
    Added {
        widget: &'a WidgetHandle,
        anchor: &'a Anchor,
    },
    Updated(&'a str),
    Removed(&'a str),
}

impl WidgetNotice<'_> {
    fn name(&self) -> &'static str {
        match self {
            Self::Added { .. } => "widget_added",
            Self::Updated(_) => "widget_updated",
            Self::Removed(_) => "widget_removed",
        }
    }

    fn widget_id(&self) -> &str {
        match self {
            Self::Added { widget, .. } => widget.id(),
            Self::Updated(id) | Self::Removed(id) => id,
        }
    }
}

struct Subscription {
    id: ListenerId,
    listener: Box<dyn StatusBarListener>,
}

#[derive(Default)]
pub struct ListenerHub {
    next_id: u64,
    subscriptions: Vec<Subscription>,
    logger: Option<Logger>,
}

impl ListenerHub {
    pub fn new(logger: Option<Logger>) -> Self {
        Self {
            next_id: 0,
            subscriptions: Vec::new(),
            logger,
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn StatusBarListener>) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.subscriptions.push(Subscription { id, listener });
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|sub| sub.id != id);
        before != self.subscriptions.len()
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }

    /// Deliver `notice` to every live listener; returns how many failed.
    pub fn publish(&mut self, notice: WidgetNotice<'_>) -> usize {
        let mut failures = 0;
        for sub in self.subscriptions.iter_mut() {
            let listener = &mut sub.listener;
            let outcome = catch_unwind(AssertUnwindSafe(|| match notice {
                WidgetNotice::Added { widget, anchor } => listener.widget_added(widget, anchor),
                WidgetNotice::Updated(id) => listener.widget_updated(id),
                WidgetNotice::Removed(id) => listener.widget_removed(id),
            }));
            let reason = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => err.to_string(),
                Err(panic) => panic_message(panic.as_ref()),
            };
            failures += 1;
            let error = WidgetError::Listener(reason);
            if let Some(logger) = self.logger.as_ref() {
                let event = event_with_fields(
                    LogLevel::Error,
                    LISTENER_TARGET,
                    "listener_failed",
                    [
                        json_kv("listener", json!(sub.id.to_string())),
                        json_kv("notice", json!(notice.name())),
                        json_kv("widget", json!(notice.widget_id())),
                        json_kv("error", json!(error.to_string())),
                    ],
                );
                let _ = logger.log_event(event);
            }
        }
        failures
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "listener panicked".to_string()
    }
}
