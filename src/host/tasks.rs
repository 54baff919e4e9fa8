//! Cross-thread entry point into the host.
//!
//! The host is owned by one thread. Other threads hold a [`TaskSender`] and
//! enqueue [`HostTask`]s, which the owner runs in arrival order on
//! [`StatusBarHost::drain_tasks`](super::StatusBarHost::drain_tasks).

use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};

use crate::layout::Zone;
use crate::registry::Anchor;
use crate::widget::{WidgetHandle, WidgetId};

use super::StatusBarHost;
use super::types::InstanceId;

pub type TaskFn = Box<dyn FnOnce(&mut StatusBarHost) + Send>;

/// A queued host mutation.
pub enum HostTask {
    AddWidget {
        instance: InstanceId,
        widget: WidgetHandle,
        zone: Zone,
        anchor: Anchor,
    },
    RemoveWidget {
        instance: InstanceId,
        id: WidgetId,
    },
    UpdateWidget {
        instance: InstanceId,
        id: WidgetId,
    },
    SetInfo {
        instance: InstanceId,
        text: String,
        requestor: Option<String>,
    },
    Custom(TaskFn),
}

impl HostTask {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddWidget { .. } => "add_widget",
            Self::RemoveWidget { .. } => "remove_widget",
            Self::UpdateWidget { .. } => "update_widget",
            Self::SetInfo { .. } => "set_info",
            Self::Custom(_) => "custom",
        }
    }

    pub(super) fn run(self, host: &mut StatusBarHost) {
        match self {
            Self::AddWidget {
                instance,
                widget,
                zone,
                anchor,
            } => host.add_widget(instance, widget, zone, anchor),
            Self::RemoveWidget { instance, id } => host.remove_widget(instance, &id),
            Self::UpdateWidget { instance, id } => host.update_widget(instance, &id),
            Self::SetInfo {
                instance,
                text,
                requestor,
            } => host.set_info(instance, &text, requestor.as_deref()),
            Self::Custom(task) => task(host),
        }
    }
}

impl fmt::Debug for HostTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HostTask").field(&self.name()).finish()
    }
}

/// Cloneable, `Send` handle for enqueueing work on the owning thread.
#[derive(Clone)]
pub struct TaskSender {
    inner: Sender<HostTask>,
}

impl TaskSender {
    /// Enqueue `task`. Returns `false` once the host has been dropped.
    pub fn send(&self, task: HostTask) -> bool {
        self.inner.send(task).is_ok()
    }

    pub fn add_widget(
        &self,
        instance: InstanceId,
        widget: WidgetHandle,
        zone: Zone,
        anchor: Anchor,
    ) -> bool {
        self.send(HostTask::AddWidget {
            instance,
            widget,
            zone,
            anchor,
        })
    }

    pub fn remove_widget(&self, instance: InstanceId, id: impl Into<WidgetId>) -> bool {
        self.send(HostTask::RemoveWidget {
            instance,
            id: id.into(),
        })
    }

    pub fn update_widget(&self, instance: InstanceId, id: impl Into<WidgetId>) -> bool {
        self.send(HostTask::UpdateWidget {
            instance,
            id: id.into(),
        })
    }

    pub fn set_info(
        &self,
        instance: InstanceId,
        text: impl Into<String>,
        requestor: Option<String>,
    ) -> bool {
        self.send(HostTask::SetInfo {
            instance,
            text: text.into(),
            requestor,
        })
    }

    pub fn custom<F>(&self, task: F) -> bool
    where
        F: FnOnce(&mut StatusBarHost) + Send + 'static,
    {
        self.send(HostTask::Custom(Box::new(task)))
    }
}

pub(super) struct TaskQueue {
    sender: Sender<HostTask>,
    receiver: Receiver<HostTask>,
}

impl TaskQueue {
    pub(super) fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self { sender, receiver }
    }

    pub(super) fn sender(&self) -> TaskSender {
        TaskSender {
            inner: self.sender.clone(),
        }
    }

    /// Everything enqueued so far, in arrival order. Tasks enqueued while the
    /// batch runs wait for the next drain.
    pub(super) fn take_pending(&self) -> Vec<HostTask> {
        self.receiver.try_iter().collect()
    }
}
