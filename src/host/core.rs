use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::io::Write;

use serde_json::{Value, json};

use crate::error::{HostError, Result, WidgetError};
use crate::geometry::Rect;
use crate::layout::{StripLayout, Zone};
use crate::listener::{ListenerHub, ListenerId, StatusBarListener, WidgetNotice};
use crate::logging::{
    LogLevel, POINTER_TARGET, REGISTRY_TARGET, REPLICATION_TARGET, TASKS_TARGET,
    event_with_fields, json_kv,
};
use crate::metrics::{HostMetrics, MetricSnapshot};
use crate::pointer::{EffectState, EffectTarget, PointerEvent, PopupRequest, RouterSnapshot, route};
use crate::registry::{Anchor, Detached, WidgetRegistry};
use crate::render::{RendererSettings, StripRenderer, StripView};
use crate::scope::{ScopeAction, ScopeId, ScopeRegistry};
use crate::surface::{SurfaceContent, SurfaceId};
use crate::widget::WidgetHandle;

use super::tasks::{TaskQueue, TaskSender};
use super::types::{
    ContextValue, FrameRef, HOVERED_WIDGET_ID_KEY, HostConfig, InstanceId, PROJECT_KEY,
    PopupPresenter, STATUS_BAR_INSTANCE_KEY,
};

#[derive(Debug, Clone, Default)]
struct InfoText {
    text: String,
    requestor: Option<String>,
}

/// State owned by one window frame's status bar.
pub struct StatusBarInstance {
    id: InstanceId,
    frame: FrameRef,
    registry: WidgetRegistry,
    listeners: ListenerHub,
    parent: Option<InstanceId>,
    children: BTreeSet<InstanceId>,
    effect: EffectState,
    visible: bool,
    info: InfoText,
    invalidated: Vec<Rect>,
}

impl StatusBarInstance {
    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn frame(&self) -> &FrameRef {
        &self.frame
    }

    /// Back-reference used only for deregistration.
    pub fn parent(&self) -> Option<InstanceId> {
        self.parent
    }

    pub fn children(&self) -> &BTreeSet<InstanceId> {
        &self.children
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn effect(&self) -> EffectState {
        self.effect
    }

    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    pub fn info(&self) -> &str {
        &self.info.text
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn layout(&self) -> StripLayout {
        self.registry.layout(self.frame.width)
    }

    fn invalidate(&mut self, rect: Rect) {
        if !rect.is_empty() && !self.invalidated.contains(&rect) {
            self.invalidated.push(rect);
        }
    }

    fn invalidate_strip(&mut self) {
        self.invalidate(Rect::new(0, 0, self.frame.width, 1));
    }

    fn child_ids(&self) -> Vec<InstanceId> {
        self.children.iter().copied().collect()
    }

    /// Finish taking an entry out: drop the effect if it sat on a released
    /// surface and dispose the widget.
    fn retire(&mut self, detached: Detached) {
        let Detached { mut entry, released } = detached;
        if let Some(surface) = self.effect.surface() {
            if released.contains(&surface) {
                self.effect = EffectState::Idle;
            }
        }
        entry.widget.dispose();
        self.invalidate_strip();
    }
}

/// Arena of status-bar instances, one per window frame, plus the shared
/// services they use.
pub struct StatusBarHost {
    config: HostConfig,
    instances: BTreeMap<InstanceId, StatusBarInstance>,
    next_instance: u64,
    scopes: ScopeRegistry,
    action_groups: HashSet<String>,
    presenter: Option<Box<dyn PopupPresenter>>,
    renderer: StripRenderer,
    tasks: TaskQueue,
}

impl Default for StatusBarHost {
    fn default() -> Self {
        Self::new(HostConfig::default())
    }
}

impl StatusBarHost {
    pub fn new(config: HostConfig) -> Self {
        Self {
            config,
            instances: BTreeMap::new(),
            next_instance: 0,
            scopes: ScopeRegistry::new(),
            action_groups: HashSet::new(),
            presenter: None,
            renderer: StripRenderer::with_default(),
            tasks: TaskQueue::new(),
        }
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut HostConfig {
        &mut self.config
    }

    pub fn renderer_settings_mut(&mut self) -> &mut RendererSettings {
        self.renderer.settings_mut()
    }

    pub fn create_root(&mut self, frame: FrameRef) -> InstanceId {
        let id = self.spawn(frame, None, true);
        self.log(
            LogLevel::Info,
            REPLICATION_TARGET,
            "instance_created",
            [json_kv("instance", json!(id.to_string()))],
        );
        id
    }

    /// Create a frame status bar under `parent`. Every replicable widget of
    /// the parent is cloned into it at the same zone and anchor.
    pub fn create_child(&mut self, parent: InstanceId, frame: FrameRef) -> Result<InstanceId> {
        let visible = self.instance(parent)?.visible;
        let child = self.spawn(frame, Some(parent), visible);
        if let Some(owner) = self.instances.get_mut(&parent) {
            owner.children.insert(child);
        }

        let replicable: Vec<(String, Zone)> = self
            .instance(parent)?
            .registry
            .entries()
            .filter(|entry| entry.widget.is_replicable())
            .map(|entry| (entry.widget.id().to_string(), entry.zone))
            .collect();
        for (id, zone) in replicable {
            let anchor = self
                .anchor(parent, &id)
                .cloned()
                .unwrap_or_default();
            if let Some(replica) = self.replica_of(parent, &id, child) {
                self.add_entry(child, replica, zone, anchor, None);
            }
        }

        self.log(
            LogLevel::Info,
            REPLICATION_TARGET,
            "instance_created",
            [
                json_kv("instance", json!(child.to_string())),
                json_kv("parent", json!(parent.to_string())),
            ],
        );
        Ok(child)
    }

    /// Dispose `instance` and, first, every descendant. The instance leaves
    /// the arena, its widgets are disposed without notifications, and pending
    /// scope actions targeting it are dropped.
    pub fn dispose_instance(&mut self, instance: InstanceId) -> bool {
        let Some(mut owned) = self.instances.remove(&instance) else {
            return false;
        };
        for child in std::mem::take(&mut owned.children) {
            self.dispose_instance(child);
        }
        owned.listeners.clear();
        let entries = owned.registry.drain();
        let widget_count = entries.len();
        for mut entry in entries {
            entry.widget.dispose();
        }
        self.scopes.forget_instance(instance);
        if let Some(parent) = owned.parent.and_then(|p| self.instances.get_mut(&p)) {
            parent.children.remove(&instance);
        }
        self.log(
            LogLevel::Info,
            REPLICATION_TARGET,
            "instance_disposed",
            [
                json_kv("instance", json!(instance.to_string())),
                json_kv("widgets", json!(widget_count)),
            ],
        );
        true
    }

    pub fn instance(&self, instance: InstanceId) -> Result<&StatusBarInstance> {
        self.instances
            .get(&instance)
            .ok_or(HostError::InstanceNotFound(instance))
    }

    pub fn contains_instance(&self, instance: InstanceId) -> bool {
        self.instances.contains_key(&instance)
    }

    pub fn instance_ids(&self) -> Vec<InstanceId> {
        self.instances.keys().copied().collect()
    }

    /// Show or hide `instance` and all of its descendants.
    pub fn set_visible(&mut self, instance: InstanceId, visible: bool) {
        let Some(inst) = self.instances.get_mut(&instance) else {
            return;
        };
        if inst.visible != visible {
            inst.visible = visible;
            inst.invalidate_strip();
        }
        for child in inst.child_ids() {
            self.set_visible(child, visible);
        }
    }

    pub fn add_widget(&mut self, instance: InstanceId, widget: WidgetHandle, zone: Zone, anchor: Anchor) {
        self.add_entry(instance, widget, zone, anchor, None);
    }

    /// Add a widget that is removed again when `scope` ends.
    pub fn add_widget_scoped(
        &mut self,
        instance: InstanceId,
        widget: WidgetHandle,
        zone: Zone,
        anchor: Anchor,
        scope: ScopeId,
    ) {
        let id = widget.id().to_string();
        if !self.add_entry(instance, widget, zone, anchor, None) {
            return;
        }
        let action = ScopeAction::RemoveWidget {
            instance,
            widget: id,
        };
        if let Some(action) = self.scopes.register(scope, action) {
            self.run_scope_action(action);
        }
    }

    /// Left-zone widgets never receive hover or press effects.
    pub fn add_widget_to_left(&mut self, instance: InstanceId, widget: WidgetHandle, scope: ScopeId) {
        self.add_widget_scoped(instance, widget, Zone::Left, Anchor::Default, scope);
    }

    /// Place `widget` in the center slot with caller-supplied content. The
    /// content is kept as given; updates only repaint it.
    pub fn set_central_widget(&mut self, instance: InstanceId, widget: WidgetHandle, surface: SurfaceContent) {
        self.add_entry(instance, widget, Zone::Center, Anchor::Default, Some(surface));
    }

    /// Remove `id` from `instance` and its descendants. Unknown ids are a no-op.
    pub fn remove_widget(&mut self, instance: InstanceId, id: &str) {
        let Some(inst) = self.instances.get_mut(&instance) else {
            return;
        };
        let children = inst.child_ids();
        let failures = inst.registry.remove(id).map(|detached| {
            inst.retire(detached);
            inst.listeners.publish(WidgetNotice::Removed(id))
        });
        if let Some(failures) = failures {
            self.scopes.forget_widget(instance, id);
            self.with_metrics(|metrics| {
                metrics.record_removed();
                metrics.record_listener_failures(failures);
            });
            self.log(
                LogLevel::Info,
                REGISTRY_TARGET,
                "widget_removed",
                [
                    json_kv("instance", json!(instance.to_string())),
                    json_kv("widget", json!(id)),
                ],
            );
        }
        for child in children {
            self.remove_widget(child, id);
        }
    }

    /// Re-query the presentation of `id` and refresh its surface, here and in
    /// every descendant.
    pub fn update_widget(&mut self, instance: InstanceId, id: &str) {
        let Some(inst) = self.instances.get(&instance) else {
            return;
        };
        let children = inst.child_ids();
        let pending = inst
            .registry
            .get(id)
            .map(|entry| (!entry.pinned).then(|| entry.widget.surface_content()));

        if let Some(queried) = pending {
            let content = queried.map(|result| self.content_or_fallback(instance, result));
            if let Some(inst) = self.instances.get_mut(&instance) {
                let changed = match content {
                    Some(content) => inst.registry.refresh(id, content).unwrap_or(false),
                    None => inst.registry.touch(id),
                };
                if changed {
                    inst.invalidate_strip();
                }
                let failures = inst.listeners.publish(WidgetNotice::Updated(id));
                self.with_metrics(|metrics| {
                    metrics.record_updated();
                    metrics.record_listener_failures(failures);
                });
                self.log(
                    LogLevel::Debug,
                    REGISTRY_TARGET,
                    "widget_updated",
                    [
                        json_kv("instance", json!(instance.to_string())),
                        json_kv("widget", json!(id)),
                        json_kv("changed", json!(changed)),
                    ],
                );
            }
        }

        for child in children {
            self.update_widget(child, id);
        }
    }

    pub fn widget(&self, instance: InstanceId, id: &str) -> Option<&WidgetHandle> {
        self.instances
            .get(&instance)
            .and_then(|inst| inst.registry.get(id))
            .map(|entry| &entry.widget)
    }

    /// Widgets of `instance` in registration order.
    pub fn all_widgets(&self, instance: InstanceId) -> Result<Vec<&WidgetHandle>> {
        Ok(self.instance(instance)?.registry.widgets().collect())
    }

    pub fn anchor(&self, instance: InstanceId, id: &str) -> Option<&Anchor> {
        self.instances
            .get(&instance)
            .and_then(|inst| inst.registry.get(id))
            .map(|entry| &entry.anchor)
    }

    /// Subscribe `listener` to `instance` until `scope` ends. A scope that has
    /// already ended unsubscribes it straight away.
    pub fn add_listener<L>(&mut self, instance: InstanceId, listener: L, scope: ScopeId) -> Option<ListenerId>
    where
        L: StatusBarListener + 'static,
    {
        let inst = self.instances.get_mut(&instance)?;
        let listener = inst.listeners.subscribe(Box::new(listener));
        if let Some(action) = self
            .scopes
            .register(scope, ScopeAction::Unsubscribe { instance, listener })
        {
            self.run_scope_action(action);
        }
        Some(listener)
    }

    pub fn create_scope(&mut self) -> ScopeId {
        self.scopes.create()
    }

    /// End `scope`, running its cleanup most-recent first. Returns how many
    /// actions ran.
    pub fn dispose_scope(&mut self, scope: ScopeId) -> usize {
        let actions = self.scopes.end(scope);
        let count = actions.len();
        for action in actions {
            self.run_scope_action(action);
        }
        self.log(
            LogLevel::Debug,
            REGISTRY_TARGET,
            "scope_disposed",
            [
                json_kv("scope", json!(scope.to_string())),
                json_kv("actions", json!(count)),
            ],
        );
        count
    }

    /// Dispose `instance` when `scope` ends.
    pub fn dispose_with_scope(&mut self, instance: InstanceId, scope: ScopeId) {
        if let Some(action) = self
            .scopes
            .register(scope, ScopeAction::DisposeInstance(instance))
        {
            self.run_scope_action(action);
        }
    }

    fn run_scope_action(&mut self, action: ScopeAction) {
        match action {
            ScopeAction::RemoveWidget { instance, widget } => self.remove_widget(instance, &widget),
            ScopeAction::Unsubscribe { instance, listener } => {
                if let Some(inst) = self.instances.get_mut(&instance) {
                    inst.listeners.unsubscribe(listener);
                }
            }
            ScopeAction::DisposeInstance(instance) => {
                self.dispose_instance(instance);
            }
        }
    }

    /// Set the status text shown beside the center widget. Empty text from a
    /// requestor other than the current owner leaves the text in place.
    pub fn set_info(&mut self, instance: InstanceId, text: &str, requestor: Option<&str>) {
        let Some(inst) = self.instances.get_mut(&instance) else {
            return;
        };
        let owner = inst.info.requestor.as_deref();
        if text.is_empty() && owner.is_some() && owner != requestor {
            return;
        }
        inst.info = InfoText {
            text: text.to_string(),
            requestor: if text.is_empty() {
                None
            } else {
                requestor.map(str::to_string)
            },
        };
        let rect = inst.layout().info;
        inst.invalidate(rect);
    }

    pub fn info(&self, instance: InstanceId) -> Result<&str> {
        Ok(self.instance(instance)?.info())
    }

    pub fn register_action_group(&mut self, group: impl Into<String>) {
        self.action_groups.insert(group.into());
    }

    pub fn set_popup_presenter<P>(&mut self, presenter: P)
    where
        P: PopupPresenter + 'static,
    {
        self.presenter = Some(Box::new(presenter));
    }

    /// Feed one pointer event, from any managed window, to every instance.
    /// Returns `true` when an instance handled it by opening the context menu.
    pub fn dispatch_pointer(&mut self, event: &mut PointerEvent) -> bool {
        self.with_metrics(HostMetrics::record_pointer_event);
        let group = self
            .action_groups
            .contains(&self.config.action_group_id)
            .then(|| self.config.action_group_id.clone());

        let mut handled = false;
        for id in self.instance_ids() {
            let Some(inst) = self.instances.get_mut(&id) else {
                continue;
            };
            let layout = inst.layout();
            let snapshot = RouterSnapshot {
                window: inst.frame.window,
                strip_origin: inst.frame.origin,
                visible: inst.visible,
                layout: &layout,
                has_project: inst.frame.project.is_some(),
                action_group: group.as_deref(),
            };
            let outcome = route(inst.effect, event, &snapshot);
            let changed = inst.effect != outcome.state;
            inst.effect = outcome.state;
            for rect in outcome.invalidated {
                inst.invalidate(rect);
            }
            let hovered = inst
                .effect
                .surface()
                .and_then(|surface| inst.registry.widget_for_surface(surface))
                .map(str::to_string);

            if outcome.consume {
                event.consume();
            }
            handled |= outcome.handled;
            if changed {
                self.log(
                    LogLevel::Trace,
                    POINTER_TARGET,
                    "effect_changed",
                    [
                        json_kv("instance", json!(id.to_string())),
                        json_kv("widget", json!(hovered)),
                    ],
                );
            }
            if let Some(popup) = outcome.popup {
                self.present_popup(id, popup);
            }
        }
        handled
    }

    pub fn effect(&self, instance: InstanceId) -> Result<Option<EffectTarget>> {
        Ok(self.instance(instance)?.effect.target())
    }

    fn present_popup(&mut self, instance: InstanceId, popup: PopupRequest) {
        if let Some(presenter) = self.presenter.as_mut() {
            presenter.show(instance, &popup);
        }
        self.with_metrics(HostMetrics::record_popup);
        self.log(
            LogLevel::Info,
            POINTER_TARGET,
            "popup_requested",
            [
                json_kv("instance", json!(instance.to_string())),
                json_kv("group", json!(popup.group)),
                json_kv("widget", json!(popup.widget_id)),
                json_kv("x", json!(popup.anchor.x)),
                json_kv("y", json!(popup.anchor.y)),
            ],
        );
    }

    pub fn layout(&self, instance: InstanceId) -> Result<StripLayout> {
        Ok(self.instance(instance)?.layout())
    }

    /// Strip-local regions that changed since the last call.
    pub fn take_invalidated(&mut self, instance: InstanceId) -> Result<Vec<Rect>> {
        let inst = self
            .instances
            .get_mut(&instance)
            .ok_or(HostError::InstanceNotFound(instance))?;
        Ok(std::mem::take(&mut inst.invalidated))
    }

    /// Surfaces whose content changed since the last render.
    pub fn take_dirty(&mut self, instance: InstanceId) -> Result<Vec<SurfaceId>> {
        let inst = self
            .instances
            .get_mut(&instance)
            .ok_or(HostError::InstanceNotFound(instance))?;
        Ok(inst.registry.take_dirty())
    }

    /// Paint the strip of `instance` and clear its dirty state. Hidden
    /// instances write nothing.
    pub fn render(&mut self, instance: InstanceId, writer: &mut impl Write) -> Result<()> {
        let inst = self
            .instances
            .get_mut(&instance)
            .ok_or(HostError::InstanceNotFound(instance))?;
        if !inst.visible {
            return Ok(());
        }
        let layout = inst.layout();
        let view = StripView {
            origin: inst.frame.origin,
            layout: &layout,
            surfaces: inst.registry.surfaces(),
            effect: inst.effect.target(),
            info: &inst.info.text,
        };
        self.renderer.render(writer, &view)?;
        inst.registry.take_dirty();
        inst.invalidated.clear();
        Ok(())
    }

    /// Pull-based context lookup. Unknown keys and instances yield `None`.
    pub fn query(&self, instance: InstanceId, key: &str) -> Option<ContextValue> {
        let inst = self.instances.get(&instance)?;
        match key {
            PROJECT_KEY => inst.frame.project.clone().map(ContextValue::Project),
            STATUS_BAR_INSTANCE_KEY => Some(ContextValue::Instance(instance)),
            HOVERED_WIDGET_ID_KEY => inst
                .effect
                .surface()
                .and_then(|surface| inst.registry.widget_for_surface(surface))
                .map(|id| ContextValue::HoveredWidget(id.to_string())),
            _ => None,
        }
    }

    pub fn task_sender(&self) -> TaskSender {
        self.tasks.sender()
    }

    /// Run every queued task in arrival order. Returns how many ran.
    pub fn drain_tasks(&mut self) -> usize {
        let pending = self.tasks.take_pending();
        let count = pending.len();
        for task in pending {
            self.log(
                LogLevel::Trace,
                TASKS_TARGET,
                "task_started",
                [json_kv("task", json!(task.name()))],
            );
            task.run(self);
        }
        if count > 0 {
            self.with_metrics(|metrics| metrics.record_tasks(count));
        }
        count
    }

    pub fn metrics_snapshot(&self) -> Option<MetricSnapshot> {
        let metrics = self.config.metrics.as_ref()?;
        metrics.lock().ok().map(|guard| guard.snapshot())
    }

    /// Write the current metrics snapshot to the configured logger.
    pub fn emit_metrics(&self) {
        if let (Some(logger), Some(snapshot)) = (self.config.logger.as_ref(), self.metrics_snapshot()) {
            let _ = logger.log_event(snapshot.to_log_event(&self.config.metrics_target));
        }
    }

    fn spawn(&mut self, frame: FrameRef, parent: Option<InstanceId>, visible: bool) -> InstanceId {
        self.next_instance += 1;
        let id = InstanceId::from_raw(self.next_instance);
        let instance = StatusBarInstance {
            id,
            frame,
            registry: WidgetRegistry::new(),
            listeners: ListenerHub::new(self.config.logger.clone()),
            parent,
            children: BTreeSet::new(),
            effect: EffectState::Idle,
            visible,
            info: InfoText::default(),
            invalidated: Vec::new(),
        };
        self.instances.insert(id, instance);
        id
    }

    /// Insert into `instance`, fan replicable widgets out to its children, then
    /// notify the instance's listeners. Returns `false` when nothing was added.
    fn add_entry(
        &mut self,
        instance: InstanceId,
        mut widget: WidgetHandle,
        zone: Zone,
        anchor: Anchor,
        pinned: Option<SurfaceContent>,
    ) -> bool {
        let id = widget.id().to_string();
        if id.is_empty() {
            self.log_widget_error(instance, &WidgetError::EmptyId);
            return false;
        }
        let Some(inst) = self.instances.get(&instance) else {
            self.log(
                LogLevel::Debug,
                REGISTRY_TARGET,
                "instance_missing",
                [
                    json_kv("instance", json!(instance.to_string())),
                    json_kv("widget", json!(id)),
                ],
            );
            return false;
        };
        let frame = inst.frame.clone();
        let occupant = match zone {
            Zone::Center => inst
                .registry
                .zones()
                .center()
                .filter(|current| *current != id)
                .map(str::to_string),
            Zone::Left | Zone::Right => None,
        };
        if let Some(occupant) = occupant {
            self.remove_widget(instance, &occupant);
        }

        let is_pinned = pinned.is_some();
        let content = match pinned {
            Some(content) => content,
            None => self.content_or_fallback(instance, widget.surface_content()),
        };
        widget.install(&frame);
        let replicable = widget.is_replicable();
        let anchor_text = anchor.to_string();

        let Some(inst) = self.instances.get_mut(&instance) else {
            return false;
        };
        let inserted = inst.registry.insert(
            widget,
            zone,
            anchor,
            content,
            is_pinned,
            &self.config.sentinel_ids,
        );
        let replaced = inserted.replaced.is_some();
        let was_replicable = inserted
            .replaced
            .as_ref()
            .is_some_and(|detached| detached.entry.widget.is_replicable());
        for detached in inserted.replaced.into_iter().chain(inserted.evicted) {
            inst.retire(detached);
        }
        inst.invalidate_strip();
        let children = inst.child_ids();

        self.with_metrics(HostMetrics::record_added);
        self.log(
            LogLevel::Info,
            REGISTRY_TARGET,
            "widget_added",
            [
                json_kv("instance", json!(instance.to_string())),
                json_kv("widget", json!(id)),
                json_kv("zone", json!(zone.as_str())),
                json_kv("anchor", json!(anchor_text)),
                json_kv("replaced", json!(replaced)),
            ],
        );

        if replicable {
            for child in children {
                match self.replica_of(instance, &id, child) {
                    Some(replica) => {
                        let anchor = self.anchor(instance, &id).cloned().unwrap_or_default();
                        self.add_entry(child, replica, zone, anchor, None);
                    }
                    None => self.drop_replica(child, &id),
                }
            }
        } else if was_replicable {
            for child in children {
                self.drop_replica(child, &id);
            }
        }

        let failures = match self.instances.get_mut(&instance) {
            Some(inst) => match inst.registry.get(&id) {
                Some(entry) => inst.listeners.publish(WidgetNotice::Added {
                    widget: &entry.widget,
                    anchor: &entry.anchor,
                }),
                None => 0,
            },
            None => 0,
        };
        self.with_metrics(|metrics| metrics.record_listener_failures(failures));
        true
    }

    /// Remove a mirrored copy of `id` from `child` and its subtree. Widgets the
    /// child registered on its own are left alone.
    fn drop_replica(&mut self, child: InstanceId, id: &str) {
        let mirrored = self
            .widget(child, id)
            .is_some_and(WidgetHandle::is_replicable);
        if mirrored {
            self.remove_widget(child, id);
        }
    }

    /// Clone widget `id` of `source` for `target`. Failures are logged and
    /// counted; the caller skips the target, and with it the target's subtree.
    fn replica_of(&self, source: InstanceId, id: &str, target: InstanceId) -> Option<WidgetHandle> {
        let widget = self.widget(source, id)?;
        match widget.replicate() {
            Ok(replica) => {
                self.with_metrics(HostMetrics::record_replica);
                self.log(
                    LogLevel::Debug,
                    REPLICATION_TARGET,
                    "replica_created",
                    [
                        json_kv("widget", json!(id)),
                        json_kv("source", json!(source.to_string())),
                        json_kv("target", json!(target.to_string())),
                    ],
                );
                Some(replica)
            }
            Err(err) => {
                self.with_metrics(HostMetrics::record_replication_failure);
                self.log(
                    LogLevel::Error,
                    REPLICATION_TARGET,
                    "replication_failed",
                    [
                        json_kv("widget", json!(id)),
                        json_kv("source", json!(source.to_string())),
                        json_kv("target", json!(target.to_string())),
                        json_kv("reason", json!(err.to_string())),
                    ],
                );
                None
            }
        }
    }

    fn content_or_fallback(
        &self,
        instance: InstanceId,
        result: std::result::Result<SurfaceContent, WidgetError>,
    ) -> SurfaceContent {
        result.unwrap_or_else(|err| {
            self.log_widget_error(instance, &err);
            SurfaceContent::empty()
        })
    }

    fn log_widget_error(&self, instance: InstanceId, err: &WidgetError) {
        self.log(
            LogLevel::Error,
            REGISTRY_TARGET,
            "widget_defect",
            [
                json_kv("instance", json!(instance.to_string())),
                json_kv("error", json!(err.to_string())),
            ],
        );
    }

    fn log<I>(&self, level: LogLevel, target: &str, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        if let Some(logger) = self.config.logger.as_ref() {
            let event = event_with_fields(level, target, message, fields);
            let _ = logger.log_event(event);
        }
    }

    fn with_metrics(&self, record: impl FnOnce(&mut HostMetrics)) {
        if let Some(metrics) = self.config.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                record(&mut guard);
            }
        }
    }
}
