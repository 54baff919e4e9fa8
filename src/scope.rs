//! Disposal scopes: lifetime handles whose end triggers cleanup of everything
//! registered against them.

use std::collections::HashMap;
use std::fmt;

use crate::host::InstanceId;
use crate::listener::ListenerId;
use crate::widget::WidgetId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u64);

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope#{}", self.0)
    }
}

/// Cleanup to perform when a scope ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeAction {
    RemoveWidget {
        instance: InstanceId,
        widget: WidgetId,
    },
    Unsubscribe {
        instance: InstanceId,
        listener: ListenerId,
    },
    DisposeInstance(InstanceId),
}

#[derive(Debug, Default)]
pub struct ScopeRegistry {
    next_id: u64,
    scopes: HashMap<ScopeId, Vec<ScopeAction>>,
}

impl ScopeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self) -> ScopeId {
        self.next_id += 1;
        let id = ScopeId(self.next_id);
        self.scopes.insert(id, Vec::new());
        id
    }

    pub fn is_live(&self, scope: ScopeId) -> bool {
        self.scopes.contains_key(&scope)
    }

    /// Attach `action` to `scope`. When the scope has already ended the action
    /// is handed back so the caller can run it right away.
    pub fn register(&mut self, scope: ScopeId, action: ScopeAction) -> Option<ScopeAction> {
        match self.scopes.get_mut(&scope) {
            Some(actions) => {
                if !actions.contains(&action) {
                    actions.push(action);
                }
                None
            }
            None => Some(action),
        }
    }

    /// End `scope`, returning its actions most-recent first. Ending an unknown
    /// or already ended scope yields nothing.
    pub fn end(&mut self, scope: ScopeId) -> Vec<ScopeAction> {
        let mut actions = self.scopes.remove(&scope).unwrap_or_default();
        actions.reverse();
        actions
    }

    /// Drop pending removals of `widget` on `instance` once it is already gone.
    pub fn forget_widget(&mut self, instance: InstanceId, widget: &str) {
        for actions in self.scopes.values_mut() {
            actions.retain(|action| {
                !matches!(
                    action,
                    ScopeAction::RemoveWidget { instance: owner, widget: id }
                        if *owner == instance && id == widget
                )
            });
        }
    }

    /// Drop every pending action that targets `instance`.
    pub fn forget_instance(&mut self, instance: InstanceId) {
        for actions in self.scopes.values_mut() {
            actions.retain(|action| match action {
                ScopeAction::RemoveWidget { instance: owner, .. }
                | ScopeAction::Unsubscribe { instance: owner, .. } => *owner != instance,
                ScopeAction::DisposeInstance(owner) => *owner != instance,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_run_most_recent_first() {
        let mut scopes = ScopeRegistry::new();
        let scope = scopes.create();
        let root = InstanceId::from_raw(1);
        for id in ["A", "B"] {
            assert!(scopes
                .register(
                    scope,
                    ScopeAction::RemoveWidget {
                        instance: root,
                        widget: id.into(),
                    },
                )
                .is_none());
        }

        let actions = scopes.end(scope);
        assert_eq!(
            actions[0],
            ScopeAction::RemoveWidget {
                instance: root,
                widget: "B".into()
            }
        );
        assert!(scopes.end(scope).is_empty());
        assert!(!scopes.is_live(scope));
    }

    #[test]
    fn registering_on_ended_scope_hands_action_back() {
        let mut scopes = ScopeRegistry::new();
        let scope = scopes.create();
        scopes.end(scope);
        let action = ScopeAction::DisposeInstance(InstanceId::from_raw(3));
        assert_eq!(scopes.register(scope, action.clone()), Some(action));
    }

    #[test]
    fn removals_are_deduplicated_and_forgotten() {
        let mut scopes = ScopeRegistry::new();
        let scope = scopes.create();
        let root = InstanceId::from_raw(1);
        let removal = |id: &str| ScopeAction::RemoveWidget {
            instance: root,
            widget: id.into(),
        };
        scopes.register(scope, removal("Git"));
        scopes.register(scope, removal("Git"));
        scopes.register(scope, removal("Memory"));
        scopes.forget_widget(root, "Memory");
        scopes.forget_widget(InstanceId::from_raw(9), "Git");
        assert_eq!(scopes.end(scope), vec![removal("Git")]);
    }

    #[test]
    fn forgetting_an_instance_drops_its_actions() {
        let mut scopes = ScopeRegistry::new();
        let scope = scopes.create();
        let gone = InstanceId::from_raw(2);
        let kept = InstanceId::from_raw(5);
        scopes.register(scope, ScopeAction::DisposeInstance(gone));
        scopes.register(scope, ScopeAction::DisposeInstance(kept));
        scopes.forget_instance(gone);
        assert_eq!(scopes.end(scope), vec![ScopeAction::DisposeInstance(kept)]);
    }
}
