//! Per-dispatcher hook storage

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::hook::{BindOptions, Hook, HookProc};
use crate::point::PointName;
use crate::registry;

/// Per-name ordered hook lists for one dispatcher scope.
///
/// The newest hook sits at the head of its list and dispatch walks head
/// first. Hooks hold a weak back-reference to their table so `unbind`
/// works from the handle alone.
pub(crate) struct HookTable {
    scope: String,
    hooks: Mutex<HashMap<PointName, Vec<Hook>>>,
}

impl HookTable {
    pub(crate) fn new(scope: String) -> Arc<Self> {
        Arc::new(Self {
            scope,
            hooks: Mutex::new(HashMap::new()),
        })
    }

    /// Register a hook at the head of the per-name list.
    ///
    /// With a dedupe key, a hook already carrying the same key for the
    /// same name is returned as-is and nothing else changes.
    pub(crate) fn bind(
        self: &Arc<Self>,
        point: PointName,
        options: BindOptions,
        procedure: HookProc,
    ) -> Hook {
        let BindOptions {
            disabled,
            groups,
            once_key,
        } = options;

        let mut hooks = self.hooks.lock();
        let list = hooks.entry(point.clone()).or_default();
        if let Some(key) = once_key.as_deref() {
            if let Some(existing) = list.iter().find(|hook| hook.once_key() == Some(key)) {
                let existing = existing.clone();
                drop(hooks);
                debug!("bind reused once-key `{}` for `{}` on {}", key, point, self.scope);
                return existing;
            }
        }
        let hook = Hook::new(
            procedure,
            once_key,
            Arc::downgrade(self),
            point.clone(),
            !disabled,
        );
        list.insert(0, hook.clone());
        let total = list.len();
        drop(hooks);

        registry::invalidate(&point);
        for group in &groups {
            group.add(&hook);
        }
        debug!("bound hook to `{}` on {} ({} in list)", point, self.scope, total);
        hook
    }

    /// Remove `hook` from the per-name list. Idempotent.
    pub(crate) fn unbind(&self, point: &PointName, hook: &Hook) {
        let removed;
        {
            let mut hooks = self.hooks.lock();
            if let Some(list) = hooks.get_mut(point) {
                let before = list.len();
                list.retain(|entry| !Hook::ptr_eq(entry, hook));
                removed = list.len() != before;
                if list.is_empty() {
                    hooks.remove(point);
                }
            } else {
                removed = false;
            }
        }
        registry::invalidate(point);
        if removed {
            debug!("unbound hook from `{}` on {}", point, self.scope);
        }
    }

    /// Remove every hook, invalidating each affected name
    pub(crate) fn clear(&self) {
        let names: Vec<PointName> = {
            let mut hooks = self.hooks.lock();
            let names = hooks.keys().cloned().collect();
            hooks.clear();
            names
        };
        for point in &names {
            registry::invalidate(point);
        }
        if !names.is_empty() {
            debug!("cleared {} hook lists on {}", names.len(), self.scope);
        }
    }

    /// Snapshot of the list for `point`, newest first
    pub(crate) fn snapshot(&self, point: &PointName) -> Vec<Hook> {
        self.hooks
            .lock()
            .get(point)
            .cloned()
            .unwrap_or_default()
    }
}
