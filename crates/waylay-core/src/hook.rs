//! Hook handles and bind-time options

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use serde_json::Value;

use crate::error::HookResult;
use crate::group::{GroupScope, HookGroup};
use crate::invocation::Invocation;
use crate::point::PointName;
use crate::table::HookTable;

/// Shared hook procedure: runs with the live [`Invocation`] and produces
/// the call's result, typically by returning `invocation.proceed()`.
pub type HookProc = Arc<dyn Fn(&mut Invocation<'_>) -> HookResult<Value> + Send + Sync>;

/// A single interposed behavior unit bound to one interception point.
///
/// `Hook` is a cheap shared handle: clones refer to the same underlying
/// hook, and identity is pointer identity ([`Hook::ptr_eq`]). The handle
/// controls the hook's lifecycle directly: [`enable`](Hook::enable),
/// [`disable`](Hook::disable), [`unbind`](Hook::unbind).
#[derive(Clone)]
pub struct Hook {
    inner: Arc<HookInner>,
}

struct HookInner {
    enabled: AtomicBool,
    procedure: HookProc,
    once_key: Option<String>,
    owner: Weak<HookTable>,
    point: PointName,
}

impl Hook {
    pub(crate) fn new(
        procedure: HookProc,
        once_key: Option<String>,
        owner: Weak<HookTable>,
        point: PointName,
        enabled: bool,
    ) -> Self {
        Self {
            inner: Arc::new(HookInner {
                enabled: AtomicBool::new(enabled),
                procedure,
                once_key,
                owner,
                point,
            }),
        }
    }

    /// Name of the interception point this hook is bound to
    pub fn point(&self) -> &PointName {
        &self.inner.point
    }

    /// Whether the hook currently participates in dispatch
    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::Relaxed)
    }

    /// Let the hook participate in dispatch again
    pub fn enable(&self) -> &Self {
        self.inner.enabled.store(true, Ordering::Relaxed);
        self
    }

    /// Turn the hook into a pure pass-through without removing it from
    /// its chain
    pub fn disable(&self) -> &Self {
        self.inner.enabled.store(false, Ordering::Relaxed);
        self
    }

    /// Run `body` with the hook enabled, restoring it to disabled on
    /// every exit path.
    ///
    /// The flag is shared state: concurrent callers observe the temporary
    /// enable, so this is a call-site-local convenience, not a
    /// concurrency primitive.
    pub fn enable_within<R>(&self, body: impl FnOnce() -> R) -> R {
        struct DisableOnExit<'a>(&'a Hook);
        impl Drop for DisableOnExit<'_> {
            fn drop(&mut self) {
                self.0.disable();
            }
        }
        self.enable();
        let _restore = DisableOnExit(self);
        body()
    }

    /// Remove the hook from its owning dispatcher's list.
    ///
    /// Idempotent: unbinding twice, or after the owner itself has been
    /// dropped, is a no-op.
    pub fn unbind(&self) {
        if let Some(owner) = self.inner.owner.upgrade() {
            owner.unbind(&self.inner.point, self);
        }
    }

    /// Whether two handles refer to the same hook
    pub fn ptr_eq(a: &Hook, b: &Hook) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    pub(crate) fn once_key(&self) -> Option<&str> {
        self.inner.once_key.as_deref()
    }

    /// Run one chain link: a disabled hook forwards transparently, an
    /// enabled one runs its procedure.
    pub(crate) fn call(&self, invocation: &mut Invocation<'_>) -> HookResult<Value> {
        if !self.is_enabled() {
            return invocation.proceed();
        }
        (self.inner.procedure)(invocation)
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("point", &self.inner.point)
            .field("enabled", &self.is_enabled())
            .field("once_key", &self.inner.once_key)
            .field("procedure", &"<fn>")
            .finish()
    }
}

/// Options for `bind_with` registration calls.
///
/// Consuming builder:
/// `BindOptions::new().disabled().group(&audit).once("install-audit")`.
#[derive(Clone, Debug, Default)]
pub struct BindOptions {
    pub(crate) disabled: bool,
    pub(crate) groups: Vec<HookGroup>,
    pub(crate) once_key: Option<String>,
}

impl BindOptions {
    /// Default options: enabled, no groups, no dedupe key
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the hook disabled; it sits in the chain as a pass-through
    /// until enabled
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Join the new hook to `group`
    pub fn group(mut self, group: &HookGroup) -> Self {
        self.groups.push(group.clone());
        self
    }

    /// Join the new hook to every group carried by `scope`
    pub fn in_scope(mut self, scope: &GroupScope) -> Self {
        self.groups.extend(scope.groups().iter().cloned());
        self
    }

    /// Dedupe key: a later bind with the same key on the same dispatcher
    /// and point returns the existing hook instead of registering a
    /// duplicate
    pub fn once(mut self, key: impl Into<String>) -> Self {
        self.once_key = Some(key.into());
        self
    }
}
