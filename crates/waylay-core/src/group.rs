//! Bulk hook lifecycle: groups and registration scopes

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::hook::Hook;

/// A collection of hooks controlled as one unit.
///
/// Groups own membership, not hook identity or lifetime: the same hook
/// may sit in several groups, and dropping a group unbinds nothing.
/// Handles are cheap clones of the same underlying group.
///
/// Binds join a group either directly or through a registration scope:
///
/// ```
/// use waylay_core::{BindOptions, HookGroup, Intercept, ObjectHooks};
///
/// struct Cache;
/// impl Intercept for Cache {}
///
/// let hooks = ObjectHooks::of::<Cache>();
/// let audit = HookGroup::new();
/// audit.wrap(|scope| {
///     hooks.bind_with("get", BindOptions::new().in_scope(scope), |invocation| {
///         invocation.proceed()
///     });
///     hooks.bind_with("put", BindOptions::new().in_scope(scope), |invocation| {
///         invocation.proceed()
///     });
/// });
/// assert_eq!(audit.len(), 2);
/// audit.unbind();
/// ```
#[derive(Clone, Default)]
pub struct HookGroup {
    inner: Arc<GroupInner>,
}

#[derive(Default)]
struct GroupInner {
    members: Mutex<Vec<Hook>>,
}

impl HookGroup {
    /// Create an empty group
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a hook to the group
    pub fn add(&self, hook: &Hook) {
        self.inner.members.lock().push(hook.clone());
    }

    /// Whether this exact hook (pointer identity) is a member
    pub fn contains(&self, hook: &Hook) -> bool {
        self.inner
            .members
            .lock()
            .iter()
            .any(|member| Hook::ptr_eq(member, hook))
    }

    /// Number of member hooks
    pub fn len(&self) -> usize {
        self.inner.members.lock().len()
    }

    /// Whether the group has no members
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Enable every member
    pub fn enable(&self) -> &Self {
        let members = self.snapshot();
        trace!("enabling hook group ({} members)", members.len());
        for hook in &members {
            hook.enable();
        }
        self
    }

    /// Disable every member
    pub fn disable(&self) -> &Self {
        let members = self.snapshot();
        trace!("disabling hook group ({} members)", members.len());
        for hook in &members {
            hook.disable();
        }
        self
    }

    /// Run `body` with every member enabled, disabling them all on every
    /// exit path. Same caveat as [`Hook::enable_within`]: not a
    /// concurrency primitive.
    pub fn enable_within<R>(&self, body: impl FnOnce() -> R) -> R {
        struct DisableOnExit<'a>(&'a HookGroup);
        impl Drop for DisableOnExit<'_> {
            fn drop(&mut self) {
                self.0.disable();
            }
        }
        self.enable();
        let _restore = DisableOnExit(self);
        body()
    }

    /// Unbind every member from its dispatcher and disband the group
    pub fn unbind(&self) {
        let members = std::mem::take(&mut *self.inner.members.lock());
        debug!("unbinding hook group ({} members)", members.len());
        for hook in &members {
            hook.unbind();
        }
    }

    /// Run a registration block inside a scope containing this group.
    ///
    /// Binds issued in the block join the group by carrying the scope:
    /// `BindOptions::new().in_scope(scope)`.
    pub fn wrap<R>(&self, body: impl FnOnce(&GroupScope) -> R) -> R {
        body(&GroupScope::of(self))
    }

    /// Run a registration block inside `outer` extended with this group,
    /// so binds carrying the inner scope join this group and every
    /// enclosing one.
    pub fn wrap_within<R>(&self, outer: &GroupScope, body: impl FnOnce(&GroupScope) -> R) -> R {
        body(&outer.and(self))
    }

    fn snapshot(&self) -> Vec<Hook> {
        self.inner.members.lock().clone()
    }
}

impl fmt::Debug for HookGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookGroup")
            .field("members", &self.len())
            .finish()
    }
}

/// The set of groups a registration block is running under.
///
/// Scopes are plain values passed down explicitly: nesting composes a new
/// scope and release on block exit needs no bookkeeping.
#[derive(Clone, Debug, Default)]
pub struct GroupScope {
    groups: Vec<HookGroup>,
}

impl GroupScope {
    /// A scope containing just `group`
    pub fn of(group: &HookGroup) -> Self {
        Self {
            groups: vec![group.clone()],
        }
    }

    /// This scope extended with `group` (innermost last)
    pub fn and(&self, group: &HookGroup) -> Self {
        let mut groups = self.groups.clone();
        groups.push(group.clone());
        Self { groups }
    }

    /// The groups carried by this scope
    pub fn groups(&self) -> &[HookGroup] {
        &self.groups
    }
}
