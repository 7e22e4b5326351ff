//! Class-scope dispatchers: lineage, chain resolution, registered targets

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::dispatch;
use crate::error::{HookError, HookResult};
use crate::hook::{BindOptions, Hook};
use crate::invocation::Invocation;
use crate::point::{Hints, PointName};
use crate::registry;
use crate::table::HookTable;

/// Registered original behavior for an interception point: receives the
/// receiver (absent for class-scope calls) and the call arguments.
pub type TargetFn = Arc<dyn Fn(Option<&dyn Any>, &[Value]) -> HookResult<Value> + Send + Sync>;

/// A type that exposes interception points.
///
/// Implementing this is the static replacement for runtime class
/// discovery: the type names itself and declares its ancestors, nearest
/// first. Most implementations are a single empty line; types with a
/// conceptual parent chain declare it with [`lineage`]:
///
/// ```
/// use waylay_core::{ClassToken, Intercept, lineage};
///
/// struct Transport;
/// impl Intercept for Transport {}
///
/// struct TcpTransport;
/// impl Intercept for TcpTransport {
///     fn superclasses() -> Vec<ClassToken> {
///         lineage::<Transport>()
///     }
/// }
///
/// assert_eq!(TcpTransport::superclasses()[0].name(), "Transport");
/// ```
pub trait Intercept: 'static {
    /// Display name used in logs and errors
    fn class_name() -> &'static str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }

    /// Ancestor classes, nearest first. Defaults to none.
    fn superclasses() -> Vec<ClassToken> {
        Vec::new()
    }
}

/// Identity token for a class in a declared lineage
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClassToken {
    id: TypeId,
    name: &'static str,
}

impl ClassToken {
    /// Token for `T`
    pub fn of<T: Intercept>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: T::class_name(),
        }
    }

    /// Display name of the class
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn id(&self) -> TypeId {
        self.id
    }
}

/// `T` followed by its declared ancestors; the usual body for a
/// subclass's [`Intercept::superclasses`]
pub fn lineage<T: Intercept>() -> Vec<ClassToken> {
    let mut chain = vec![ClassToken::of::<T>()];
    chain.extend(T::superclasses());
    chain
}

/// One dispatcher per class for the process lifetime
static CLASSES: once_cell::sync::Lazy<DashMap<TypeId, ClassHooks>> =
    once_cell::sync::Lazy::new(DashMap::new);

/// Class-level dispatcher: owns the class's hook lists, its registered
/// original behaviors, and the memoized resolved chains for the whole
/// lineage.
///
/// Handles are cheap clones of the single per-class dispatcher. Hooks
/// bound here affect every instance of the class and of any descendant
/// that declares it in its lineage.
#[derive(Clone)]
pub struct ClassHooks {
    inner: Arc<ClassInner>,
}

struct ClassInner {
    token: ClassToken,
    lineage: Vec<ClassToken>,
    table: Arc<HookTable>,
    methods: Mutex<HashMap<PointName, TargetFn>>,
    cache: Mutex<HashMap<PointName, CachedChain>>,
    dispatcher_id: u64,
}

struct CachedChain {
    generation: u64,
    chain: Arc<[Hook]>,
}

impl ClassHooks {
    /// The dispatcher for class `T`, created on first use
    pub fn of<T: Intercept>() -> Self {
        CLASSES
            .entry(TypeId::of::<T>())
            .or_insert_with(|| {
                debug!("created class dispatcher for {}", T::class_name());
                Self::build(ClassToken::of::<T>(), T::superclasses())
            })
            .clone()
    }

    fn build(token: ClassToken, lineage: Vec<ClassToken>) -> Self {
        Self {
            inner: Arc::new(ClassInner {
                table: HookTable::new(format!("class {}", token.name())),
                methods: Mutex::new(HashMap::new()),
                cache: Mutex::new(HashMap::new()),
                dispatcher_id: dispatch::next_dispatcher_id(),
                token,
                lineage,
            }),
        }
    }

    /// The dispatcher for a class if one was ever created; ancestor walks
    /// use this so a class never acquires a dispatcher just by being
    /// looked at
    fn peek(id: TypeId) -> Option<ClassHooks> {
        CLASSES.get(&id).map(|entry| entry.clone())
    }

    /// Display name of the class this dispatcher serves
    pub fn name(&self) -> &'static str {
        self.inner.token.name()
    }

    // --- registration ---------------------------------------------------

    /// Bind a hook to `point` for every instance of this class and its
    /// descendants. Later binds run before earlier ones.
    pub fn bind<F>(&self, point: impl Into<PointName>, procedure: F) -> Hook
    where
        F: Fn(&mut Invocation<'_>) -> HookResult<Value> + Send + Sync + 'static,
    {
        self.bind_with(point, BindOptions::new(), procedure)
    }

    /// [`bind`](ClassHooks::bind) with explicit options
    pub fn bind_with<F>(&self, point: impl Into<PointName>, options: BindOptions, procedure: F) -> Hook
    where
        F: Fn(&mut Invocation<'_>) -> HookResult<Value> + Send + Sync + 'static,
    {
        self.inner.table.bind(point.into(), options, Arc::new(procedure))
    }

    /// Remove `hook` from this class's list for `point`. Idempotent.
    pub fn unbind(&self, point: impl Into<PointName>, hook: &Hook) {
        self.inner.table.unbind(&point.into(), hook);
    }

    /// Drop every hook and cached chain owned by this dispatcher
    pub fn unbind_all(&self) {
        self.inner.table.clear();
        self.inner.cache.lock().clear();
    }

    // --- registered targets (the forwarding-stub boundary) --------------

    /// Register the original behavior for `point`.
    ///
    /// First registration wins and later calls change nothing, so
    /// installation code may run repeatedly. Returns whether this call
    /// installed the target.
    pub fn provide<F>(&self, point: impl Into<PointName>, target: F) -> bool
    where
        F: Fn(Option<&dyn Any>, &[Value]) -> HookResult<Value> + Send + Sync + 'static,
    {
        let point = point.into();
        let mut methods = self.inner.methods.lock();
        if methods.contains_key(&point) {
            trace!("target for `{}` on class {} already registered", point, self.name());
            return false;
        }
        methods.insert(point.clone(), Arc::new(target));
        drop(methods);
        debug!("registered target for `{}` on class {}", point, self.name());
        true
    }

    /// Registered target for `point`, searching this class then its full
    /// lineage (classes without dispatchers are skipped, not created)
    pub(crate) fn find_target(&self, point: &PointName) -> Option<TargetFn> {
        let own = self.inner.methods.lock().get(point).cloned();
        if own.is_some() {
            return own;
        }
        self.inner
            .lineage
            .iter()
            .filter_map(|ancestor| Self::peek(ancestor.id()))
            .find_map(|class| class.inner.methods.lock().get(point).cloned())
    }

    /// Bind `procedure` to `point` after verifying a registered target
    /// exists somewhere in the lineage; errors with
    /// [`HookError::MissingTarget`] otherwise.
    pub fn hack<F>(&self, point: impl Into<PointName>, procedure: F) -> HookResult<Hook>
    where
        F: Fn(&mut Invocation<'_>) -> HookResult<Value> + Send + Sync + 'static,
    {
        self.hack_with(point, BindOptions::new(), procedure)
    }

    /// [`hack`](ClassHooks::hack) with explicit options
    pub fn hack_with<F>(
        &self,
        point: impl Into<PointName>,
        options: BindOptions,
        procedure: F,
    ) -> HookResult<Hook>
    where
        F: Fn(&mut Invocation<'_>) -> HookResult<Value> + Send + Sync + 'static,
    {
        let point = point.into();
        if self.find_target(&point).is_none() {
            return Err(HookError::missing_target(self.name(), &point));
        }
        Ok(self.bind_with(point, options, procedure))
    }

    /// Best-effort [`hack`](ClassHooks::hack): binds and returns the hook
    /// when the target exists, otherwise skips and returns `None`
    pub fn hack_if_present<F>(
        &self,
        point: impl Into<PointName>,
        options: BindOptions,
        procedure: F,
    ) -> Option<Hook>
    where
        F: Fn(&mut Invocation<'_>) -> HookResult<Value> + Send + Sync + 'static,
    {
        let point = point.into();
        if self.find_target(&point).is_none() {
            warn!(
                "skipping hook for `{}`: no target on class {} or its ancestors",
                point,
                self.name()
            );
            return None;
        }
        Some(self.bind_with(point, options, procedure))
    }

    // --- resolution -----------------------------------------------------

    /// Resolved class-side chain for `point`: this class's own hooks
    /// (newest first), then the first dispatcher-owning ancestor's
    /// resolved chain. Memoized until the point's generation moves.
    pub(crate) fn resolved_chain(&self, point: &PointName) -> Arc<[Hook]> {
        let current = registry::generation(point);
        if let Some(cached) = self.cached(point, current) {
            return cached;
        }
        let chain: Arc<[Hook]> = self.rebuild(point).into();
        self.inner.cache.lock().insert(
            point.clone(),
            CachedChain {
                generation: current,
                chain: chain.clone(),
            },
        );
        chain
    }

    fn cached(&self, point: &PointName, current: u64) -> Option<Arc<[Hook]>> {
        let cache = self.inner.cache.lock();
        let entry = cache.get(point)?;
        if entry.generation == current {
            trace!("chain cache hit for `{}` on class {}", point, self.name());
            Some(entry.chain.clone())
        } else {
            None
        }
    }

    fn rebuild(&self, point: &PointName) -> Vec<Hook> {
        let mut chain = self.inner.table.snapshot(point);
        for ancestor in &self.inner.lineage {
            if let Some(class) = Self::peek(ancestor.id()) {
                chain.extend_from_slice(&class.resolved_chain(point));
                break;
            }
        }
        debug!(
            "resolved chain for `{}` on class {} ({} hooks)",
            point,
            self.name(),
            chain.len()
        );
        chain
    }

    // --- dispatch (class scope: no receiver) ----------------------------

    /// Run `point` at class scope with an inline original
    pub fn wrap_call<F>(&self, point: impl Into<PointName>, args: Vec<Value>, original: F) -> HookResult<Value>
    where
        F: FnMut(&[Value]) -> HookResult<Value>,
    {
        self.wrap_call_with(point, args, Hints::new(), original)
    }

    /// [`wrap_call`](ClassHooks::wrap_call) with caller-supplied hints
    pub fn wrap_call_with<F>(
        &self,
        point: impl Into<PointName>,
        args: Vec<Value>,
        hints: Hints,
        mut original: F,
    ) -> HookResult<Value>
    where
        F: FnMut(&[Value]) -> HookResult<Value>,
    {
        dispatch::run(
            self.inner.dispatcher_id,
            point.into(),
            None,
            args,
            hints,
            |p| self.resolved_chain(p).to_vec(),
            &mut original,
        )
    }

    /// Run `point` at class scope around an inline block
    pub fn wrap_block<F>(&self, point: impl Into<PointName>, body: F) -> HookResult<Value>
    where
        F: FnMut() -> HookResult<Value>,
    {
        self.wrap_block_with(point, Hints::new(), body)
    }

    /// [`wrap_block`](ClassHooks::wrap_block) with caller-supplied hints
    pub fn wrap_block_with<F>(&self, point: impl Into<PointName>, hints: Hints, mut body: F) -> HookResult<Value>
    where
        F: FnMut() -> HookResult<Value>,
    {
        let mut original = move |_args: &[Value]| body();
        dispatch::run(
            self.inner.dispatcher_id,
            point.into(),
            None,
            Vec::new(),
            hints,
            |p| self.resolved_chain(p).to_vec(),
            &mut original,
        )
    }

    /// Run `point` through its registered target (the forwarding-stub
    /// path); errors if no target was provided anywhere in the lineage
    pub fn call_method(&self, point: impl Into<PointName>, args: Vec<Value>) -> HookResult<Value> {
        self.call_method_with(point, args, Hints::new())
    }

    /// [`call_method`](ClassHooks::call_method) with caller-supplied hints
    pub fn call_method_with(
        &self,
        point: impl Into<PointName>,
        args: Vec<Value>,
        hints: Hints,
    ) -> HookResult<Value> {
        let point = point.into();
        let target = self
            .find_target(&point)
            .ok_or_else(|| HookError::missing_target(self.name(), &point))?;
        let mut original = move |args: &[Value]| target(None, args);
        dispatch::run(
            self.inner.dispatcher_id,
            point,
            None,
            args,
            hints,
            |p| self.resolved_chain(p).to_vec(),
            &mut original,
        )
    }
}

impl fmt::Debug for ClassHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassHooks")
            .field("class", &self.name())
            .field("lineage", &self.inner.lineage.len())
            .finish()
    }
}
