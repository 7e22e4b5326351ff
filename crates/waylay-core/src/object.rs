//! Object-scope dispatchers: per-instance hooks layered over the class chain

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::class::{ClassHooks, Intercept};
use crate::dispatch;
use crate::error::{HookError, HookResult};
use crate::hook::{BindOptions, Hook};
use crate::invocation::Invocation;
use crate::point::{Hints, PointName};
use crate::table::HookTable;

/// Per-instance dispatcher. Hooks bound here affect only calls routed
/// through this dispatcher; the owning class's hooks still apply and run
/// after them.
///
/// Embed one per instance (cloning a handle shares the same hook lists,
/// it does not copy them):
///
/// ```
/// use waylay_core::{Intercept, ObjectHooks};
///
/// struct Door {
///     hooks: ObjectHooks,
/// }
/// impl Intercept for Door {}
///
/// let door = Door { hooks: ObjectHooks::of::<Door>() };
/// assert_eq!(door.hooks.class().name(), "Door");
/// ```
#[derive(Clone)]
pub struct ObjectHooks {
    table: Arc<HookTable>,
    class: ClassHooks,
    dispatcher_id: u64,
}

impl ObjectHooks {
    /// A fresh dispatcher for one instance of `T`
    pub fn of<T: Intercept>() -> Self {
        Self {
            table: HookTable::new(format!("object {}", T::class_name())),
            class: ClassHooks::of::<T>(),
            dispatcher_id: dispatch::next_dispatcher_id(),
        }
    }

    /// The class dispatcher this object belongs to
    pub fn class(&self) -> &ClassHooks {
        &self.class
    }

    // --- registration ---------------------------------------------------

    /// Bind a hook to `point` for this instance only. Later binds run
    /// before earlier ones, and all object hooks run before class hooks.
    pub fn bind<F>(&self, point: impl Into<PointName>, procedure: F) -> Hook
    where
        F: Fn(&mut Invocation<'_>) -> HookResult<Value> + Send + Sync + 'static,
    {
        self.bind_with(point, BindOptions::new(), procedure)
    }

    /// [`bind`](ObjectHooks::bind) with explicit options
    pub fn bind_with<F>(&self, point: impl Into<PointName>, options: BindOptions, procedure: F) -> Hook
    where
        F: Fn(&mut Invocation<'_>) -> HookResult<Value> + Send + Sync + 'static,
    {
        self.table.bind(point.into(), options, Arc::new(procedure))
    }

    /// Remove `hook` from this instance's list for `point`. Idempotent.
    pub fn unbind(&self, point: impl Into<PointName>, hook: &Hook) {
        self.table.unbind(&point.into(), hook);
    }

    /// Drop every hook bound to this instance
    pub fn unbind_all(&self) {
        self.table.clear();
    }

    /// Bind to `point` after verifying the class lineage has a registered
    /// target for it
    pub fn hack<F>(&self, point: impl Into<PointName>, procedure: F) -> HookResult<Hook>
    where
        F: Fn(&mut Invocation<'_>) -> HookResult<Value> + Send + Sync + 'static,
    {
        self.hack_with(point, BindOptions::new(), procedure)
    }

    /// [`hack`](ObjectHooks::hack) with explicit options
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
        if self.class.find_target(&point).is_none() {
            return Err(HookError::missing_target(self.class.name(), &point));
        }
        Ok(self.bind_with(point, options, procedure))
    }

    /// Best-effort [`hack`](ObjectHooks::hack): skips and returns `None`
    /// when the lineage has no target for `point`
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
        if self.class.find_target(&point).is_none() {
            return None;
        }
        Some(self.bind_with(point, options, procedure))
    }

    // --- resolution -----------------------------------------------------

    /// Full chain for `point`: this instance's hooks (newest first), then
    /// the class-side resolved chain. Object lists are tiny and change
    /// freely, so only the class side is memoized.
    fn resolve(&self, point: &PointName) -> Vec<Hook> {
        let mut chain = self.table.snapshot(point);
        chain.extend_from_slice(&self.class.resolved_chain(point));
        chain
    }

    // --- dispatch -------------------------------------------------------

    /// Run `point` for `receiver` with an inline original
    pub fn wrap_call<F>(
        &self,
        point: impl Into<PointName>,
        receiver: &dyn Any,
        args: Vec<Value>,
        original: F,
    ) -> HookResult<Value>
    where
        F: FnMut(&[Value]) -> HookResult<Value>,
    {
        self.wrap_call_with(point, receiver, args, Hints::new(), original)
    }

    /// [`wrap_call`](ObjectHooks::wrap_call) with caller-supplied hints
    pub fn wrap_call_with<F>(
        &self,
        point: impl Into<PointName>,
        receiver: &dyn Any,
        args: Vec<Value>,
        hints: Hints,
        mut original: F,
    ) -> HookResult<Value>
    where
        F: FnMut(&[Value]) -> HookResult<Value>,
    {
        dispatch::run(
            self.dispatcher_id,
            point.into(),
            Some(receiver),
            args,
            hints,
            |p| self.resolve(p),
            &mut original,
        )
    }

    /// Run `point` around an inline block with no receiver
    pub fn wrap_block<F>(&self, point: impl Into<PointName>, body: F) -> HookResult<Value>
    where
        F: FnMut() -> HookResult<Value>,
    {
        self.wrap_block_with(point, Hints::new(), body)
    }

    /// [`wrap_block`](ObjectHooks::wrap_block) with caller-supplied hints
    pub fn wrap_block_with<F>(&self, point: impl Into<PointName>, hints: Hints, mut body: F) -> HookResult<Value>
    where
        F: FnMut() -> HookResult<Value>,
    {
        let mut original = move |_args: &[Value]| body();
        dispatch::run(
            self.dispatcher_id,
            point.into(),
            None,
            Vec::new(),
            hints,
            |p| self.resolve(p),
            &mut original,
        )
    }

    /// Run `point` for `receiver` through the class lineage's registered
    /// target; errors if none was provided
    pub fn call_method(
        &self,
        point: impl Into<PointName>,
        receiver: &dyn Any,
        args: Vec<Value>,
    ) -> HookResult<Value> {
        self.call_method_with(point, receiver, args, Hints::new())
    }

    /// [`call_method`](ObjectHooks::call_method) with caller-supplied hints
    pub fn call_method_with(
        &self,
        point: impl Into<PointName>,
        receiver: &dyn Any,
        args: Vec<Value>,
        hints: Hints,
    ) -> HookResult<Value> {
        let point = point.into();
        let target = self
            .class
            .find_target(&point)
            .ok_or_else(|| HookError::missing_target(self.class.name(), &point))?;
        let mut original = move |args: &[Value]| target(Some(receiver), args);
        dispatch::run(
            self.dispatcher_id,
            point,
            Some(receiver),
            args,
            hints,
            |p| self.resolve(p),
            &mut original,
        )
    }
}

impl fmt::Debug for ObjectHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectHooks")
            .field("class", &self.class.name())
            .field("dispatcher_id", &self.dispatcher_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Widget;
    impl Intercept for Widget {}

    #[test]
    fn separate_instances_do_not_share_hooks() {
        let first = ObjectHooks::of::<Widget>();
        let second = ObjectHooks::of::<Widget>();

        first.bind("paint", |invocation| {
            invocation.proceed()?;
            Ok(json!("painted"))
        });

        let hooked = first.wrap_block("paint", || Ok(json!("raw"))).unwrap();
        let plain = second.wrap_block("paint", || Ok(json!("raw"))).unwrap();
        assert_eq!(hooked, json!("painted"));
        assert_eq!(plain, json!("raw"));
        first.unbind_all();
    }

    #[test]
    fn cloned_handles_share_the_same_lists() {
        let original = ObjectHooks::of::<Widget>();
        let handle = original.clone();

        handle.bind("resize", |invocation| {
            invocation.proceed()?;
            Ok(json!("resized"))
        });
        let value = original.wrap_block("resize", || Ok(json!("raw"))).unwrap();
        assert_eq!(value, json!("resized"));
        original.unbind_all();
    }

    #[test]
    fn object_hooks_run_before_class_hooks() {
        struct Layered;
        impl Intercept for Layered {}

        let class = ClassHooks::of::<Layered>();
        let object = ObjectHooks::of::<Layered>();

        let class_hook = class.bind("stack", |invocation| {
            let mut seen = invocation.proceed()?;
            seen.as_array_mut().unwrap().push(json!("class"));
            Ok(seen)
        });
        object.bind("stack", |invocation| {
            let mut seen = invocation.proceed()?;
            seen.as_array_mut().unwrap().push(json!("object"));
            Ok(seen)
        });

        let value = object.wrap_block("stack", || Ok(json!(["original"]))).unwrap();
        assert_eq!(value, json!(["original", "class", "object"]));

        object.unbind_all();
        class_hook.unbind();
    }

    #[test]
    fn hack_requires_a_class_target() {
        struct Gated;
        impl Intercept for Gated {}

        let object = ObjectHooks::of::<Gated>();
        assert!(matches!(
            object.hack("locked", |invocation| invocation.proceed()),
            Err(HookError::MissingTarget { .. })
        ));

        ClassHooks::of::<Gated>().provide("locked", |_receiver, _args| Ok(json!("open")));
        let hook = object.hack("locked", |invocation| invocation.proceed()).unwrap();
        assert_eq!(
            object.call_method("locked", &(), vec![]).unwrap(),
            json!("open")
        );
        hook.unbind();
    }

    #[test]
    fn call_method_passes_the_receiver_to_the_target() {
        struct Tagged {
            label: &'static str,
        }
        impl Intercept for Tagged {}

        ClassHooks::of::<Tagged>().provide("label", |receiver, _args| {
            let tagged = receiver
                .and_then(|any| any.downcast_ref::<Tagged>())
                .expect("receiver is a Tagged");
            Ok(json!(tagged.label))
        });

        let instance = Tagged { label: "alpha" };
        let hooks = ObjectHooks::of::<Tagged>();
        assert_eq!(
            hooks.call_method("label", &instance, vec![]).unwrap(),
            json!("alpha")
        );
    }
}
