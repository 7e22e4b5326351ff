//! Chain ordering integration test
//!
//! This test verifies the dispatch order guarantees: later binds run
//! before earlier ones, object hooks wrap class hooks, and class hooks
//! reach every instance and every declared descendant.

use std::sync::{Arc, Mutex};

use waylay::{ClassHooks, ClassToken, Intercept, ObjectHooks, json, lineage};

#[test]
fn test_last_bound_hook_runs_first() {
    struct Stack;
    impl Intercept for Stack {}

    let hooks = ObjectHooks::of::<Stack>();
    let order = Arc::new(Mutex::new(Vec::new()));
    for tag in ["first", "second", "third"] {
        let order = order.clone();
        hooks.bind("run", move |invocation| {
            order.lock().unwrap().push(tag);
            invocation.proceed()
        });
    }

    hooks.wrap_block("run", || Ok(json!(null))).unwrap();
    assert_eq!(*order.lock().unwrap(), ["third", "second", "first"]);
}

#[test]
fn test_object_hooks_wrap_class_hooks() {
    struct Pipeline;
    impl Intercept for Pipeline {}

    let class = ClassHooks::of::<Pipeline>();
    let object = ObjectHooks::of::<Pipeline>();

    // Each layer appends its tag after proceeding, so inner layers land first
    let class_hook = class.bind("process", |invocation| {
        let mut trail = invocation.proceed()?;
        trail.as_array_mut().unwrap().push(json!("class_hook"));
        Ok(trail)
    });
    object.bind("process", |invocation| {
        let mut trail = invocation.proceed()?;
        trail.as_array_mut().unwrap().push(json!("object_hook"));
        Ok(trail)
    });

    let trail = object
        .wrap_block("process", || Ok(json!(["original"])))
        .unwrap();
    assert_eq!(trail, json!(["original", "class_hook", "object_hook"]));

    object.unbind_all();
    class_hook.unbind();
}

#[test]
fn test_class_hooks_affect_every_instance() {
    struct Sensor;
    impl Intercept for Sensor {}

    let class = ClassHooks::of::<Sensor>();
    let hook = class.bind("read", |invocation| {
        invocation.proceed()?;
        Ok(json!("calibrated"))
    });

    let first = ObjectHooks::of::<Sensor>();
    let second = ObjectHooks::of::<Sensor>();
    let read = |hooks: &ObjectHooks| hooks.wrap_block("read", || Ok(json!("raw"))).unwrap();

    assert_eq!(read(&first), json!("calibrated"));
    assert_eq!(read(&second), json!("calibrated"));

    hook.unbind();
    assert_eq!(read(&first), json!("raw"));
    assert_eq!(read(&second), json!("raw"));
}

#[test]
fn test_ancestor_hooks_reach_descendants() {
    struct Base;
    impl Intercept for Base {}
    struct Middle;
    impl Intercept for Middle {
        fn superclasses() -> Vec<ClassToken> {
            lineage::<Base>()
        }
    }
    struct Leaf;
    impl Intercept for Leaf {
        fn superclasses() -> Vec<ClassToken> {
            lineage::<Middle>()
        }
    }

    let base = ClassHooks::of::<Base>();
    let base_hook = base.bind("emit", |invocation| {
        let mut trail = invocation.proceed()?;
        trail.as_array_mut().unwrap().push(json!("base"));
        Ok(trail)
    });

    // Middle has no dispatcher yet, so the walk skips straight to Base
    let leaf = ClassHooks::of::<Leaf>();
    let trail = leaf.wrap_block("emit", || Ok(json!(["original"]))).unwrap();
    assert_eq!(trail, json!(["original", "base"]));

    // Once Middle holds hooks the walk stops there and Middle continues to Base
    let middle = ClassHooks::of::<Middle>();
    let middle_hook = middle.bind("emit", |invocation| {
        let mut trail = invocation.proceed()?;
        trail.as_array_mut().unwrap().push(json!("middle"));
        Ok(trail)
    });
    let trail = leaf.wrap_block("emit", || Ok(json!(["original"]))).unwrap();
    assert_eq!(trail, json!(["original", "base", "middle"]));

    middle_hook.unbind();
    base_hook.unbind();
}

#[test]
fn test_hook_observes_before_and_after() {
    struct Timer;
    impl Intercept for Timer {}

    let hooks = ObjectHooks::of::<Timer>();
    let phases = Arc::new(Mutex::new(Vec::new()));
    let seen = phases.clone();
    hooks.bind("tick", move |invocation| {
        seen.lock().unwrap().push("before".to_string());
        let value = invocation.proceed()?;
        seen.lock().unwrap().push(format!("after={value}"));
        Ok(value)
    });

    let value = hooks.wrap_block("tick", || Ok(json!(7))).unwrap();
    assert_eq!(value, json!(7));
    assert_eq!(
        *phases.lock().unwrap(),
        ["before".to_string(), "after=7".to_string()]
    );
}
