//! Waylay
//!
//! Method interception for plain Rust types: declare named call points
//! inside your methods, then let other code wrap them with hooks that
//! observe, rewrite, retry, or veto the call without the callee knowing.
//!
//! Hooks stack newest-first, can be switched on and off without
//! rebinding, and can be managed together through groups. Points are
//! dispatched per object or per class, and class hooks reach every
//! instance of the class and of its declared descendants.
//!
//! # Example
//!
//! ```rust
//! use waylay::{HookResult, Intercept, ObjectHooks, Value, json};
//!
//! struct Greeter {
//!     hooks: ObjectHooks,
//! }
//!
//! impl Intercept for Greeter {}
//!
//! impl Greeter {
//!     fn greet(&self, name: &str) -> HookResult<Value> {
//!         self.hooks.wrap_call("greet", self, vec![json!(name)], |args| {
//!             Ok(json!(format!("Hello, {}.", args[0].as_str().unwrap_or("?"))))
//!         })
//!     }
//! }
//!
//! fn main() -> HookResult<()> {
//!     let greeter = Greeter { hooks: ObjectHooks::of::<Greeter>() };
//!     assert_eq!(greeter.greet("Leeroy")?, json!("Hello, Leeroy."));
//!
//!     // Reroute every greeting while the hook is bound
//!     let hook = greeter.hooks.bind("greet", |invocation| {
//!         invocation.args[0] = json!("Jenkins");
//!         invocation.proceed()
//!     });
//!     assert_eq!(greeter.greet("Leeroy")?, json!("Hello, Jenkins."));
//!
//!     hook.unbind();
//!     assert_eq!(greeter.greet("Leeroy")?, json!("Hello, Leeroy."));
//!     Ok(())
//! }
//! ```

// Re-export the engine surface from core
pub use waylay_core::{
    BindOptions, ClassHooks, ClassToken, GroupScope, Hints, Hook, HookError, HookGroup, HookProc,
    HookResult, Intercept, Invocation, ObjectHooks, PointName, TargetFn, Tracer, lineage,
};

// Value is the argument and result currency of every call point
pub use waylay_core::{Value, json};
