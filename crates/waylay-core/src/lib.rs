//! Waylay Core Library
//!
//! This crate provides the interception engine itself: named call points,
//! ordered hook chains at object and class scope, the invocation walker
//! with `proceed`, and hook lifecycle management (enable/disable, groups,
//! unbind).

pub mod class;
pub mod error;
pub mod group;
pub mod hook;
pub mod invocation;
pub mod object;
pub mod point;
pub mod tracer;

mod dispatch;
mod registry;
mod table;

// Re-export commonly used types
pub use class::{ClassHooks, ClassToken, Intercept, TargetFn, lineage};
pub use error::{HookError, HookResult};
pub use group::{GroupScope, HookGroup};
pub use hook::{BindOptions, Hook, HookProc};
pub use invocation::Invocation;
pub use object::ObjectHooks;
pub use point::{Hints, PointName};
pub use tracer::Tracer;

// Value is the argument and result currency of every call point
pub use serde_json::{Value, json};
