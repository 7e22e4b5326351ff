//! Per-call execution context and chain traversal

use std::any::Any;
use std::fmt;

use serde_json::Value;

use crate::error::HookResult;
use crate::hook::Hook;
use crate::point::{Hints, PointName};

/// Mutable execution context for one intercepted call.
///
/// Hook procedures receive `&mut Invocation` and drive the rest of the
/// chain with [`proceed`](Invocation::proceed). Arguments are a public
/// field so hooks can rewrite them before proceeding; everything else is
/// read through accessors. An invocation is created fresh per call and
/// never shared or pooled.
pub struct Invocation<'a> {
    /// Call arguments; hooks may rewrite them before proceeding
    pub args: Vec<Value>,
    point: PointName,
    receiver: Option<&'a dyn Any>,
    hints: Hints,
    chain: Vec<Hook>,
    cursor: usize,
    result: Option<Value>,
    original: &'a mut dyn FnMut(&[Value]) -> HookResult<Value>,
}

impl<'a> Invocation<'a> {
    pub(crate) fn new(
        point: PointName,
        receiver: Option<&'a dyn Any>,
        args: Vec<Value>,
        hints: Hints,
        chain: Vec<Hook>,
        original: &'a mut dyn FnMut(&[Value]) -> HookResult<Value>,
    ) -> Self {
        Self {
            args,
            point,
            receiver,
            hints,
            chain,
            cursor: 0,
            result: None,
            original,
        }
    }

    /// Name of the interception point being dispatched
    pub fn point(&self) -> &PointName {
        &self.point
    }

    /// The object the intercepted call acts on, if any (block and
    /// class-scope wraps have none)
    pub fn receiver(&self) -> Option<&'a dyn Any> {
        self.receiver
    }

    /// The receiver downcast to a concrete type
    pub fn receiver_as<T: 'static>(&self) -> Option<&'a T> {
        self.receiver?.downcast_ref::<T>()
    }

    /// Caller-supplied hints for this call
    pub fn hints(&self) -> &Hints {
        &self.hints
    }

    /// A single hint by key
    pub fn hint(&self, key: &str) -> Option<&Value> {
        self.hints.get(key)
    }

    /// Result of the innermost completed link; `None` until some
    /// `proceed` call has returned
    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    /// The hooks this call runs through, outermost first
    pub fn chain(&self) -> &[Hook] {
        &self.chain
    }

    /// Advance to the next chain link, or to the original behavior once
    /// the chain is exhausted.
    ///
    /// The link's return value is stored as [`result`](Invocation::result)
    /// and returned. A hook may call this zero times (veto: supply a
    /// result without reaching the original), once (wrap), or several
    /// times (retry). Errors from deeper links propagate unmodified, and
    /// the cursor is restored before they do, so a hook holding the
    /// invocation can legally proceed again after a failure.
    pub fn proceed(&mut self) -> HookResult<Value> {
        let Some(hook) = self.chain.get(self.cursor).cloned() else {
            let value = (self.original)(&self.args)?;
            self.result = Some(value.clone());
            return Ok(value);
        };
        self.cursor += 1;
        let outcome = hook.call(self);
        self.cursor -= 1;
        let value = outcome?;
        self.result = Some(value.clone());
        Ok(value)
    }
}

impl fmt::Debug for Invocation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("point", &self.point)
            .field("args", &self.args)
            .field("cursor", &self.cursor)
            .field("chain", &self.chain.len())
            .field("result", &self.result)
            .finish()
    }
}
