//! Shared dispatch path: reentrancy guard, fast path, chain execution

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;
use tracing::trace;

use crate::error::HookResult;
use crate::hook::Hook;
use crate::invocation::Invocation;
use crate::point::{Hints, PointName};

/// Monotonic dispatcher-instance ids; the reentrancy guard is keyed by
/// (id, point) so separate dispatchers never mask each other.
static NEXT_DISPATCHER_ID: AtomicU64 = AtomicU64::new(0);

pub(crate) fn next_dispatcher_id() -> u64 {
    NEXT_DISPATCHER_ID.fetch_add(1, Ordering::Relaxed)
}

thread_local! {
    /// (dispatcher id, point) pairs currently dispatching on this thread
    static ACTIVE: RefCell<HashSet<(u64, PointName)>> = RefCell::new(HashSet::new());
}

/// RAII hold on one (dispatcher, point) guard slot
struct ActiveEntry {
    key: (u64, PointName),
}

impl ActiveEntry {
    /// Claim the slot, or `None` if this thread is already dispatching
    /// the same point on the same dispatcher
    fn enter(dispatcher_id: u64, point: &PointName) -> Option<ActiveEntry> {
        let key = (dispatcher_id, point.clone());
        let entered = ACTIVE.with(|active| active.borrow_mut().insert(key.clone()));
        entered.then_some(ActiveEntry { key })
    }
}

impl Drop for ActiveEntry {
    fn drop(&mut self) {
        ACTIVE.with(|active| {
            active.borrow_mut().remove(&self.key);
        });
    }
}

/// Route one wrapped call.
///
/// Reentered for a point already dispatching on this dispatcher and
/// thread, it calls straight through without resolving: a point fires
/// its hooks once per logical external call no matter how many internal
/// paths reach it. An empty chain also calls straight through without
/// allocating an [`Invocation`]. Otherwise the chain runs to completion
/// (or error) through a fresh invocation, and the guard slot is released
/// on every exit path.
pub(crate) fn run<R>(
    dispatcher_id: u64,
    point: PointName,
    receiver: Option<&dyn Any>,
    args: Vec<Value>,
    hints: Hints,
    resolve: R,
    original: &mut dyn FnMut(&[Value]) -> HookResult<Value>,
) -> HookResult<Value>
where
    R: FnOnce(&PointName) -> Vec<Hook>,
{
    let Some(_active) = ActiveEntry::enter(dispatcher_id, &point) else {
        trace!("reentered `{}` on dispatcher {}, calling through", point, dispatcher_id);
        return original(&args);
    };
    let chain = resolve(&point);
    if chain.is_empty() {
        return original(&args);
    }
    let mut invocation = Invocation::new(point, receiver, args, hints, chain, original);
    invocation.proceed()
}
