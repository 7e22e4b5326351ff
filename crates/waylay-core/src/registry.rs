//! Process-wide chain-cache invalidation

use dashmap::DashMap;

use crate::point::PointName;

/// Per-name generation counters shared by every dispatcher.
///
/// A chain cached at generation G for a name stays valid while the
/// name's current generation is still G; bumping the counter invalidates
/// every dispatcher's cached chain for that name at once. Keying by name
/// only (not class + name) over-invalidates but can never leave a stale
/// chain observable.
static GENERATIONS: once_cell::sync::Lazy<DashMap<PointName, u64>> =
    once_cell::sync::Lazy::new(DashMap::new);

/// Current generation for `point` (0 until first invalidated)
pub(crate) fn generation(point: &PointName) -> u64 {
    GENERATIONS.get(point).map(|entry| *entry).unwrap_or(0)
}

/// Invalidate every cached chain for `point`
pub(crate) fn invalidate(point: &PointName) {
    let current = {
        let mut entry = GENERATIONS.entry(point.clone()).or_insert(0);
        *entry += 1;
        *entry
    };
    tracing::trace!("invalidated cached chains for `{}` (generation {})", point, current);
}
