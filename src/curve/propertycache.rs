use std::sync::OnceLock;

/// Derived boolean properties of a curve that are worth memoizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveProperty {
    Continuous,
    Finite,
    UltimatelyAffine,
    UltimatelyInfinite,
    NonDecreasing,
    Concave,
    Convex,
    SubAdditive,
    SuperAdditive
}

const PROPERTY_COUNT: usize = 9;

/// Write-once cache of curve properties. Slots are never invalidated.
#[derive(Debug, Clone, Default)]
pub struct PropertyCache {
    slots: [OnceLock<bool>; PROPERTY_COUNT]
}

impl PropertyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compute(&self, property: CurveProperty, compute: impl FnOnce() -> bool) -> bool {
        *self.slots[property as usize].get_or_init(compute)
    }

    pub fn get(&self, property: CurveProperty) -> Option<bool> {
        self.slots[property as usize].get().copied()
    }

    /// Records a property known from construction, e.g. from a shape tag.
    pub fn seed(&self, property: CurveProperty, value: bool) {
        let _ = self.slots[property as usize].set(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computes_once() {
        let cache = PropertyCache::new();
        let mut calls = 0;
        assert!(cache.get_or_compute(CurveProperty::Concave, || { calls += 1; true }));
        assert!(cache.get_or_compute(CurveProperty::Concave, || { calls += 1; false }));
        assert_eq!(calls, 1);
        assert_eq!(cache.get(CurveProperty::Convex), None);
    }

    #[test]
    fn seeded_values_win() {
        let cache = PropertyCache::new();
        cache.seed(CurveProperty::Finite, false);
        assert!(!cache.get_or_compute(CurveProperty::Finite, || true));
    }
}
