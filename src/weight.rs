//! Running payload check against the container's weight limit.

use crate::types::Weighted;

/// Tracks the loaded weight and refuses anything that would exceed the limit.
#[derive(Clone, Copy, Debug)]
pub struct WeightGuard {
    max_weight: f64,
    loaded: f64,
    epsilon: f64,
}

impl WeightGuard {
    pub fn new(max_weight: f64, epsilon: f64) -> Self {
        Self {
            max_weight,
            loaded: 0.0,
            epsilon,
        }
    }

    /// `true` if adding `item` keeps the payload within the limit.
    #[inline]
    pub fn admits(&self, item: &impl Weighted) -> bool {
        self.loaded + item.weight() <= self.max_weight + self.epsilon
    }

    /// Adds the weight of a committed placement.
    pub fn commit(&mut self, item: &impl Weighted) {
        self.loaded += item.weight();
    }

    /// Weight loaded so far.
    pub fn loaded(&self) -> f64 {
        self.loaded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EPSILON_GENERAL;

    struct Crate(f64);

    impl Weighted for Crate {
        fn weight(&self) -> f64 {
            self.0
        }
    }

    #[test]
    fn admits_up_to_the_limit() {
        let mut guard = WeightGuard::new(15.0, EPSILON_GENERAL);
        for _ in 0..3 {
            assert!(guard.admits(&Crate(5.0)));
            guard.commit(&Crate(5.0));
        }
        assert!(!guard.admits(&Crate(5.0)));
        assert!((guard.loaded() - 15.0).abs() < EPSILON_GENERAL);
    }

    #[test]
    fn zero_limit_admits_nothing() {
        let guard = WeightGuard::new(0.0, EPSILON_GENERAL);
        assert!(!guard.admits(&Crate(0.5)));
    }
}
