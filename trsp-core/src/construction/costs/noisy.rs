#[cfg(test)]
#[path = "../../../tests/unit/construction/costs/noisy_test.rs"]
mod noisy_test;

use crate::models::common::{Cost, NodeId};
use crate::models::solution::{CostDelegate, Tour, TourChange};
use crate::utils::Noise;
use std::sync::Arc;

/// A cost delegate which adds noise to insertion costs of another delegate, tours are evaluated as is.
pub struct NoisyCostDelegate {
    inner: Arc<dyn CostDelegate>,
    noise: Noise,
}

impl NoisyCostDelegate {
    /// Creates a new instance of `NoisyCostDelegate`.
    pub fn new(inner: Arc<dyn CostDelegate>, noise: Noise) -> Self {
        Self { inner, noise }
    }
}

impl CostDelegate for NoisyCostDelegate {
    fn evaluate_tour(&self, tour: &Tour) -> Cost {
        self.inner.evaluate_tour(tour)
    }

    fn update_tour(&self, tour: &mut Tour, from: Option<NodeId>) -> Cost {
        self.inner.update_tour(tour, from)
    }

    fn evaluate_detour(&self, tour: &Tour, pred: Option<NodeId>, node: NodeId, succ: Option<NodeId>, is_removal: bool) -> Cost {
        self.inner.evaluate_detour(tour, pred, node, succ, is_removal)
    }

    fn insertion_cost(&self, tour: &Tour, pred: Option<NodeId>, node: NodeId, succ: Option<NodeId>) -> Cost {
        self.noise.generate(self.inner.insertion_cost(tour, pred, node, succ))
    }

    fn on_change(&self, tour: &mut Tour, change: &TourChange) {
        self.inner.on_change(tour, change)
    }
}
