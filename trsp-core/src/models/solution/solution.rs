#[cfg(test)]
#[path = "../../../tests/unit/models/solution/solution_test.rs"]
mod solution_test;

use crate::models::common::{Cost, NodeId};
use crate::models::problem::Instance;
use crate::models::solution::{CostDelegate, Tour, TourError};
use crate::utils::{AdvisoryLock, GenericResult, LockError, LockGuard, LockToken};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

/// Represents a solution: one tour per technician and a set of requests which are not served yet.
pub struct Solution {
    instance: Arc<Instance>,
    cost_delegate: Arc<dyn CostDelegate>,
    tours: Vec<Tour>,
    unserved: BTreeSet<NodeId>,
    lock: Arc<AdvisoryLock>,
}

impl Solution {
    /// Creates a new solution with empty tours and all released requests unserved.
    pub fn new(instance: Arc<Instance>, cost_delegate: Arc<dyn CostDelegate>) -> Self {
        let tours = (0..instance.fleet_size())
            .map(|technician| Tour::new(instance.clone(), technician, cost_delegate.clone()))
            .collect();
        let unserved = instance.released_requests().collect();

        Self { instance, cost_delegate, tours, unserved, lock: Arc::new(AdvisoryLock::default()) }
    }

    /// Appends home and home duplicate to every empty tour.
    pub fn initialize_tours(&mut self) -> Result<(), TourError> {
        self.tours.iter_mut().filter(|tour| tour.is_empty()).try_for_each(|tour| tour.initialize())
    }

    /// Returns the instance.
    pub fn instance(&self) -> &Arc<Instance> {
        &self.instance
    }

    /// Returns the cost delegate.
    pub fn cost_delegate(&self) -> &Arc<dyn CostDelegate> {
        &self.cost_delegate
    }

    /// Returns all tours.
    pub fn tours(&self) -> &[Tour] {
        self.tours.as_slice()
    }

    /// Returns the tour of given technician.
    pub fn tour(&self, technician: usize) -> &Tour {
        &self.tours[technician]
    }

    /// Returns the tour of given technician as mutable.
    pub fn tour_mut(&mut self, technician: usize) -> &mut Tour {
        &mut self.tours[technician]
    }

    /// Returns unserved requests in ascending order.
    pub fn unserved_requests(&self) -> &BTreeSet<NodeId> {
        &self.unserved
    }

    /// Checks whether the request is not served.
    pub fn is_unserved(&self, request: NodeId) -> bool {
        self.unserved.contains(&request)
    }

    /// Marks the request as served: it has to be already visited by some tour.
    pub fn mark_as_served(&mut self, request: NodeId) -> bool {
        debug_assert!(self.visiting_tour(request).is_some(), "served request {request} is not in any tour");
        self.unserved.remove(&request)
    }

    /// Marks the request as unserved: it should not be visited by any tour.
    pub fn mark_as_unserved(&mut self, request: NodeId) -> bool {
        debug_assert!(self.visiting_tour(request).is_none(), "unserved request {request} is still in a tour");
        self.unserved.insert(request)
    }

    /// Returns index of the tour which visits the node.
    pub fn visiting_tour(&self, node: NodeId) -> Option<usize> {
        self.tours.iter().position(|tour| tour.is_visited(node))
    }

    /// Returns the sum of tour costs.
    pub fn total_cost(&self) -> Cost {
        self.tours.iter().map(|tour| tour.total_cost()).sum()
    }

    /// Checks that every released request is either unserved or visited by exactly one tour.
    pub fn check_membership(&self) -> GenericResult<()> {
        for request in self.instance.released_requests() {
            let visits = self.tours.iter().filter(|tour| tour.is_visited(request)).count();
            let unserved = usize::from(self.unserved.contains(&request));

            if visits + unserved != 1 {
                return Err(format!(
                    "request {request} is visited by {visits} tour(s) and is {}in unserved set",
                    if unserved == 1 { "" } else { "not " }
                )
                .into());
            }
        }

        Ok(())
    }

    /// Tries to acquire the solution's advisory lock.
    pub fn try_lock(&self, token: LockToken, timeout: Duration) -> Result<LockGuard, LockError> {
        self.lock.try_acquire(token, timeout)
    }

    /// Returns the solution's advisory lock.
    pub fn lock(&self) -> &Arc<AdvisoryLock> {
        &self.lock
    }
}

impl Clone for Solution {
    fn clone(&self) -> Self {
        Self {
            instance: self.instance.clone(),
            cost_delegate: self.cost_delegate.clone(),
            tours: self.tours.clone(),
            unserved: self.unserved.clone(),
            lock: Arc::new(AdvisoryLock::default()),
        }
    }
}
