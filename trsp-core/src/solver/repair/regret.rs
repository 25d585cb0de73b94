#[cfg(test)]
#[path = "../../../tests/unit/solver/repair/regret_test.rs"]
mod regret_test;

use super::*;
use crate::construction::constraints::{ConstraintChecker, FeasibilityMode};
use crate::models::common::{Cost, NodeId};
use crate::models::solution::{CostDelegate, Tour};
use crate::utils::{Environment, LockToken, compare_floats};
use std::cmp::Ordering;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// A repair heuristic which inserts first the request which would lose most if it is not inserted now.
///
/// Regret of a request is the sum of cost differences between its best insertion and the next `k - 1`
/// best insertions into other tours. A request with less than `k` feasible tours has infinite regret.
/// Ties are broken by the cheaper best insertion, then by the lower request id. A request whose
/// evaluation failed takes part in selection only after its insertions into all tours are evaluated again.
pub struct RepairRegret {
    constraints: Arc<dyn ConstraintChecker>,
    environment: Arc<Environment>,
    cost_delegate: Option<Arc<dyn CostDelegate>>,
    feasibility: FeasibilityMode,
    k: usize,
    is_busy: AtomicBool,
    token: LockToken,
}

impl RepairRegret {
    /// Creates a new instance of `RepairRegret`, `k` is clamped to be at least 1.
    pub fn new(constraints: Arc<dyn ConstraintChecker>, environment: Arc<Environment>, k: usize) -> Self {
        Self {
            constraints,
            environment,
            cost_delegate: None,
            feasibility: FeasibilityMode::default(),
            k: k.max(1),
            is_busy: AtomicBool::new(false),
            token: LockToken::new(),
        }
    }

    /// Sets a cost delegate used to evaluate insertions instead of the tours' own delegates.
    pub fn with_cost_delegate(mut self, cost_delegate: Arc<dyn CostDelegate>) -> Self {
        self.cost_delegate = Some(cost_delegate);
        self
    }

    /// Sets the feasibility mode used to check insertions.
    pub fn with_feasibility_mode(mut self, feasibility: FeasibilityMode) -> Self {
        self.feasibility = feasibility;
        self
    }

    /// Returns the owner token used to lock solutions.
    pub fn token(&self) -> LockToken {
        self.token
    }

    /// Evaluates insertions of the request into all tours, a failed evaluation leaves the row stale.
    fn evaluate_row(&self, request: NodeId, tours: &[Tour], cache: &mut InsertionCache) {
        match evaluate_request(request, tours, self.constraints.as_ref(), self.feasibility, self.cost_delegate.as_deref()) {
            Ok(row) => cache.slot_mut(request).set_row(row),
            Err(fault) => {
                cache.slot_mut(request).invalidate();
                self.log_fault(fault);
            }
        }
    }

    fn log_fault(&self, fault: String) {
        (self.environment.logger)(&fault)
    }
}

impl Repair for RepairRegret {
    fn repair(&self, solution: &mut Solution) -> Result<RepairReport, RepairError> {
        let _busy = FlagGuard::try_raise(&self.is_busy).ok_or(RepairError::Busy)?;

        let lock = solution.lock().clone();
        let _guard = lock.try_acquire(self.token, self.environment.lock_timeout)?;

        let instance = solution.instance().clone();
        let constraints = self.constraints.as_ref();
        let cost_delegate = self.cost_delegate.as_deref();
        let mut cache = InsertionCache::new(instance.max_id(), instance.fleet_size());
        let mut moves = vec![];

        for request in solution.unserved_requests().iter().copied().collect::<Vec<_>>() {
            self.evaluate_row(request, solution.tours(), &mut cache);
        }

        loop {
            let Some(insertion) = solution
                .unserved_requests()
                .iter()
                .filter_map(|&request| {
                    let slot = cache.slot(request);
                    slot.best().map(|best| (get_regret(slot, self.k), best))
                })
                .fold(None, |selected: Option<(Cost, &InsertionMove)>, (regret, best)| match selected {
                    Some(selected) if !is_preferred((regret, best), selected) => Some(selected),
                    _ => Some((regret, best)),
                })
                .map(|(_, insertion)| insertion.clone())
            else {
                break;
            };

            let technician = insertion.technician;
            insertion.execute(solution.tour_mut(technician)).map_err(|source| RepairError::Execution {
                insertion: Box::new(insertion.clone()),
                source,
            })?;

            solution.mark_as_served(insertion.node);
            cache.slot_mut(insertion.node).clear();
            moves.push(insertion);

            let tour = solution.tour(technician);
            for &request in solution.unserved_requests() {
                if cache.slot(request).is_stale() {
                    self.evaluate_row(request, solution.tours(), &mut cache);
                    continue;
                }

                match guarded(request, || evaluate_tour(request, tour, constraints, self.feasibility, cost_delegate)) {
                    Ok(insertion) => cache.slot_mut(request).set_insertion(technician, insertion),
                    Err(fault) => {
                        cache.slot_mut(request).invalidate();
                        self.log_fault(fault);
                    }
                }
            }
        }

        let report = create_report(solution, moves);
        (self.environment.logger)(&format!(
            "regret-{}: {} request(s) inserted, {} left unserved",
            self.k,
            report.moves.len(),
            report.unserved.len()
        ));

        Ok(report)
    }
}

/// Returns the regret value of the request: the sum of cost differences between the best insertion and
/// the next `k - 1` best ones.
fn get_regret(slot: &RequestSlot, k: usize) -> Cost {
    let insertions = slot.sorted_insertions();

    match insertions.first() {
        Some(best) if insertions.len() >= k => insertions.iter().skip(1).take(k - 1).map(|other| other.cost - best.cost).sum(),
        _ => Cost::INFINITY,
    }
}

/// Checks whether the candidate should be selected over the current one, candidates come in ascending
/// request order so equal ones keep the current selection.
fn is_preferred(candidate: (Cost, &InsertionMove), current: (Cost, &InsertionMove)) -> bool {
    match compare_floats(candidate.0, current.0) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => compare_floats(candidate.1.cost, current.1.cost) == Ordering::Less,
    }
}
