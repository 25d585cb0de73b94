#[cfg(test)]
#[path = "../../../tests/unit/solver/repair/best_insertion_test.rs"]
mod best_insertion_test;

use super::*;
use crate::construction::constraints::{ConstraintChecker, FeasibilityMode};
use crate::models::solution::Tour;
use crate::utils::{Environment, LockToken, ThreadPool, parallel_into_collect};
use rustc_hash::FxHashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

/// A batch smaller than this is evaluated on the calling thread even in parallel mode.
const MIN_PARALLEL_BATCH: usize = 2;

enum Executor {
    Sequential,
    Parallel(ThreadPool),
}

impl Executor {
    fn new(mode: ExecutionMode) -> Result<Self, RepairError> {
        match mode {
            ExecutionMode::Sequential => Ok(Executor::Sequential),
            ExecutionMode::Parallel { workers } => ThreadPool::new(workers).map(Executor::Parallel).map_err(RepairError::Pool),
        }
    }

    fn mode(&self) -> ExecutionMode {
        match self {
            Executor::Sequential => ExecutionMode::Sequential,
            Executor::Parallel(pool) => ExecutionMode::Parallel { workers: pool.num_threads() },
        }
    }
}

/// A repair heuristic which repeatedly inserts the request with the globally cheapest feasible insertion.
///
/// After each insertion only requests whose best insertion was into a modified tour are re-evaluated,
/// other requests reuse their cached insertions. A request whose evaluation failed is re-evaluated on
/// the next iteration. Evaluation of requests can be distributed over a thread
/// pool: the selected moves are the same as with sequential evaluation.
pub struct RepairBestInsertion {
    constraints: Arc<dyn ConstraintChecker>,
    environment: Arc<Environment>,
    feasibility: FeasibilityMode,
    executor: RwLock<Executor>,
    is_busy: AtomicBool,
    is_batch_active: AtomicBool,
    token: LockToken,
}

impl RepairBestInsertion {
    /// Creates a new instance of `RepairBestInsertion`.
    pub fn new(
        constraints: Arc<dyn ConstraintChecker>,
        environment: Arc<Environment>,
        mode: ExecutionMode,
    ) -> Result<Self, RepairError> {
        Ok(Self {
            constraints,
            environment,
            feasibility: FeasibilityMode::default(),
            executor: RwLock::new(Executor::new(mode)?),
            is_busy: AtomicBool::new(false),
            is_batch_active: AtomicBool::new(false),
            token: LockToken::new(),
        })
    }

    /// Creates a new instance of `RepairBestInsertion` which uses all available CPUs.
    pub fn new_with_defaults(constraints: Arc<dyn ConstraintChecker>, environment: Arc<Environment>) -> Result<Self, RepairError> {
        let workers = environment.parallelism.available_cpus();
        Self::new(constraints, environment, ExecutionMode::Parallel { workers })
    }

    /// Sets the feasibility mode used to check insertions.
    pub fn with_feasibility_mode(mut self, feasibility: FeasibilityMode) -> Self {
        self.feasibility = feasibility;
        self
    }

    /// Returns the current execution mode.
    pub fn execution_mode(&self) -> ExecutionMode {
        self.executor.read().unwrap_or_else(|poisoned| poisoned.into_inner()).mode()
    }

    /// Recreates the worker pool with the given amount of workers. Fails if a batch is being evaluated.
    pub fn set_worker_count(&self, workers: usize) -> Result<(), RepairError> {
        if self.is_batch_active.load(Ordering::Acquire) {
            return Err(RepairError::BatchInProgress);
        }

        let executor = Executor::new(ExecutionMode::Parallel { workers })?;
        // a batch started after the check above holds the read lock, so it is drained here
        *self.executor.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = executor;

        Ok(())
    }

    /// Returns the owner token used to lock solutions.
    pub fn token(&self) -> LockToken {
        self.token
    }

    /// Evaluates all pending requests, re-evaluating insertions of the requests in `targets`,
    /// and returns the globally cheapest insertion.
    fn evaluate(
        &self,
        tours: &[Tour],
        pending: &[NodeId],
        targets: &FxHashSet<NodeId>,
        cache: &mut InsertionCache,
    ) -> Option<InsertionMove> {
        let constraints = self.constraints.as_ref();
        let feasibility = self.feasibility;
        let best = BestInsertion::new();

        let tasks = cache.slots_mut(pending).into_iter().enumerate().collect::<Vec<_>>();
        let run_task = |(rank, (request, slot)): (usize, (NodeId, &mut RequestSlot))| -> Option<String> {
            let mut fault = None;

            if targets.contains(&request) {
                match evaluate_request(request, tours, constraints, feasibility, None) {
                    Ok(row) => slot.set_row(row),
                    Err(err) => {
                        slot.invalidate();
                        fault = Some(err);
                    }
                }
            }

            if let Some(insertion) = slot.best() {
                best.offer(rank, insertion);
            }

            fault
        };

        let executor = self.executor.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        let faults: Vec<Option<String>> = match &*executor {
            Executor::Parallel(pool) if targets.len() >= MIN_PARALLEL_BATCH => {
                let _batch = FlagGuard::try_raise(&self.is_batch_active);
                pool.execute(|| parallel_into_collect(tasks, run_task))
            }
            _ => tasks.into_iter().map(run_task).collect(),
        };

        faults.into_iter().flatten().for_each(|fault| (self.environment.logger)(&fault));

        best.into_inner()
    }
}

impl Repair for RepairBestInsertion {
    fn repair(&self, solution: &mut Solution) -> Result<RepairReport, RepairError> {
        let _busy = FlagGuard::try_raise(&self.is_busy).ok_or(RepairError::Busy)?;

        let lock = solution.lock().clone();
        let _guard = lock.try_acquire(self.token, self.environment.lock_timeout)?;

        let instance = solution.instance().clone();
        let mut cache = InsertionCache::new(instance.max_id(), instance.fleet_size());
        let mut modified: Option<usize> = None;
        let mut moves = vec![];

        loop {
            let pending = solution.unserved_requests().iter().copied().collect::<Vec<_>>();
            if pending.is_empty() {
                break;
            }

            let targets = pending
                .iter()
                .copied()
                .filter(|&request| {
                    let slot = cache.slot(request);
                    modified.is_none() || slot.is_stale() || slot.best_tour() == modified
                })
                .collect::<FxHashSet<_>>();

            let Some(insertion) = self.evaluate(solution.tours(), &pending, &targets, &mut cache) else {
                break;
            };

            insertion.execute(solution.tour_mut(insertion.technician)).map_err(|source| {
                RepairError::Execution { insertion: Box::new(insertion.clone()), source }
            })?;

            solution.mark_as_served(insertion.node);
            cache.slot_mut(insertion.node).clear();
            modified = Some(insertion.technician);
            moves.push(insertion);
        }

        let report = create_report(solution, moves);
        (self.environment.logger)(&format!(
            "best insertion: {} request(s) inserted, {} left unserved",
            report.moves.len(),
            report.unserved.len()
        ));

        Ok(report)
    }
}
