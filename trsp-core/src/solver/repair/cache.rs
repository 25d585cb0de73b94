use crate::construction::constraints::{ConstraintChecker, FeasibilityMode};
use crate::construction::heuristics::{InsertionMove, best_insertion};
use crate::models::common::NodeId;
use crate::models::solution::{CostDelegate, Tour};
use crate::utils::compare_floats;
use std::any::Any;
use std::cmp::Ordering;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Mutex;

/// Keeps the best insertion of a request into each tour and the best one among them.
#[derive(Clone, Debug, Default)]
pub(crate) struct RequestSlot {
    row: Vec<Option<InsertionMove>>,
    best: Option<InsertionMove>,
    is_stale: bool,
}

impl RequestSlot {
    /// Replaces the whole row.
    pub fn set_row(&mut self, row: Vec<Option<InsertionMove>>) {
        self.row = row;
        self.best = select_best(&self.row);
        self.is_stale = false;
    }

    /// Drops all cached insertions after a failed evaluation: the row is treated as infeasible until
    /// it is replaced as a whole.
    pub fn invalidate(&mut self) {
        self.clear();
        self.is_stale = true;
    }

    /// Checks whether the row has to be evaluated again for every tour.
    pub fn is_stale(&self) -> bool {
        self.is_stale
    }

    /// Replaces the insertion into one tour.
    pub fn set_insertion(&mut self, technician: usize, insertion: Option<InsertionMove>) {
        self.row[technician] = insertion;
        self.best = select_best(&self.row);
    }

    /// Removes all cached insertions.
    pub fn clear(&mut self) {
        self.row.iter_mut().for_each(|insertion| *insertion = None);
        self.best = None;
    }

    /// Returns the cheapest insertion among all tours.
    pub fn best(&self) -> Option<&InsertionMove> {
        self.best.as_ref()
    }

    /// Returns the tour of the cheapest insertion.
    pub fn best_tour(&self) -> Option<usize> {
        self.best.as_ref().map(|insertion| insertion.technician)
    }

    /// Returns feasible insertions ordered by cost.
    pub fn sorted_insertions(&self) -> Vec<&InsertionMove> {
        let mut insertions = self.row.iter().flatten().collect::<Vec<_>>();
        insertions.sort_by(|a, b| compare_floats(a.cost, b.cost));

        insertions
    }
}

/// A request x tour cost matrix reused between iterations of repair.
pub(crate) struct InsertionCache {
    slots: Vec<RequestSlot>,
}

impl InsertionCache {
    /// Creates a cache for node ids in `[0, max_id)` and given amount of tours.
    pub fn new(max_id: usize, tour_count: usize) -> Self {
        Self { slots: vec![RequestSlot { row: vec![None; tour_count], best: None, is_stale: false }; max_id] }
    }

    pub fn slot(&self, request: NodeId) -> &RequestSlot {
        &self.slots[request]
    }

    pub fn slot_mut(&mut self, request: NodeId) -> &mut RequestSlot {
        &mut self.slots[request]
    }

    /// Returns mutable slots of given requests which have to be sorted in ascending order.
    pub fn slots_mut(&mut self, requests: &[NodeId]) -> Vec<(NodeId, &mut RequestSlot)> {
        debug_assert!(requests.windows(2).all(|pair| pair[0] < pair[1]));

        let mut wanted = requests.iter().copied().peekable();
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(request, slot)| {
                if wanted.peek() == Some(&request) {
                    wanted.next();
                    Some((request, slot))
                } else {
                    None
                }
            })
            .collect()
    }
}

/// Keeps the best insertion found so far across requests, ties are resolved in favour of the lower rank.
pub(crate) struct BestInsertion(Mutex<Option<(usize, InsertionMove)>>);

impl BestInsertion {
    pub fn new() -> Self {
        Self(Mutex::new(None))
    }

    /// Offers a candidate with its rank in the request iteration order.
    pub fn offer(&self, rank: usize, insertion: &InsertionMove) {
        let mut best = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let is_better = match best.as_ref() {
            Some((best_rank, best)) => match compare_floats(insertion.cost, best.cost) {
                Ordering::Less => true,
                Ordering::Equal => rank < *best_rank,
                Ordering::Greater => false,
            },
            None => true,
        };

        if is_better {
            *best = Some((rank, insertion.clone()));
        }
    }

    pub fn into_inner(self) -> Option<InsertionMove> {
        self.0.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner()).map(|(_, insertion)| insertion)
    }
}

/// Evaluates the best insertion of the request into every tour using either given cost delegate or
/// the tour's own one.
pub(crate) fn evaluate_request(
    request: NodeId,
    tours: &[Tour],
    constraints: &dyn ConstraintChecker,
    mode: FeasibilityMode,
    cost_delegate: Option<&dyn CostDelegate>,
) -> Result<Vec<Option<InsertionMove>>, String> {
    guarded(request, || tours.iter().map(|tour| evaluate_tour(request, tour, constraints, mode, cost_delegate)).collect())
}

/// Runs the evaluation of the request catching a panic raised by it, the panic is returned as an error message.
pub(crate) fn guarded<R>(request: NodeId, evaluation: impl FnOnce() -> R) -> Result<R, String> {
    catch_unwind(AssertUnwindSafe(evaluation))
        .map_err(|panic| format!("evaluation of request {request} failed: {}", panic_message(panic.as_ref())))
}

/// Evaluates the best insertion of the request into one tour, see [evaluate_request].
pub(crate) fn evaluate_tour(
    request: NodeId,
    tour: &Tour,
    constraints: &dyn ConstraintChecker,
    mode: FeasibilityMode,
    cost_delegate: Option<&dyn CostDelegate>,
) -> Option<InsertionMove> {
    let cost_delegate: &dyn CostDelegate = match cost_delegate {
        Some(cost_delegate) => cost_delegate,
        None => tour.cost_delegate().as_ref(),
    };
    let insertion = best_insertion(request, tour, cost_delegate, constraints, mode);

    insertion.feasible.then_some(insertion)
}

fn select_best(row: &[Option<InsertionMove>]) -> Option<InsertionMove> {
    row.iter()
        .flatten()
        .fold(None, |best: Option<&InsertionMove>, insertion| match best {
            Some(best) if compare_floats(insertion.cost, best.cost) != Ordering::Less => Some(best),
            _ => Some(insertion),
        })
        .cloned()
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|msg| msg.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
