//! Repair heuristics: they take a partially destroyed solution and insert its unserved requests back.

use crate::construction::heuristics::{InsertionMove, MoveError};
use crate::models::common::NodeId;
use crate::models::solution::Solution;
use crate::utils::{GenericError, LockError};
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};

mod best_insertion;
pub use self::best_insertion::RepairBestInsertion;

mod cache;
pub(crate) use self::cache::*;

mod regret;
pub use self::regret::RepairRegret;

/// Specifies how per request insertions are evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionMode {
    /// All requests are evaluated on the calling thread.
    Sequential,
    /// Requests are evaluated on a thread pool with given amount of workers.
    Parallel {
        /// Amount of worker threads.
        workers: usize,
    },
}

/// A result of a repair call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RepairReport {
    /// Executed moves in order of execution.
    pub moves: Vec<InsertionMove>,
    /// Requests which are left unserved, in ascending order.
    pub unserved: Vec<NodeId>,
}

impl RepairReport {
    /// Checks whether all requests are served.
    pub fn is_repaired(&self) -> bool {
        self.unserved.is_empty()
    }
}

/// An error returned when repair cannot be performed.
#[derive(Clone, Debug, PartialEq)]
pub enum RepairError {
    /// Repair is called while the previous call on the same heuristic is not completed.
    Busy,
    /// Worker pool is resized while a batch of evaluations is running.
    BatchInProgress,
    /// A move which was evaluated as feasible cannot be executed.
    Execution {
        /// The move.
        insertion: Box<InsertionMove>,
        /// The reason.
        source: MoveError,
    },
    /// The solution's lock cannot be acquired.
    Lock(LockError),
    /// A worker pool cannot be created.
    Pool(GenericError),
}

impl Display for RepairError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RepairError::Busy => write!(f, "repair is already running"),
            RepairError::BatchInProgress => write!(f, "worker pool cannot be resized while a batch is running"),
            RepairError::Execution { insertion, source } => write!(f, "cannot execute {insertion}: {source}"),
            RepairError::Lock(err) => write!(f, "{err}"),
            RepairError::Pool(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for RepairError {}

impl From<LockError> for RepairError {
    fn from(value: LockError) -> Self {
        RepairError::Lock(value)
    }
}

impl From<RepairError> for GenericError {
    fn from(value: RepairError) -> Self {
        value.to_string().into()
    }
}

/// A repair heuristic.
pub trait Repair {
    /// Inserts unserved requests of the solution into its tours.
    fn repair(&self, solution: &mut Solution) -> Result<RepairReport, RepairError>;
}

/// Sets the flag for the lifetime of the guard.
pub(crate) struct FlagGuard<'a>(&'a AtomicBool);

impl<'a> FlagGuard<'a> {
    /// Raises the flag, returns `None` if it is already raised.
    pub fn try_raise(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).ok().map(|_| Self(flag))
    }
}

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub(crate) fn create_report(solution: &Solution, moves: Vec<InsertionMove>) -> RepairReport {
    RepairReport { moves, unserved: solution.unserved_requests().iter().copied().collect() }
}
