//! This module reimports commonly used types.

// Reimport problem and solution models
pub use crate::models::common::{Location, NodeId, TimeWindow};
pub use crate::models::problem::{Instance, InstanceBuilder, RequestBuilder, ResourceDimensions, TechnicianBuilder};
pub use crate::models::problem::UnservablePolicy;
pub use crate::models::solution::{CostDelegate, Solution, Tour};

// Reimport construction and repair
pub use crate::construction::constraints::{ConstraintChecker, FeasibilityMode, TourConstraintHandler};
pub use crate::construction::costs::{DistanceDelegate, NoisyCostDelegate, WorkingTimeDelegate};
pub use crate::construction::heuristics::{InsertionMove, best_insertion};
pub use crate::solver::repair::{ExecutionMode, Repair, RepairBestInsertion, RepairRegret, RepairReport};

// Reimport utils
pub use crate::utils::{DefaultRandom, Environment, GenericError, GenericResult, InfoLogger, Random};
