//! This module contains building blocks for constructing and repairing solutions: cost delegates,
//! constraints and insertion heuristics.

pub mod constraints;
pub mod costs;
pub mod heuristics;
