//! A collection of models to represent problem and solution of the technician routing problem.

pub mod common;
pub mod problem;
pub mod solution;
