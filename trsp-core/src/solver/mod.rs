//! Contains solution repair heuristics which reinsert unserved requests.

pub mod repair;
