//! Core crate contains building blocks for solving the ***Technician Routing and Scheduling Problem***:
//! technicians with skills, tools and spare parts leave their homes, serve time windowed requests and
//! may visit the main depot to restock.
//!
//! A solution keeps one [Tour](models::solution::Tour) per technician: a doubly linked list over node
//! ids with derived timing and resource state which is propagated incrementally on every change.
//! Unserved requests are inserted back by repair heuristics, see [solver::repair].
//!
//! # Examples
//!
//! ```
//! # use trsp_core::prelude::*;
//! # use std::sync::Arc;
//! let instance = InstanceBuilder::default()
//!     .main_depot(Location::new(0., 0.), TimeWindow::new(0., 1000.))
//!     .add_technician(TechnicianBuilder::new("alice").home(Location::new(0., 0.)).shift(TimeWindow::new(0., 1000.)))
//!     .add_request(RequestBuilder::new("job1").location(Location::new(10., 0.)).service_time(5.))
//!     .build()
//!     .expect("cannot build instance");
//!
//! let mut solution = Solution::new(Arc::new(instance), Arc::new(DistanceDelegate));
//! solution.initialize_tours().expect("cannot initialize tours");
//!
//! let environment = Arc::new(Environment::new_with_logger(Arc::new(|_| ())));
//! let repair = RepairBestInsertion::new(Arc::new(TourConstraintHandler::default()), environment, ExecutionMode::Sequential)
//!     .expect("cannot create repair");
//! let report = repair.repair(&mut solution).expect("cannot repair");
//!
//! assert!(report.is_repaired());
//! assert_eq!(solution.total_cost(), 20.);
//! ```

#![warn(missing_docs)]

#[cfg(test)]
#[path = "../tests/helpers/mod.rs"]
#[macro_use]
pub mod helpers;

pub mod algorithms;
pub mod construction;
pub mod models;
pub mod prelude;
pub mod solver;
pub mod utils;
