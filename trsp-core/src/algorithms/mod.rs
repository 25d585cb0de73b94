//! This module contains generic data structures used by the routing models.

pub mod structures;
