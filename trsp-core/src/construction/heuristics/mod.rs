//! Contains insertion moves and the best position search.

mod insertions;
pub use self::insertions::*;
