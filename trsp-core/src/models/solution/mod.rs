//! Solution domain models.

mod delegate;
pub use self::delegate::*;

mod propagation;

mod solution;
pub use self::solution::*;

mod tour;
pub use self::tour::*;
