//! This module contains helper functionality.

mod comparison;
pub use self::comparison::*;

mod environment;
pub use self::environment::*;

mod error;
pub use self::error::*;

mod lock;
pub use self::lock::*;

mod noise;
pub use self::noise::*;

mod parallel;
pub use self::parallel::*;

mod random;
pub use self::random::*;
