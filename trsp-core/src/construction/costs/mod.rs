//! Provides cost delegate implementations.

mod distance;
pub use self::distance::DistanceDelegate;

mod noisy;
pub use self::noisy::NoisyCostDelegate;

mod working_time;
pub use self::working_time::WorkingTimeDelegate;
