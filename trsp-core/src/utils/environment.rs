#[cfg(test)]
#[path = "../../tests/unit/utils/environment_test.rs"]
mod environment_test;

use crate::utils::{DefaultRandom, Random};
use std::sync::Arc;
use std::time::Duration;

/// A logger type which is called with various information.
pub type InfoLogger = Arc<dyn Fn(&str) + Send + Sync>;

/// A default timeout used to acquire advisory locks on tours and solutions.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(10);

/// Returns amount of CPUs.
#[cfg(not(target_arch = "wasm32"))]
pub fn get_cpus() -> usize {
    num_cpus::get()
}

/// Returns amount of CPUs.
#[cfg(target_arch = "wasm32")]
pub fn get_cpus() -> usize {
    1
}

/// Specifies data parallelism settings.
#[derive(Clone, Debug)]
pub struct Parallelism {
    available_cpus: usize,
}

impl Default for Parallelism {
    fn default() -> Self {
        Self::new_with_cpus(get_cpus())
    }
}

impl Parallelism {
    /// Creates an instance of `Parallelism` using amount of cpus specified.
    pub fn new_with_cpus(available_cpus: usize) -> Self {
        Self { available_cpus: available_cpus.max(1) }
    }

    /// Amount of total available CPUs.
    pub fn available_cpus(&self) -> usize {
        self.available_cpus
    }
}

/// Keeps track of environment specific information which influences algorithm behavior.
#[derive(Clone)]
pub struct Environment {
    /// A wrapper on random generator.
    pub random: Arc<dyn Random>,

    /// Keeps data parallelism settings.
    pub parallelism: Parallelism,

    /// An information logger.
    pub logger: InfoLogger,

    /// A maximum time to wait for an advisory lock.
    pub lock_timeout: Duration,
}

impl Environment {
    /// Creates an instance of `Environment`.
    pub fn new(random: Arc<dyn Random>, parallelism: Parallelism, logger: InfoLogger, lock_timeout: Duration) -> Self {
        Self { random, parallelism, logger, lock_timeout }
    }

    /// Creates an instance of `Environment` with given logger and default settings for the rest.
    pub fn new_with_logger(logger: InfoLogger) -> Self {
        Self { logger, ..Self::default() }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new(
            Arc::new(DefaultRandom::default()),
            Parallelism::default(),
            Arc::new(|msg| println!("{msg}")),
            DEFAULT_LOCK_TIMEOUT,
        )
    }
}
