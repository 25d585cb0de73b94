#[cfg(test)]
#[path = "../../tests/unit/utils/lock_test.rs"]
mod lock_test;

use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

static NEXT_TOKEN_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies an owner of an advisory lock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LockToken(u64);

impl LockToken {
    /// Creates a new unique token.
    pub fn new() -> Self {
        Self(NEXT_TOKEN_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns token's numeric id.
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl Default for LockToken {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for LockToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "lock-owner-{}", self.0)
    }
}

/// An error returned when the lock cannot be acquired.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LockError {
    /// The lock was held by another owner during the whole wait.
    Timeout {
        /// The owner which held the lock when waiting was abandoned.
        holder: Option<LockToken>,
        /// How long the caller waited.
        waited: Duration,
    },
}

impl Display for LockError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LockError::Timeout { holder: Some(holder), waited } => {
                write!(f, "cannot acquire lock in {}ms: it is held by {holder}", waited.as_millis())
            }
            LockError::Timeout { holder: None, waited } => {
                write!(f, "cannot acquire lock in {}ms", waited.as_millis())
            }
        }
    }
}

impl std::error::Error for LockError {}

#[derive(Default)]
struct LockState {
    owner: Option<LockToken>,
    depth: usize,
}

/// A reentrant advisory lock: the owner is identified by an explicit token and may acquire it
/// several times, other owners wait until it is released or the timeout expires.
///
/// The lock does not protect any data by itself, it is used to coordinate unrelated threads which
/// operate on the same tour or solution.
#[derive(Default)]
pub struct AdvisoryLock {
    state: Mutex<LockState>,
    released: Condvar,
}

impl AdvisoryLock {
    /// Tries to acquire the lock on behalf of the owner, waits at most `timeout`.
    pub fn try_acquire(self: &Arc<Self>, token: LockToken, timeout: Duration) -> Result<LockGuard, LockError> {
        let started = Instant::now();
        let mut state = self.lock_state();

        loop {
            match state.owner {
                None => {
                    state.owner = Some(token);
                    state.depth = 1;
                    break;
                }
                Some(owner) if owner == token => {
                    state.depth += 1;
                    break;
                }
                Some(owner) => {
                    let waited = started.elapsed();
                    if waited >= timeout {
                        return Err(LockError::Timeout { holder: Some(owner), waited });
                    }

                    state = match self.released.wait_timeout(state, timeout - waited) {
                        Ok((state, _)) => state,
                        Err(poisoned) => poisoned.into_inner().0,
                    };
                }
            }
        }

        Ok(LockGuard { lock: self.clone(), token })
    }

    /// Returns the current holder of the lock, if any.
    pub fn holder(&self) -> Option<LockToken> {
        self.lock_state().owner
    }

    /// Checks whether the lock is held by anyone.
    pub fn is_locked(&self) -> bool {
        self.holder().is_some()
    }

    fn release(&self, token: LockToken) {
        let mut state = self.lock_state();
        assert_eq!(state.owner, Some(token), "lock is released by non owner");

        state.depth -= 1;
        if state.depth == 0 {
            state.owner = None;
            self.released.notify_all();
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, LockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Keeps the advisory lock acquired until dropped.
pub struct LockGuard {
    lock: Arc<AdvisoryLock>,
    token: LockToken,
}

impl LockGuard {
    /// Returns the owner token.
    pub fn token(&self) -> LockToken {
        self.token
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        self.lock.release(self.token);
    }
}
