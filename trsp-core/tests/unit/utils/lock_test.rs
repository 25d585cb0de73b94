use super::*;
use std::thread;

const SHORT_TIMEOUT: Duration = Duration::from_millis(50);

#[test]
fn can_acquire_and_release_lock() {
    let lock = Arc::new(AdvisoryLock::default());
    let token = LockToken::new();

    let guard = lock.try_acquire(token, SHORT_TIMEOUT).expect("cannot acquire lock");
    assert_eq!(guard.token(), token);
    assert_eq!(lock.holder(), Some(token));

    drop(guard);
    assert!(!lock.is_locked());
}

#[test]
fn can_acquire_lock_reentrantly() {
    let lock = Arc::new(AdvisoryLock::default());
    let token = LockToken::new();

    let outer = lock.try_acquire(token, SHORT_TIMEOUT).expect("cannot acquire lock");
    let inner = lock.try_acquire(token, SHORT_TIMEOUT).expect("cannot reenter lock");

    drop(inner);
    assert_eq!(lock.holder(), Some(token));

    drop(outer);
    assert_eq!(lock.holder(), None);
}

#[test]
fn can_report_holder_on_timeout() {
    let lock = Arc::new(AdvisoryLock::default());
    let owner = LockToken::new();
    let other = LockToken::new();
    let _guard = lock.try_acquire(owner, SHORT_TIMEOUT).expect("cannot acquire lock");

    let result = lock.try_acquire(other, SHORT_TIMEOUT);

    match result {
        Err(LockError::Timeout { holder, waited }) => {
            assert_eq!(holder, Some(owner));
            assert!(waited >= SHORT_TIMEOUT);
        }
        Ok(_) => unreachable!("lock should not be acquired"),
    }
}

#[test]
fn can_acquire_lock_after_it_is_released_by_other_thread() {
    let lock = Arc::new(AdvisoryLock::default());
    let owner = LockToken::new();
    let guard = lock.try_acquire(owner, SHORT_TIMEOUT).expect("cannot acquire lock");

    let waiter = {
        let lock = lock.clone();
        thread::spawn(move || lock.try_acquire(LockToken::new(), Duration::from_secs(5)).map(|guard| guard.token()))
    };

    thread::sleep(Duration::from_millis(20));
    drop(guard);

    let acquired = waiter.join().expect("waiter panicked").expect("cannot acquire released lock");
    assert_ne!(acquired, owner);
}

#[test]
fn can_generate_unique_tokens() {
    let first = LockToken::new();
    let second = LockToken::new();

    assert_ne!(first, second);
    assert_eq!(first.to_string(), format!("lock-owner-{}", first.id()));
}
