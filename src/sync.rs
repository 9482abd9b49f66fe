//! Mutex access that survives poisoning.
//!
//! Shared mutable state in this crate is the codec's parse cache and the
//! logger's sink. A panic while either lock is held leaves at worst a stale
//! cache entry or a half-written log line, so every lock recovers from
//! poison instead of propagating it.

use std::sync::{Mutex, MutexGuard};

/// Lock a mutex, recovering the guard if a previous holder panicked.
#[inline]
pub fn lock_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Same as [`lock_recover`], logging where the poison was recovered.
#[inline]
pub fn lock_recover_debug<'a, T>(mutex: &'a Mutex<T>, context: &str) -> MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|e| {
        log::warn!("mutex poison recovered at: {context}");
        e.into_inner()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};

    #[test]
    fn test_lock_recover_normal_operation() {
        let mutex = Mutex::new(42);
        let guard = lock_recover(&mutex);
        assert_eq!(*guard, 42);
    }

    #[test]
    fn test_lock_recover_after_poison() {
        let mutex = Mutex::new(vec![1, 2, 3]);

        let _ = panic::catch_unwind(AssertUnwindSafe(|| {
            let _guard = mutex.lock().unwrap();
            panic!("intentional panic to poison mutex");
        }));
        assert!(mutex.lock().is_err(), "Mutex should be poisoned");

        let guard = lock_recover(&mutex);
        assert_eq!(*guard, vec![1, 2, 3]);
    }

    #[test]
    fn test_lock_recover_debug_after_poison() {
        let mutex = Mutex::new(99);

        let _ = panic::catch_unwind(AssertUnwindSafe(|| {
            let _guard = mutex.lock().unwrap();
            panic!("intentional panic");
        }));

        let guard = lock_recover_debug(&mutex, "parse cache");
        assert_eq!(*guard, 99);
    }
}
