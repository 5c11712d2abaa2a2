use std::fmt::Debug;
use std::sync::{Mutex, PoisonError};

/// Remembers the arguments of every call made to a mock.
#[derive(Debug)]
pub struct CallRecorder<A> {
    calls: Mutex<Vec<A>>,
}

impl<A> Default for CallRecorder<A> {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl<A> CallRecorder<A> {
    pub fn record(&self, args: A) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(args);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn reset(&self) {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl<A: Clone> CallRecorder<A> {
    pub fn calls(&self) -> Vec<A> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<A: Debug> CallRecorder<A> {
    /// Panics unless exactly one call was recorded and `matches` accepts it.
    #[track_caller]
    pub fn assert_called_once_matching(&self, what: &str, matches: impl FnOnce(&A) -> bool) {
        let calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
        match calls.as_slice() {
            [only] => assert!(matches(only), "expected one call {what}, got {only:?}"),
            _ => panic!(
                "expected one call {what}, got {} calls: {:?}",
                calls.len(),
                *calls
            ),
        }
    }
}

impl<A: Debug + PartialEq> CallRecorder<A> {
    #[track_caller]
    pub fn assert_called_once_with(&self, expected: &A) {
        self.assert_called_once_matching(&format!("with {expected:?}"), |call| call == expected);
    }
}
