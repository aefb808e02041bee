//! Counting-semaphore wake channel
//!
//! A [`WaitGate`] carries no admission state of its own. It hands out wake
//! tokens: a parked thread consumes one token and then goes back to recheck
//! whatever condition it is waiting on. The pool keeps the count of parked
//! threads under its own lock and posts exactly that many tokens on release.

use std::sync::{Condvar, Mutex, PoisonError};

/// Counting semaphore used purely as a wake channel
#[derive(Debug, Default)]
pub struct WaitGate {
    tokens: Mutex<usize>,
    posted: Condvar,
}

impl WaitGate {
    /// Create a gate with no tokens
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until a token is available and consume it
    ///
    /// Tokens posted before the call are not lost: a thread that registered
    /// as a waiter but had not parked yet returns immediately.
    pub fn park(&self) {
        let mut tokens = self.tokens.lock().unwrap_or_else(PoisonError::into_inner);
        while *tokens == 0 {
            tokens = self
                .posted
                .wait(tokens)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *tokens -= 1;
    }

    /// Add `n` tokens, waking up to `n` parked threads
    pub fn post(&self, n: usize) {
        if n == 0 {
            return;
        }
        let mut tokens = self.tokens.lock().unwrap_or_else(PoisonError::into_inner);
        *tokens += n;
        if n == 1 {
            self.posted.notify_one();
        } else {
            self.posted.notify_all();
        }
    }

    /// Tokens posted but not yet consumed
    #[must_use]
    pub fn tokens(&self) -> usize {
        *self.tokens.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
