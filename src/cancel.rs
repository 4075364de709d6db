use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Result, WalletError};

/// Cancellation flag passed through multi-step flows.
///
/// Checked between steps; an in-flight request is allowed to finish.
/// Once cancelled the token stays cancelled.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once `cancel` has been called on any clone
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(WalletError::Cancelled)
        } else {
            Ok(())
        }
    }
}
