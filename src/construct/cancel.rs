use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::error::{ConstructError, Result};

/// Cooperative cancellation flag shared between a batch and whoever may stop
/// it. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self { Self::default() }

    #[inline] pub fn cancel(&self) { self.0.store(true, Ordering::Relaxed) }

    #[inline] pub fn is_cancelled(&self) -> bool { self.0.load(Ordering::Relaxed) }

    /// `Err(Cancelled)` once cancellation has been requested.
    #[inline]
    pub fn check(&self) -> Result<()> {
        match self.is_cancelled() {
            true => Err(ConstructError::Cancelled),
            false => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(token.check().is_ok());
        other.cancel();
        assert!(token.is_cancelled());
        assert_eq!(token.check().unwrap_err().kind(), "cancelled");
    }
}
