//! Cap on simultaneously running calls.
//!
//! This is independent of the window quota: the gate bounds how many calls
//! start per window, this bounds how many are running at the same instant.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::error::{DocgateError, Result};

/// Bounded pool of in-flight permits.
#[derive(Debug, Clone)]
pub struct InFlightLimit {
    permits: Arc<Semaphore>,
    max: usize,
}

impl InFlightLimit {
    /// Allow at most `max` concurrent calls.
    pub fn new(max: usize) -> Result<Self> {
        if max == 0 {
            return Err(DocgateError::InvalidConfiguration(
                "max_in_flight must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            permits: Arc::new(Semaphore::new(max)),
            max,
        })
    }

    /// Wait for a free permit. The permit is returned when the guard drops.
    pub async fn acquire(&self) -> OwnedSemaphorePermit {
        // The semaphore is owned here and never closed.
        match Arc::clone(&self.permits).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => unreachable!("in-flight semaphore closed"),
        }
    }

    /// Configured maximum.
    pub fn max(&self) -> usize {
        self.max
    }

    /// Permits not currently held.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}
