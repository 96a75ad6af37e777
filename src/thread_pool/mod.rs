//! Thread pools used by [`CrsServer`] to service connections.
//!
//! [`CrsServer`]: ../struct.CrsServer.html
use crate::Result;

/// A pool of worker threads that run submitted jobs
pub trait ThreadPool {
    /// creates a new pool holding `threads` worker threads
    ///
    /// # Errors
    /// returns an error if the threads could not be started
    fn new(threads: u32) -> Result<Self>
    where
        Self: Sized;

    /// runs `job` on one of the pool's threads
    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static;
}

mod rayon_pool;
mod shared_queue;

pub use self::rayon_pool::RayonThreadPool;
pub use self::shared_queue::SharedQueueThreadPool;
