use super::ThreadPool;
use crate::Result;
use crossbeam::channel::{self, Receiver, Sender};
use std::thread;
use tracing::{debug, error};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A thread pool whose workers pull jobs from one shared crossbeam [`channel`].
///
/// The pool itself is the single producer and every worker thread is a consumer. A worker
/// whose job panics is replaced by a fresh thread, so a misbehaving connection handler
/// does not shrink the pool.
///
/// [`channel`]: https://docs.rs/crossbeam/0.8.1/crossbeam/channel/index.html
pub struct SharedQueueThreadPool {
    tx: Sender<Job>,
}

impl ThreadPool for SharedQueueThreadPool {
    fn new(threads: u32) -> Result<Self> {
        let (tx, rx) = channel::unbounded::<Job>();
        for idx in 0..threads {
            let worker = Worker(rx.clone());
            thread::Builder::new()
                .name(format!("crs-worker-{}", idx))
                .spawn(move || run_jobs(worker))?;
        }
        debug!("created shared queue pool with {} threads", threads);
        Ok(SharedQueueThreadPool { tx })
    }

    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.tx.send(Box::new(job)).is_err() {
            error!("no worker threads left in the pool, dropping job");
        }
    }
}

/// the receiving end of the job queue, owned by one worker thread
#[derive(Clone)]
struct Worker(Receiver<Job>);

impl Drop for Worker {
    fn drop(&mut self) {
        if thread::panicking() {
            debug!("worker panicked, starting a replacement");
            let worker = self.clone();
            if let Err(e) = thread::Builder::new().spawn(move || run_jobs(worker)) {
                error!("Failed to spawn a thread: {}", e);
            }
        }
    }
}

fn run_jobs(worker: Worker) {
    while let Ok(job) = worker.0.recv() {
        job();
    }
    debug!("worker exiting, the pool was dropped");
}
