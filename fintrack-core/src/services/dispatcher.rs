//! Hand-off of completions to the UI-affine thread
//!
//! Worker tasks never call UI code directly. They `post` closures to a
//! [`Dispatcher`]; whichever thread owns the [`DispatchQueue`] runs them.

use tokio::sync::mpsc;
use tracing::debug;

/// A unit of work to run on the UI thread
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Create a connected dispatcher/queue pair
pub fn channel() -> (Dispatcher, DispatchQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Dispatcher { tx }, DispatchQueue { rx })
}

/// Posting half; cheap to clone into worker tasks
#[derive(Clone)]
pub struct Dispatcher {
    tx: mpsc::UnboundedSender<Job>,
}

impl Dispatcher {
    /// Schedule `job` on the UI thread
    ///
    /// Jobs from one poster run in posting order. Returns false when the
    /// queue is gone; the job is dropped.
    pub fn post<F>(&self, job: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        if self.tx.send(Box::new(job)).is_err() {
            debug!("dispatch queue closed, dropping job");
            return false;
        }
        true
    }
}

/// Receiving half, owned by the UI thread
pub struct DispatchQueue {
    rx: mpsc::UnboundedReceiver<Job>,
}

impl DispatchQueue {
    /// Run every job already queued; returns how many ran
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.rx.try_recv() {
            job();
            ran += 1;
        }
        ran
    }

    /// Wait for the next job without running it
    ///
    /// None once every [`Dispatcher`] is dropped and the queue is empty.
    pub async fn next(&mut self) -> Option<Job> {
        self.rx.recv().await
    }

    /// Wait for one job and run it
    pub async fn run_next(&mut self) -> bool {
        match self.rx.recv().await {
            Some(job) => {
                job();
                true
            }
            None => false,
        }
    }

    /// Block the current (non-runtime) thread until one job has run
    pub fn blocking_run_next(&mut self) -> bool {
        match self.rx.blocking_recv() {
            Some(job) => {
                job();
                true
            }
            None => false,
        }
    }
}
