use crate::runes::classifier::{ClassificationResult, Classifier, PreparedTemplates};
use crate::runes::engine::Gesture;
use crate::runes::error::{RuneError, RuneResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Classification running on a worker thread, polled once per tick.
#[derive(Debug)]
pub struct RecognitionJob {
    rx: Receiver<RuneResult<ClassificationResult>>,
    cancelled: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
    outcome: Option<RuneResult<ClassificationResult>>,
    disconnected: bool,
}

impl RecognitionJob {
    pub fn spawn(
        classifier: Classifier,
        candidate: Gesture,
        templates: Arc<PreparedTemplates>,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        let cancelled = Arc::new(AtomicBool::new(false));
        let worker_cancelled = Arc::clone(&cancelled);
        let join = thread::spawn(move || {
            let result = classifier.classify_prepared(&candidate, &templates);
            if worker_cancelled.load(Ordering::Acquire) {
                tracing::debug!("discarding cancelled recognition");
                return;
            }
            let _ = tx.send(result);
        });
        Self {
            rx,
            cancelled,
            join: Some(join),
            outcome: None,
            disconnected: false,
        }
    }

    pub fn is_complete(&mut self) -> bool {
        if self.outcome.is_some() || self.disconnected {
            return true;
        }
        match self.rx.try_recv() {
            Ok(result) => {
                self.outcome = Some(result);
                self.reap();
                true
            }
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Disconnected) => {
                self.disconnected = true;
                self.reap();
                true
            }
        }
    }

    /// Takes the result once complete. `None` while running or after cancel.
    pub fn result(&mut self) -> Option<RuneResult<ClassificationResult>> {
        if self.is_cancelled() || !self.is_complete() {
            return None;
        }
        if self.disconnected && self.outcome.is_none() && !self.is_cancelled() {
            self.disconnected = false;
            return Some(Err(RuneError::InvalidState(
                "recognition worker exited without a result".into(),
            )));
        }
        self.outcome.take()
    }

    /// Blocks until the worker has reported.
    pub fn wait(mut self) -> RuneResult<ClassificationResult> {
        if let Some(outcome) = self.outcome.take() {
            return outcome;
        }
        let result = self.rx.recv().unwrap_or_else(|_| {
            Err(RuneError::InvalidState(
                "recognition worker exited without a result".into(),
            ))
        });
        self.reap();
        result
    }

    pub fn cancel(&mut self) {
        self.cancelled.store(true, Ordering::Release);
        self.outcome = None;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    fn reap(&mut self) {
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                tracing::error!("recognition worker panicked");
            }
        }
    }
}

/// Holds at most one in-flight recognition. A submit while one is pending is
/// rejected; the pending job keeps running.
#[derive(Debug, Default)]
pub struct RecognitionSlot {
    job: Option<RecognitionJob>,
}

impl RecognitionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.job.is_some()
    }

    pub fn submit(
        &mut self,
        classifier: Classifier,
        candidate: Gesture,
        templates: Arc<PreparedTemplates>,
    ) -> RuneResult<()> {
        if self.job.is_some() {
            return Err(RuneError::InvalidState(
                "a recognition is already in flight".into(),
            ));
        }
        self.job = Some(RecognitionJob::spawn(classifier, candidate, templates));
        Ok(())
    }

    /// Returns the finished result and frees the slot.
    pub fn poll(&mut self) -> Option<RuneResult<ClassificationResult>> {
        let job = self.job.as_mut()?;
        if !job.is_complete() {
            return None;
        }
        let result = job.result();
        self.job = None;
        result
    }

    pub fn cancel(&mut self) -> bool {
        match self.job.take() {
            Some(mut job) => {
                job.cancel();
                tracing::debug!("pending recognition cancelled");
                true
            }
            None => false,
        }
    }
}
