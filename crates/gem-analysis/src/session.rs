//! Off-thread analysis where the most recently submitted mesh wins.
//!
//! A viewer loads models one after another and must never show the gems of a
//! model it has already replaced. Every [`AnalysisSession::submit`] bumps a
//! generation counter; outcomes from older generations are dropped, and a
//! worker that starts after being superseded does no work at all.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};

use tracing::debug;

use crate::analyzer::GemAnalyzer;
use crate::error::GemResult;
use crate::result::AnalysisResult;
use crate::types::TriangleMesh;

/// A finished analysis tagged with the submission it belongs to.
#[derive(Debug)]
pub struct AnalysisOutcome {
    /// Generation returned by the matching [`AnalysisSession::submit`].
    pub generation: u64,
    /// Result, or the fatal error that ended the analysis.
    pub result: GemResult<AnalysisResult>,
}

/// Runs analyses on the rayon pool and delivers only the latest outcome.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use gem_analysis::AnalysisSession;
/// use gem_analysis::primitives::cuboid;
///
/// let mut session = AnalysisSession::new();
/// session.submit(Arc::new(cuboid([0.0; 3], [4.0; 3])));
/// let latest = session.submit(Arc::new(cuboid([0.0; 3], [8.0; 3])));
///
/// let outcome = session.wait_latest().unwrap();
/// assert_eq!(outcome.generation, latest);
/// assert!(!outcome.result.unwrap().is_gem_present());
/// ```
pub struct AnalysisSession {
    analyzer: Arc<GemAnalyzer>,
    latest: Arc<AtomicU64>,
    delivered: u64,
    sender: Sender<AnalysisOutcome>,
    receiver: Receiver<AnalysisOutcome>,
}

impl Default for AnalysisSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisSession {
    /// Session using an analyzer with default parameters.
    pub fn new() -> Self {
        Self::with_analyzer(GemAnalyzer::new())
    }

    /// Session using the given analyzer.
    pub fn with_analyzer(analyzer: GemAnalyzer) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            analyzer: Arc::new(analyzer),
            latest: Arc::new(AtomicU64::new(0)),
            delivered: 0,
            sender,
            receiver,
        }
    }

    /// Generation of the most recent submission, 0 if none.
    pub fn latest_generation(&self) -> u64 {
        self.latest.load(Ordering::Acquire)
    }

    /// Queue a mesh for analysis, superseding every earlier submission.
    pub fn submit(&self, mesh: Arc<TriangleMesh>) -> u64 {
        let generation = self.latest.fetch_add(1, Ordering::AcqRel) + 1;
        let analyzer = Arc::clone(&self.analyzer);
        let latest = Arc::clone(&self.latest);
        let sender = self.sender.clone();

        rayon::spawn(move || {
            if latest.load(Ordering::Acquire) != generation {
                debug!(generation, "Skipping superseded analysis");
                return;
            }
            let result = analyzer.analyze(&mesh);
            if latest.load(Ordering::Acquire) != generation {
                debug!(generation, "Discarding superseded analysis");
                return;
            }
            // The receiver lives as long as the session; a send error means
            // the session was dropped and nobody is waiting.
            let _ = sender.send(AnalysisOutcome { generation, result });
        });

        debug!(generation, "Analysis submitted");
        generation
    }

    /// The outcome of the latest submission, if it has finished and has not
    /// been returned yet.
    ///
    /// Outcomes of older submissions still in the channel are dropped.
    pub fn poll_latest(&mut self) -> Option<AnalysisOutcome> {
        let mut found = None;
        while let Ok(outcome) = self.receiver.try_recv() {
            if outcome.generation == self.latest_generation() {
                found = Some(outcome);
            }
        }
        found.map(|outcome| self.deliver(outcome))
    }

    /// Block until the latest submission finishes.
    ///
    /// Returns `None` if nothing was submitted since the last outcome was
    /// returned.
    pub fn wait_latest(&mut self) -> Option<AnalysisOutcome> {
        if !self.is_pending() {
            return None;
        }
        if let Some(outcome) = self.poll_latest() {
            return Some(outcome);
        }
        // Submissions need `&self` and we hold `&mut self`, so the worker for
        // the latest generation cannot be superseded and will send.
        loop {
            let outcome = self.receiver.recv().ok()?;
            if outcome.generation == self.latest_generation() {
                return Some(self.deliver(outcome));
            }
            debug!(generation = outcome.generation, "Dropping stale outcome");
        }
    }

    /// True if the latest submission's outcome has not been returned yet.
    pub fn is_pending(&self) -> bool {
        self.latest_generation() > self.delivered
    }

    fn deliver(&mut self, outcome: AnalysisOutcome) -> AnalysisOutcome {
        self.delivered = outcome.generation;
        outcome
    }
}
