/*
 * Classifier Pipeline
 *
 * Runs a fixed classifier list sequentially, each on its own worker thread
 * with a wall-clock deadline.
 *
 * Each worker writes graph details into a private copy.
 *
 * Per classifier:
 *   completed  -> its findings are appended, its details become the pass's
 *   timed out  -> partial findings and details are salvaged, the worker is
 *                 abandoned and keeps only its private copy
 *   failed     -> error or panic, contributes nothing
 *   skipped    -> too many abandoned workers still running
 *
 * An abandoned worker keeps running until it returns on its own; the running
 * count caps how many can pile up across analysis passes.
 */

use crate::config::AnalysisConfig;
use crate::features::classifiers::domain::{GraphDetails, StateMachineIssue};
use crate::features::classifiers::error::{AnalysisError, AnalysisResult};
use crate::features::classifiers::infrastructure::{
    BenignStateClassifier, CriticalMessageOutOfOrderClassifier, ErrorStateClassifier,
    HappyFlowClassifier, InternalErrorClassifier, KeyblockLeakClassifier,
    OddErrorStateTransitionClassifier, RedundantStateClassifier, StateConfusionClassifier,
    UnknownMessageClassifier,
};
use crate::features::classifiers::ports::{AnalysisInput, Classifier, PartialFindings};
use crate::features::rules::{HappyFlowCatalog, RuleBook};
use crate::shared::models::{MealyMachine, ProtocolRole};
use crossbeam_channel::{bounded, RecvTimeoutError};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Fixed classifier order for a role
///
/// Error states first: every later classifier reads them.
pub fn classifiers_for_role(role: ProtocolRole) -> Vec<Arc<dyn Classifier>> {
    let mut classifiers: Vec<Arc<dyn Classifier>> = vec![
        Arc::new(ErrorStateClassifier),
        Arc::new(BenignStateClassifier),
        Arc::new(HappyFlowClassifier),
        Arc::new(StateConfusionClassifier),
        Arc::new(CriticalMessageOutOfOrderClassifier),
        Arc::new(InternalErrorClassifier),
    ];
    if role == ProtocolRole::Server {
        classifiers.push(Arc::new(KeyblockLeakClassifier));
    }
    classifiers.push(Arc::new(UnknownMessageClassifier));
    classifiers.push(Arc::new(RedundantStateClassifier));
    classifiers.push(Arc::new(OddErrorStateTransitionClassifier));
    classifiers
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub findings: Vec<StateMachineIssue>,
    pub details: Option<GraphDetails>,
    pub timed_out: Vec<String>,
    pub failed: Vec<String>,
    pub skipped: Vec<String>,
    /// Timed out while holding its details; later classifiers ran without them
    pub details_unavailable: Vec<String>,
}

impl AnalysisReport {
    pub fn is_degraded(&self) -> bool {
        !(self.timed_out.is_empty() && self.failed.is_empty() && self.skipped.is_empty())
    }
}

/// Longest wait for a timed-out worker to release its details
const DETAILS_SALVAGE_WAIT: Duration = Duration::from_millis(50);

enum WorkerOutcome {
    Completed(Vec<StateMachineIssue>),
    TimedOut {
        findings: Vec<StateMachineIssue>,
        details_salvaged: bool,
    },
    Failed(String),
    Skipped,
}

/// Decrements the running count when the worker finishes or unwinds
struct WorkerSlot(Arc<AtomicUsize>);

impl Drop for WorkerSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct Analyzer {
    classifiers: Vec<Arc<dyn Classifier>>,
    running: Arc<AtomicUsize>,
}

impl Analyzer {
    pub fn for_role(role: ProtocolRole) -> Self {
        Self::with_classifiers(classifiers_for_role(role))
    }

    pub fn with_classifiers(classifiers: Vec<Arc<dyn Classifier>>) -> Self {
        Self {
            classifiers,
            running: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn classifier_names(&self) -> Vec<&'static str> {
        self.classifiers.iter().map(|c| c.name()).collect()
    }

    /// Workers currently alive, abandoned ones included
    pub fn running_workers(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    /// Build the input for one pass and run it
    pub fn analyze(
        &self,
        automaton: Arc<MealyMachine>,
        rules: Arc<RuleBook>,
        happy_flows: Arc<HappyFlowCatalog>,
        config: &AnalysisConfig,
    ) -> AnalysisReport {
        let input = AnalysisInput::new(automaton, rules, happy_flows, config.clone());
        self.find_vulnerabilities(&input)
    }

    pub fn find_vulnerabilities(&self, input: &AnalysisInput) -> AnalysisReport {
        let started = Instant::now();
        let timeout = input.config.classifier_timeout();
        let mut report = AnalysisReport::default();

        for classifier in &self.classifiers {
            let name = classifier.name();
            match self.run_worker(classifier, input, timeout) {
                WorkerOutcome::Completed(findings) => {
                    debug!(classifier = name, findings = findings.len(), "Classifier finished");
                    report.findings.extend(findings);
                }
                WorkerOutcome::TimedOut {
                    findings,
                    details_salvaged,
                } => {
                    warn!(
                        classifier = name,
                        timeout_ms = timeout.as_millis() as u64,
                        salvaged = findings.len(),
                        details_salvaged,
                        "Classifier timed out, keeping partial findings"
                    );
                    report.findings.extend(findings);
                    report.timed_out.push(name.to_string());
                    if !details_salvaged {
                        report.details_unavailable.push(name.to_string());
                    }
                }
                WorkerOutcome::Failed(message) => {
                    warn!(classifier = name, error = %message, "Classifier failed");
                    report.failed.push(name.to_string());
                }
                WorkerOutcome::Skipped => {
                    warn!(
                        classifier = name,
                        running = self.running_workers(),
                        "Worker cap reached, classifier skipped"
                    );
                    report.skipped.push(name.to_string());
                }
            }
        }

        let details = {
            let mut details = input.details.write();
            details.findings = report.findings.clone();
            details.clone()
        };
        report.details = Some(details);

        info!(
            findings = report.findings.len(),
            degraded = report.is_degraded(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Analysis finished"
        );
        report
    }

    fn run_worker(
        &self,
        classifier: &Arc<dyn Classifier>,
        input: &AnalysisInput,
        timeout: Duration,
    ) -> WorkerOutcome {
        if self.running_workers() >= input.config.max_running_workers {
            return WorkerOutcome::Skipped;
        }

        let partial = PartialFindings::default();
        let (tx, rx) = bounded::<AnalysisResult<Vec<StateMachineIssue>>>(1);

        self.running.fetch_add(1, Ordering::SeqCst);
        let slot = WorkerSlot(Arc::clone(&self.running));
        let worker_classifier = Arc::clone(classifier);
        let worker_input = input.detached();
        let worker_details = Arc::clone(&worker_input.details);
        let worker_partial = Arc::clone(&partial);

        let spawned = thread::Builder::new()
            .name(format!("classifier-{}", classifier.name()))
            .spawn(move || {
                let result = worker_classifier.vulnerabilities_of_class(&worker_input, &worker_partial);
                drop(slot);
                // Receiver is gone once the deadline passed
                let _ = tx.send(result);
            });
        if let Err(e) = spawned {
            return WorkerOutcome::Failed(AnalysisError::Spawn(e.to_string()).to_string());
        }

        match rx.recv_timeout(timeout) {
            Ok(Ok(findings)) => {
                publish(input, &worker_details.read());
                WorkerOutcome::Completed(findings)
            }
            Ok(Err(e)) => WorkerOutcome::Failed(e.to_string()),
            Err(RecvTimeoutError::Timeout) => {
                // A worker mid-write leaves the pass's details as they were
                let details_salvaged = match worker_details.try_read_for(DETAILS_SALVAGE_WAIT) {
                    Some(details) => {
                        publish(input, &details);
                        true
                    }
                    None => false,
                };
                WorkerOutcome::TimedOut {
                    findings: partial.lock().clone(),
                    details_salvaged,
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                WorkerOutcome::Failed("worker terminated without a result".to_string())
            }
        }
    }
}

fn publish(input: &AnalysisInput, details: &GraphDetails) {
    *input.details.write() = details.clone();
}
