//! Parallel transform stage.
//!
//! Stage 3 of the build pipeline. Takes the photos the reconciler scheduled
//! (new content plus repairs) and runs each through
//! [`transform_photo`] on a fixed pool of worker threads.
//!
//! ## Topology
//!
//! ```text
//!                 bounded(N)            unbounded
//! producer ──→ work queue ──→ worker × N ──→ results ──→ collector ──→ ProcessReport
//!                                   │
//!                                   └──→ progress ──→ progress thread ──→ ProcessEvent::Progress
//! ```
//!
//! Each worker takes one photo at a time and runs the whole state machine
//! before taking the next. The work queue holds at most one item per
//! worker, so the producer blocks while everyone is busy.
//!
//! All threads live inside one [`std::thread::scope`]. Shutdown is driven by
//! channel disconnection: the producer drops the work sender after the last
//! photo, workers exit when the queue is drained and drop their result and
//! progress senders, and the two drains exit once every sender is gone.
//!
//! ## Failure policy
//!
//! A failed photo never stops the stage. Its error is recorded in the report
//! and announced as a [`ProcessEvent::Failed`]; the other photos carry on.

use crate::imaging::{ImageBackend, PhotoOutcome, TransformSettings, transform_photo};
use crate::types::{OutputLayout, PhotoRecord};
use crossbeam_channel::{Receiver, bounded, unbounded};
use std::sync::mpsc::Sender;
use std::thread;

/// Progress notifications, sent in the order they happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    Started {
        total: usize,
    },
    /// A worker picked up a photo. `index` counts from 1.
    Progress {
        index: usize,
        total: usize,
        filename: String,
    },
    Warning {
        filename: String,
        message: String,
    },
    Failed {
        filename: String,
        message: String,
    },
    Done {
        processed: usize,
        failed: usize,
    },
}

/// Everything the workers produced.
#[derive(Debug, Default)]
pub struct ProcessReport {
    /// One outcome per photo, in completion order.
    pub outcomes: Vec<PhotoOutcome>,
    /// `"<filename>: <error>"` for every photo that did not complete.
    pub failures: Vec<String>,
    /// `"<filename>: <warning>"` for every non-fatal problem.
    pub warnings: Vec<String>,
}

impl ProcessReport {
    pub fn completed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_complete()).count()
    }
}

fn emit(events: &Option<Sender<ProcessEvent>>, event: ProcessEvent) {
    if let Some(tx) = events {
        tx.send(event).ok();
    }
}

/// Transform `photos` on `workers` threads.
///
/// Blocks until every photo has an outcome.
pub fn process(
    photos: &[PhotoRecord],
    layout: &OutputLayout,
    settings: &TransformSettings,
    workers: usize,
    backend: &impl ImageBackend,
    events: Option<Sender<ProcessEvent>>,
) -> ProcessReport {
    let total = photos.len();
    let workers = workers.max(1);
    emit(&events, ProcessEvent::Started { total });

    let (work_tx, work_rx) = bounded::<&PhotoRecord>(workers);
    let (result_tx, result_rx) = unbounded::<PhotoOutcome>();
    let (progress_tx, progress_rx) = unbounded::<String>();

    let report = thread::scope(|s| {
        for _ in 0..workers {
            let work_rx = work_rx.clone();
            let result_tx = result_tx.clone();
            let progress_tx = progress_tx.clone();
            s.spawn(move || {
                for photo in work_rx {
                    progress_tx.send(photo.filename()).ok();
                    let outcome = transform_photo(backend, photo, layout, settings);
                    if result_tx.send(outcome).is_err() {
                        break;
                    }
                }
            });
        }
        // Only the workers hold these now
        drop(work_rx);
        drop(result_tx);
        drop(progress_tx);

        let progress_events = events.clone();
        s.spawn(move || {
            for (i, filename) in progress_rx.iter().enumerate() {
                emit(
                    &progress_events,
                    ProcessEvent::Progress {
                        index: i + 1,
                        total,
                        filename,
                    },
                );
            }
        });

        let collector_events = events.clone();
        let collector = s.spawn(move || collect(result_rx, &collector_events));

        for photo in photos {
            if work_tx.send(photo).is_err() {
                break;
            }
        }
        drop(work_tx);

        match collector.join() {
            Ok(report) => report,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    });

    emit(
        &events,
        ProcessEvent::Done {
            processed: report.completed(),
            failed: report.failures.len(),
        },
    );
    report
}

/// Single owner of the report: drains results until every worker is gone.
fn collect(results: Receiver<PhotoOutcome>, events: &Option<Sender<ProcessEvent>>) -> ProcessReport {
    let mut report = ProcessReport::default();
    for outcome in results {
        for warning in &outcome.warnings {
            let message = warning.to_string();
            report.warnings.push(format!("{}: {}", outcome.filename, message));
            emit(
                events,
                ProcessEvent::Warning {
                    filename: outcome.filename.clone(),
                    message,
                },
            );
        }
        if let Some(error) = &outcome.error {
            let message = error.to_string();
            report.failures.push(format!("{}: {}", outcome.filename, message));
            emit(
                events,
                ProcessEvent::Failed {
                    filename: outcome.filename.clone(),
                    message,
                },
            );
        }
        report.outcomes.push(outcome);
    }
    report
}
