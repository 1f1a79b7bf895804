//! Sequential batch conversion on a background worker.

use crate::converter::{self, ConversionReport, ConvertOptions, Stage};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// One queued file
#[derive(Debug, Clone)]
pub struct Job {
    pub input: PathBuf,
    /// Explicit output path; `None` writes `<stem>.epub` next to the input
    pub output: Option<PathBuf>,
}

impl Job {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: None,
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }
}

/// Events emitted while a batch runs, in order, per file
#[derive(Debug)]
pub enum BatchEvent {
    Started { index: usize, input: PathBuf },
    Progress { index: usize, stage: Stage },
    Finished {
        index: usize,
        input: PathBuf,
        report: ConversionReport,
    },
    Failed { index: usize, input: PathBuf, error: String },
    /// The batch was cancelled before this file started
    Cancelled { index: usize, input: PathBuf },
    Completed(BatchSummary),
}

/// Terminal state of one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Converted(PathBuf),
    Failed(String),
    Cancelled,
}

#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    /// One entry per job, in queue order
    pub outcomes: Vec<(PathBuf, FileOutcome)>,
}

impl BatchSummary {
    pub fn succeeded(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Converted(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Failed(_)))
    }

    pub fn cancelled(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Cancelled))
    }

    fn count(&self, pred: impl Fn(&FileOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| pred(o)).count()
    }
}

/// Convert every job in order, one at a time.
///
/// A failing file is recorded and the queue moves on. `cancel` is checked
/// before each file; a conversion already in progress always completes.
pub fn run_queue(
    jobs: &[Job],
    options: &ConvertOptions,
    cancel: &AtomicBool,
    mut emit: impl FnMut(BatchEvent),
) -> BatchSummary {
    let mut summary = BatchSummary::default();

    for (index, job) in jobs.iter().enumerate() {
        if cancel.load(Ordering::SeqCst) {
            emit(BatchEvent::Cancelled {
                index,
                input: job.input.clone(),
            });
            summary.outcomes.push((job.input.clone(), FileOutcome::Cancelled));
            continue;
        }

        emit(BatchEvent::Started {
            index,
            input: job.input.clone(),
        });

        let result = converter::convert(&job.input, job.output.as_deref(), options, |stage| {
            emit(BatchEvent::Progress { index, stage })
        });

        let outcome = match result {
            Ok(report) => {
                let outcome = FileOutcome::Converted(report.output.clone());
                emit(BatchEvent::Finished {
                    index,
                    input: job.input.clone(),
                    report,
                });
                outcome
            }
            Err(e) => {
                tracing::error!("Failed to convert {}: {}", job.input.display(), e);
                let error = e.to_string();
                emit(BatchEvent::Failed {
                    index,
                    input: job.input.clone(),
                    error: error.clone(),
                });
                FileOutcome::Failed(error)
            }
        };
        summary.outcomes.push((job.input.clone(), outcome));
    }

    emit(BatchEvent::Completed(summary.clone()));
    summary
}

/// A batch running on its own worker thread.
///
/// Events arrive on [`BatchHandle::events`]; the last one is always
/// [`BatchEvent::Completed`].
pub struct BatchHandle {
    events: Receiver<BatchEvent>,
    cancel: Arc<AtomicBool>,
    worker: JoinHandle<BatchSummary>,
}

impl BatchHandle {
    pub fn spawn(jobs: Vec<Job>, options: ConvertOptions) -> Self {
        let (tx, events) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let worker_cancel = Arc::clone(&cancel);

        let worker = thread::spawn(move || {
            run_queue(&jobs, &options, &worker_cancel, |event| {
                // Receiver gone means nobody is listening; keep converting
                let _ = tx.send(event);
            })
        });

        Self {
            events,
            cancel,
            worker,
        }
    }

    pub fn events(&self) -> &Receiver<BatchEvent> {
        &self.events
    }

    /// Skip every file that has not started yet
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Wait for the worker to finish and return its summary
    pub fn join(self) -> BatchSummary {
        drop(self.events);
        match self.worker.join() {
            Ok(summary) => summary,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}
