//! Command implementations for the GenPlay CLI

pub mod combine;
pub mod stats;
pub mod transform;
pub mod translate;

use anyhow::{Context, Result};
use genplay_core::io::BedGraphReader;
use genplay_core::{CancellationToken, OperationPool, WindowList};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crate::config::Config;
use crate::error::CliError;

/// Pool, stop token and display settings shared by the track commands.
///
/// Nothing raises the token from the command line, so every batch runs to
/// completion or fails with an error.
pub struct Session {
    pool: OperationPool,
    token: CancellationToken,
    show_progress: bool,
}

impl Session {
    pub fn new(config: &Config, deterministic: bool, threads: Option<usize>, quiet: bool) -> Result<Self> {
        let pool = if deterministic || config.general.deterministic {
            log::info!("Deterministic mode: running operations on one thread");
            OperationPool::sequential().with_stop_check_interval(config.pool.stop_check_interval)
        } else {
            OperationPool::new(&config.pool_config(threads)).context("Failed to create operation pool")?
        };
        log::debug!("Operation pool ready with {} worker(s)", pool.threads());

        Ok(Self {
            pool,
            token: CancellationToken::new(),
            show_progress: !quiet,
        })
    }

    /// Run `work` while a spinner reports how many chromosomes are done
    pub fn with_progress<T>(&self, label: &str, work: impl FnOnce(&OperationPool, &CancellationToken) -> T) -> T {
        if !self.show_progress {
            return work(&self.pool, &self.token);
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(label.to_string());

        let finished = AtomicBool::new(false);
        let result = thread::scope(|scope| {
            scope.spawn(|| {
                while !finished.load(Ordering::Relaxed) {
                    let progress = self.pool.progress();
                    pb.set_message(format!(
                        "{} ({}/{} chromosomes)",
                        label, progress.done, progress.total
                    ));
                    pb.tick();
                    thread::sleep(Duration::from_millis(100));
                }
            });
            let result = work(&self.pool, &self.token);
            finished.store(true, Ordering::Relaxed);
            result
        });

        pb.finish_and_clear();
        result
    }
}

/// Result of an operation run through a [`Session`]
pub fn completed<T>(outcome: Option<T>) -> Result<T, CliError> {
    outcome.ok_or_else(|| CliError::operation("stopped before every chromosome was processed"))
}

/// Read a bedGraph track, reporting a missing file with suggestions
pub fn load_track(path: &Path) -> Result<WindowList> {
    if !path.exists() {
        return Err(CliError::file_not_found(path.to_path_buf()).into());
    }
    BedGraphReader::read_file(path).map_err(|e| {
        CliError::parse(path.display().to_string(), e.to_string()).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use genplay_core::{ScoredWindow, TransformOperation};

    fn quiet_session() -> Session {
        Session::new(&Config::default(), true, None, true).unwrap()
    }

    #[test]
    fn test_session_runs_to_completion() {
        let mut track = WindowList::new();
        track.push_chromosome("chr1", vec![ScoredWindow::new(0, 10, 1.0)]);
        let op = TransformOperation::Density { half_width: 1 };

        let outcome = quiet_session()
            .with_progress("density", |pool, token| op.compute(&track, pool, token))
            .unwrap();
        let result = completed(outcome).unwrap();
        assert_eq!(result.window_count(), 1);
    }

    #[test]
    fn test_stopped_batch_is_an_operation_error() {
        let err = completed::<WindowList>(None).unwrap_err();
        assert!(matches!(err, CliError::Operation { .. }));
    }
}
