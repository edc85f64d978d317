use std::io;

use thiserror::Error;

/// Reasons a conversion request cannot be built from the form.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RequestError {
    #[error("No input files selected.")]
    NoInputFiles,
}

/// Failures of a single converter run. Every variant ends up as a log line.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Error starting process: {0}")]
    Spawn(#[source] io::Error),

    #[error("Error starting process: could not start worker thread: {0}")]
    Worker(#[source] io::Error),

    #[error("Error reading process output: {0}")]
    Read(#[source] io::Error),

    #[error("Error waiting for process: {0}")]
    Wait(#[source] io::Error),
}
