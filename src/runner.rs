//! Runs the converter on a worker thread and reports back over a channel.
//! stdout and stderr share one pipe so lines keep their write order.

use std::io::{self, BufRead, BufReader, Read};
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use log::{debug, error, info, trace, warn};

use crate::error::RunError;
use crate::models::request::ConversionRequest;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x08000000;

/// Wakes whatever loop consumes [`RunEvent`]s.
pub trait Notify: Send + Sync + 'static {
    fn notify(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnOptions {
    /// Keep the child from opening a console window. Only has an effect on
    /// Windows.
    pub hide_console: bool,
}

impl Default for SpawnOptions {
    fn default() -> Self {
        Self {
            hide_console: cfg!(windows),
        }
    }
}

#[derive(Debug)]
pub enum RunEvent {
    Spawned { pid: u32 },
    Output(String),
    /// Exit code; `-1` when the child was ended by a signal.
    Exited(i32),
    Failed(RunError),
}

impl RunEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunEvent::Exited(_) | RunEvent::Failed(_))
    }
}

/// Starts a worker thread for `request`. Only fails if the thread itself
/// cannot be created; everything after that arrives on `events`.
pub fn spawn(
    request: ConversionRequest,
    options: SpawnOptions,
    events: Sender<RunEvent>,
    notify: Arc<dyn Notify>,
) -> Result<JoinHandle<()>, RunError> {
    thread::Builder::new()
        .name("converter-run".to_string())
        .spawn(move || {
            let mut publish = |event: RunEvent| {
                if events.send(event).is_err() {
                    trace!("run event dropped, receiver is gone");
                }
                notify.notify();
            };

            let terminal = match execute(&request, options, &mut publish) {
                Ok(code) => RunEvent::Exited(code),
                Err(err) => {
                    error!("{err}");
                    RunEvent::Failed(err)
                }
            };
            publish(terminal);
        })
        .map_err(RunError::Worker)
}

/// Blocking body of a run: launch, forward every output line, wait for exit.
pub fn execute(
    request: &ConversionRequest,
    options: SpawnOptions,
    mut on_event: impl FnMut(RunEvent),
) -> Result<i32, RunError> {
    let (mut child, output) = launch(request, options)?;
    info!("converter started with pid {}", child.id());
    on_event(RunEvent::Spawned { pid: child.id() });

    if let Err(err) = stream_lines(output, |line| on_event(RunEvent::Output(line))) {
        // The read end is closed by now, so a child still writing gets EPIPE
        // and this wait cannot hang on a full pipe.
        warn!("output stream broke, reaping child: {err}");
        if let Err(wait_err) = child.wait() {
            debug!("reaping after read failure failed: {wait_err}");
        }
        return Err(RunError::Read(err));
    }

    let status = child.wait().map_err(RunError::Wait)?;
    info!("converter finished: {status}");
    Ok(status.code().unwrap_or(-1))
}

fn launch(
    request: &ConversionRequest,
    options: SpawnOptions,
) -> Result<(Child, io::PipeReader), RunError> {
    let argv = request.build_command();
    let Some((program, args)) = argv.split_first() else {
        return Err(RunError::Spawn(io::Error::new(
            io::ErrorKind::InvalidInput,
            "empty command line",
        )));
    };

    let (reader, writer) = io::pipe().map_err(RunError::Spawn)?;

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(writer.try_clone().map_err(RunError::Spawn)?)
        .stderr(writer);
    configure_child_process(&mut command, options);

    debug!("spawning {:?}", argv);
    let child = command.spawn().map_err(RunError::Spawn)?;

    // `command` still holds our copies of the write end; the reader only sees
    // EOF once they are closed.
    drop(command);

    Ok((child, reader))
}

fn configure_child_process(command: &mut Command, options: SpawnOptions) {
    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;

        if options.hide_console {
            command.creation_flags(CREATE_NO_WINDOW);
        }
    }

    #[cfg(not(windows))]
    let _ = (command, options.hide_console);
}

/// Splits `output` into lines ending at `\r`, `\n` or `\r\n`, so progress
/// updates written with a bare `\r` are forwarded as they arrive. Invalid
/// UTF-8 is replaced.
fn stream_lines(output: impl Read, mut on_line: impl FnMut(String)) -> io::Result<()> {
    let mut reader = BufReader::new(output);
    let mut line = Vec::new();
    let mut after_cr = false;

    let mut emit = |line: &mut Vec<u8>| {
        let text = String::from_utf8_lossy(line).into_owned();
        trace!("converter: {text}");
        on_line(text);
        line.clear();
    };

    loop {
        let available = match reader.fill_buf() {
            Ok(available) => available,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };

        if available.is_empty() {
            if !line.is_empty() {
                emit(&mut line);
            }
            return Ok(());
        }

        for &byte in available {
            if std::mem::take(&mut after_cr) && byte == b'\n' {
                continue;
            }
            match byte {
                b'\r' => {
                    emit(&mut line);
                    after_cr = true;
                }
                b'\n' => emit(&mut line),
                _ => line.push(byte),
            }
        }

        let consumed = available.len();
        reader.consume(consumed);
    }
}
