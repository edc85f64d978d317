use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::JoinHandle;

use log::{debug, info, warn};

use crate::log_sink::LogBuffer;
use crate::models::form::FormState;
use crate::runner::{self, Notify, RunEvent, SpawnOptions};

pub const WORKER_LOST: &str = "Conversion worker stopped unexpectedly.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    /// `pid` is filled in once the child has actually been created.
    Running { pid: Option<u32> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// Nothing to convert; a message was logged.
    Rejected,
    /// A run is in progress; nothing happened.
    AlreadyRunning,
    /// The worker thread could not be created; a message was logged.
    Failed,
}

/// UI-thread side of a conversion; the worker only reaches it through `poll`.
pub struct Controller {
    form: FormState,
    log: LogBuffer,
    state: RunState,
    spawn_options: SpawnOptions,
    notify: Arc<dyn Notify>,
    events: Option<Receiver<RunEvent>>,
    worker: Option<JoinHandle<()>>,
}

impl Controller {
    pub fn new(form: FormState, spawn_options: SpawnOptions, notify: Arc<dyn Notify>) -> Self {
        Self {
            form,
            log: LogBuffer::default(),
            state: RunState::Idle,
            spawn_options,
            notify,
            events: None,
            worker: None,
        }
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormState {
        &mut self.form
    }

    pub fn log(&self) -> &LogBuffer {
        &self.log
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, RunState::Running { .. })
    }

    /// Whether the start control should be enabled.
    pub fn can_start(&self) -> bool {
        !self.is_running()
    }

    pub fn start(&mut self) -> StartOutcome {
        if self.is_running() {
            debug!("start ignored, a conversion is already running");
            return StartOutcome::AlreadyRunning;
        }

        let request = match self.form.snapshot() {
            Ok(request) => request,
            Err(err) => {
                self.log.append(err.to_string());
                return StartOutcome::Rejected;
            }
        };

        self.log
            .append(format!("Running command: {}", request.display_command()));
        self.log.append("");

        let (tx, rx) = mpsc::channel();
        match runner::spawn(request, self.spawn_options, tx, self.notify.clone()) {
            Ok(handle) => {
                self.state = RunState::Running { pid: None };
                self.events = Some(rx);
                self.worker = Some(handle);
                StartOutcome::Started
            }
            Err(err) => {
                warn!("{err}");
                self.log.append(err.to_string());
                StartOutcome::Failed
            }
        }
    }

    /// Applies every event the worker has queued so far, in order. Returns
    /// how many were applied.
    pub fn poll(&mut self) -> usize {
        let Some(events) = self.events.take() else {
            return 0;
        };

        let mut applied = 0;
        loop {
            match events.try_recv() {
                Ok(event) => {
                    applied += 1;
                    let terminal = event.is_terminal();
                    self.apply(event);
                    if terminal {
                        self.finish();
                        return applied;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    warn!("run channel closed without a final event");
                    self.log.append(WORKER_LOST);
                    self.finish();
                    return applied;
                }
            }
        }

        self.events = Some(events);
        applied
    }

    fn apply(&mut self, event: RunEvent) {
        match event {
            RunEvent::Spawned { pid } => {
                self.state = RunState::Running { pid: Some(pid) };
            }
            RunEvent::Output(line) => self.log.append(line),
            RunEvent::Exited(code) => {
                info!("conversion finished with exit code {code}");
                self.log.append("");
                self.log
                    .append(format!("Process finished with exit code: {code}"));
            }
            RunEvent::Failed(err) => {
                self.log.append("");
                self.log.append(err.to_string());
            }
        }
    }

    fn finish(&mut self) {
        self.state = RunState::Idle;
        self.events = None;

        // The worker sends its final event just before returning, so only
        // join when that has already happened and never block the caller.
        if let Some(handle) = self.worker.take()
            && handle.is_finished()
            && handle.join().is_err()
        {
            warn!("conversion worker panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RunError;
    use crate::models::settings::ToolSettings;
    use std::io;
    use std::path::PathBuf;
    use std::time::{Duration, Instant};

    struct NoopNotify;

    impl Notify for NoopNotify {
        fn notify(&self) {}
    }

    fn controller_with_tool(program: &str, leading_args: &[&str]) -> Controller {
        let mut form = FormState::default();
        form.tool = ToolSettings {
            program: program.to_string(),
            leading_args: leading_args.iter().map(|s| s.to_string()).collect(),
        };
        Controller::new(form, SpawnOptions::default(), Arc::new(NoopNotify))
    }

    fn run_to_idle(controller: &mut Controller) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while controller.is_running() {
            assert!(Instant::now() < deadline, "run did not finish in time");
            controller.poll();
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn empty_file_list_logs_one_line_and_stays_idle() {
        let mut controller = controller_with_tool("sh", &[]);

        assert_eq!(controller.start(), StartOutcome::Rejected);
        assert_eq!(controller.log().lines(), &["No input files selected."]);
        assert_eq!(controller.state(), RunState::Idle);
        assert!(controller.can_start());
        assert_eq!(controller.poll(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn second_start_while_running_is_ignored() {
        let mut controller = controller_with_tool("sh", &["-c", "sleep 0.3; echo done", "sh"]);
        controller
            .form_mut()
            .add_files(vec![PathBuf::from("book1.mp3")]);

        assert_eq!(controller.start(), StartOutcome::Started);
        assert!(!controller.can_start());
        let logged = controller.log().len();

        assert_eq!(controller.start(), StartOutcome::AlreadyRunning);
        assert_eq!(controller.log().len(), logged);

        run_to_idle(&mut controller);
        let lines = controller.log().lines();
        assert_eq!(
            lines.iter().filter(|l| l.starts_with("Running command:")).count(),
            1
        );
        assert_eq!(lines.iter().filter(|l| *l == "done").count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn streamed_lines_then_summary() {
        let mut controller = controller_with_tool(
            "sh",
            &["-c", "echo line1; echo line2 >&2; echo line3", "sh"],
        );
        controller
            .form_mut()
            .add_files(vec![PathBuf::from("a.mp3"), PathBuf::from("b.mp3")]);

        assert_eq!(controller.start(), StartOutcome::Started);
        run_to_idle(&mut controller);

        let lines = controller.log().lines();
        assert!(lines[0].starts_with("Running command: sh -c"));
        assert!(lines[0].ends_with("--assume-yes --custom-name %(title)s --no-mp4v2 a.mp3 b.mp3"));
        assert_eq!(lines[1], "");
        assert_eq!(
            &lines[lines.len() - 5..],
            &["line1", "line2", "line3", "", "Process finished with exit code: 0"]
        );
        assert!(controller.can_start());
        assert_eq!(controller.state(), RunState::Idle);
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_just_reported() {
        let mut controller = controller_with_tool("sh", &["-c", "exit 3", "sh"]);
        controller.form_mut().add_files(vec![PathBuf::from("a.mp3")]);

        controller.start();
        run_to_idle(&mut controller);

        assert_eq!(
            controller.log().lines().last().map(String::as_str),
            Some("Process finished with exit code: 3")
        );
        assert!(controller.can_start());
    }

    #[test]
    fn launch_failure_is_logged_and_start_reenabled() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no-such-converter");
        let mut controller = controller_with_tool(&missing.to_string_lossy(), &[]);
        controller.form_mut().add_files(vec![PathBuf::from("a.mp3")]);

        assert_eq!(controller.start(), StartOutcome::Started);
        run_to_idle(&mut controller);

        let lines = controller.log().lines();
        assert!(
            lines
                .last()
                .is_some_and(|l| l.starts_with("Error starting process: "))
        );
        assert!(!lines.iter().any(|l| l.starts_with("Process finished")));
        assert!(controller.can_start());
    }

    #[cfg(unix)]
    #[test]
    fn form_edits_during_run_do_not_affect_it() {
        let mut controller =
            controller_with_tool("sh", &["-c", r#"sleep 0.2; printf '%s\n' "$@""#, "sh"]);
        controller.form_mut().add_files(vec![PathBuf::from("first.mp3")]);
        controller.form_mut().options.no_mp4v2 = false;
        controller.form_mut().custom_name.clear();

        controller.start();
        controller.form_mut().add_files(vec![PathBuf::from("second.mp3")]);
        controller.form_mut().options.debug = true;
        run_to_idle(&mut controller);

        let lines = controller.log().lines();
        assert_eq!(
            &lines[2..],
            &["--assume-yes", "first.mp3", "", "Process finished with exit code: 0"]
        );
        assert_eq!(controller.form().files().len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn runs_back_to_back() {
        let mut controller = controller_with_tool("sh", &["-c", "echo hi", "sh"]);
        controller.form_mut().add_files(vec![PathBuf::from("a.mp3")]);

        for _ in 0..2 {
            assert_eq!(controller.start(), StartOutcome::Started);
            run_to_idle(&mut controller);
        }

        let summaries = controller
            .log()
            .lines()
            .iter()
            .filter(|l| l.starts_with("Process finished with exit code: 0"))
            .count();
        assert_eq!(summaries, 2);
    }

    #[test]
    fn read_failure_is_logged_without_summary() {
        let mut controller = controller_with_tool("unused", &[]);
        let (tx, rx) = mpsc::channel();
        controller.events = Some(rx);
        controller.state = RunState::Running { pid: None };

        tx.send(RunEvent::Spawned { pid: 42 }).unwrap();
        tx.send(RunEvent::Output("partial".into())).unwrap();
        tx.send(RunEvent::Failed(RunError::Read(io::Error::new(
            io::ErrorKind::BrokenPipe,
            "pipe went away",
        ))))
        .unwrap();

        assert_eq!(controller.poll(), 3);
        assert_eq!(
            controller.log().lines(),
            &["partial", "", "Error reading process output: pipe went away"]
        );
        assert_eq!(controller.state(), RunState::Idle);
        assert!(controller.can_start());
        assert_eq!(controller.poll(), 0);
    }

    #[test]
    fn lost_worker_returns_to_idle() {
        let mut controller = controller_with_tool("unused", &[]);
        let (tx, rx) = mpsc::channel();
        controller.events = Some(rx);
        controller.state = RunState::Running { pid: None };

        tx.send(RunEvent::Output("half done".into())).unwrap();
        drop(tx);

        assert_eq!(controller.poll(), 1);
        assert_eq!(controller.log().lines(), &["half done", WORKER_LOST]);
        assert_eq!(controller.state(), RunState::Idle);
    }
}
