//! Scoring engine subprocess lifecycle
//!
//! Owns the external scoring process and its pipes, governed by an explicit
//! state machine: a session begins `NotStarted`, moves to `Running` on a
//! successful launch (or `Failed` on a launch error), and ends `Closed`.
//! The child handle and pipe ends only exist inside the `Running` state, so
//! a closed or failed session cannot touch the pipes.
//!
//! Anonymous pipes have no read timeout, so a dedicated thread drains the
//! engine's stdout line by line into a channel and `query` waits on the
//! channel with a deadline. A hung or under-writing engine therefore maps
//! to a timeout error instead of blocking forever.

use crate::engine::protocol::{self, ProtocolError, ScoreMap};
use crate::engine::{EngineConfig, INTERACTIVE_FLAG};
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

/// How long `close` waits for the engine to exit on its own before killing it
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while driving the engine process
#[derive(Debug)]
pub enum EngineError {
    /// The engine executable could not be started
    Launch(std::io::Error),
    /// `start` was called on a session that already left `NotStarted`
    AlreadyStarted,
    /// `query` was called before `start` or after `close`
    NotRunning,
    /// A pipe write or read failed (engine crashed or closed its pipes)
    Io(std::io::Error),
    /// The engine produced no full response within the bounded wait
    Timeout(Duration),
    /// The response payload could not be decoded
    Protocol(ProtocolError),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Launch(e) => write!(f, "failed to launch the scoring engine: {}", e),
            EngineError::AlreadyStarted => {
                write!(f, "the engine session has already been started")
            }
            EngineError::NotRunning => {
                write!(f, "the engine is not running; start a session first")
            }
            EngineError::Io(e) => write!(f, "engine I/O failed (engine died?): {}", e),
            EngineError::Timeout(limit) => write!(
                f,
                "engine gave no response within {}s (engine slow or hung)",
                limit.as_secs_f64()
            ),
            EngineError::Protocol(e) => write!(f, "bad engine response: {}", e),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        EngineError::Io(e)
    }
}

/// Lifecycle state. The live process only exists in `Running`.
enum SessionState {
    NotStarted,
    Running(EngineProcess),
    Failed,
    Closed,
}

/// A live engine: the child, its writable stdin, and the receiving end of
/// the stdout reader thread.
struct EngineProcess {
    child: Child,
    stdin: ChildStdin,
    lines: Receiver<std::io::Result<String>>,
}

impl EngineProcess {
    /// Best-effort shutdown: send the quit payload, close stdin, reap the
    /// child. The stdout pipe is released when the reader thread sees EOF,
    /// which the reap below guarantees.
    fn shutdown(mut self) {
        if let Err(e) = self
            .stdin
            .write_all(protocol::QUIT_PAYLOAD)
            .and_then(|()| self.stdin.flush())
        {
            eprintln!("fim: engine quit write failed: {}", e);
        }
        drop(self.stdin);

        // Give the engine a moment to exit on its own, then force it.
        let deadline = std::time::Instant::now() + SHUTDOWN_GRACE;
        loop {
            match self.child.try_wait() {
                Ok(Some(_)) => return,
                Ok(None) => {
                    if std::time::Instant::now() >= deadline {
                        break;
                    }
                    thread::sleep(Duration::from_millis(20));
                }
                Err(e) => {
                    eprintln!("fim: engine wait failed: {}", e);
                    break;
                }
            }
        }

        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// One scoring engine process, from `start` to `close`.
///
/// The session is the exclusive owner of the subprocess and both pipe ends;
/// the orchestrator constructs exactly one per CLI invocation.
pub struct EngineSession {
    config: EngineConfig,
    state: SessionState,
}

impl EngineSession {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            state: SessionState::NotStarted,
        }
    }

    /// Whether the engine process is currently live.
    pub fn is_running(&self) -> bool {
        matches!(self.state, SessionState::Running(_))
    }

    /// Launch the engine over the given candidate set.
    ///
    /// The candidates are passed as positional arguments after the
    /// interactive flag, per the engine's launch contract, and are fixed for
    /// the life of the session. On a launch error the session becomes
    /// `Failed` and permanently rejects further operations.
    pub fn start(&mut self, candidates: &[String]) -> EngineResult<()> {
        if !matches!(self.state, SessionState::NotStarted) {
            return Err(EngineError::AlreadyStarted);
        }

        // Resolve a relative engine program before changing the working
        // directory, so `./venv/bin/python` keeps meaning the caller's venv.
        let program = if self.config.program.is_absolute() {
            self.config.program.clone()
        } else {
            std::fs::canonicalize(&self.config.program)
                .unwrap_or_else(|_| self.config.program.clone())
        };

        let mut cmd = Command::new(program);
        cmd.args(&self.config.args)
            .arg(INTERACTIVE_FLAG)
            .args(candidates)
            .current_dir(&self.config.working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());

        #[cfg(target_os = "linux")]
        {
            use std::os::unix::process::CommandExt;
            // SAFETY: pdeathsig only calls prctl, which is async-signal-safe.
            unsafe {
                cmd.pre_exec(pdeathsig);
            }
        }

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                self.state = SessionState::Failed;
                return Err(EngineError::Launch(e));
            }
        };

        let (stdin, stdout) = match (child.stdin.take(), child.stdout.take()) {
            (Some(stdin), Some(stdout)) => (stdin, stdout),
            _ => {
                let _ = child.kill();
                let _ = child.wait();
                self.state = SessionState::Failed;
                return Err(EngineError::Launch(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "engine pipes unavailable",
                )));
            }
        };

        let (tx, lines) = mpsc::channel();
        let mut reader = BufReader::new(stdout);
        thread::spawn(move || {
            loop {
                let mut line = String::new();
                match reader.read_line(&mut line) {
                    // EOF: engine closed its stdout
                    Ok(0) => break,
                    Ok(_) => {
                        if tx.send(Ok(line)).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        let _ = tx.send(Err(e));
                        break;
                    }
                }
            }
        });

        self.state = SessionState::Running(EngineProcess {
            child,
            stdin,
            lines,
        });
        Ok(())
    }

    /// Send one query batch and block until a full response is decoded.
    ///
    /// Fails with `NotRunning` unless the session is live, `Io` when a pipe
    /// write or read fails, `Timeout` when the bounded wait elapses, and
    /// `Protocol` when the response cannot be decoded. The session stays
    /// `Running` on query failure so `close` can still reap the process.
    pub fn query(&mut self, queries: &[String]) -> EngineResult<ScoreMap> {
        let timeout = self.config.query_timeout;
        let process = match &mut self.state {
            SessionState::Running(process) => process,
            _ => return Err(EngineError::NotRunning),
        };

        let request = protocol::encode_queries(queries);
        process
            .stdin
            .write_all(request.as_bytes())
            .and_then(|()| process.stdin.flush())?;

        let line = match process.lines.recv_timeout(timeout) {
            Ok(Ok(line)) => line,
            Ok(Err(e)) => return Err(EngineError::Io(e)),
            Err(RecvTimeoutError::Timeout) => return Err(EngineError::Timeout(timeout)),
            Err(RecvTimeoutError::Disconnected) => {
                return Err(EngineError::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "engine closed its output stream",
                )));
            }
        };

        protocol::decode_scores(line.trim_end()).map_err(EngineError::Protocol)
    }

    /// Shut the engine down and release its pipes.
    ///
    /// Idempotent and infallible: closing an already-closed or never-started
    /// session is a no-op, and teardown problems are logged, not raised.
    pub fn close(&mut self) {
        match std::mem::replace(&mut self.state, SessionState::Closed) {
            SessionState::Running(process) => process.shutdown(),
            // Nothing live to tear down; keep the prior state observable
            other => self.state = other,
        }
    }
}

impl Drop for EngineSession {
    fn drop(&mut self) {
        self.close();
    }
}

/// Ask the kernel to SIGTERM the engine if the CLI dies first, so an
/// interrupted invocation cannot orphan the subprocess.
#[cfg(target_os = "linux")]
fn pdeathsig() -> std::io::Result<()> {
    // SAFETY: prctl with PR_SET_PDEATHSIG has no memory-safety conditions.
    unsafe {
        libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
    }
    Ok(())
}
