//! External tool invocation
//!
//! Linters and doc generators run as synchronous child processes with a
//! deadline. On timeout the child is killed and whatever it had written is
//! still returned, so it can be logged.

use galaxy_importer_core::{Error, ImporterConfig, Result};
use std::io::Read;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use wait_timeout::ChildExt;

/// Linter executable
pub const ANSIBLE_LINT: &str = "ansible-lint";

/// Output of an external tool run
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    /// Exit status, `None` when the process was killed on timeout
    pub status: Option<ExitStatus>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.status.is_some_and(|s| s.success())
    }

    /// Non-empty lines of stdout then stderr
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.stdout
            .lines()
            .chain(self.stderr.lines())
            .map(str::trim_end)
            .filter(|l| !l.trim().is_empty())
    }
}

/// A command line tool run with a deadline
#[derive(Debug, Clone)]
pub struct ExternalTool {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl ExternalTool {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Whether the program can be found on `PATH`
    pub fn is_available(&self) -> bool {
        which::which(&self.program).is_ok()
    }

    /// Run in `cwd`, capturing output
    pub fn run(&self, cwd: &Path) -> Result<ToolOutput> {
        debug!("Running {} {}", self.program, self.args.join(" "));

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::ansible_test(format!("Failed to run {}: {}", self.program, e)))?;

        // pipes are drained while waiting
        let stdout = child.stdout.take().map(spawn_reader);
        let stderr = child.stderr.take().map(spawn_reader);

        let waited = child.wait_timeout(self.timeout).map_err(|e| {
            Error::ansible_test(format!("Failed to wait for {}: {}", self.program, e))
        })?;
        let (status, timed_out) = match waited {
            Some(status) => (Some(status), false),
            None => {
                let _ = child.kill();
                let _ = child.wait();
                (None, true)
            }
        };

        Ok(ToolOutput {
            status,
            stdout: join_reader(stdout),
            stderr: join_reader(stderr),
            timed_out,
        })
    }
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn join_reader(handle: Option<thread::JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

/// Run `ansible-lint` over a collection and log its findings
///
/// Never fails the import: a missing linter, findings, crashes and
/// timeouts are all logged. Returns the finding lines.
pub fn run_linter(config: &ImporterConfig, root: &Path) -> Vec<String> {
    if !config.run_ansible_lint {
        debug!("ansible-lint disabled by config");
        return Vec::new();
    }

    let tool = ExternalTool::new(
        ANSIBLE_LINT,
        Duration::from_secs(config.ansible_lint_timeout),
    )
    .args(["--profile", "production", "--parseable", "--nocolor", "--offline"]);

    if !tool.is_available() {
        warn!("{} not found, skipping lint", ANSIBLE_LINT);
        return Vec::new();
    }

    info!("Linting collection via {}...", ANSIBLE_LINT);
    let output = match tool.run(root) {
        Ok(output) => output,
        Err(e) => {
            error!("{}", e);
            return Vec::new();
        }
    };

    report_lint_output(&output, config.ansible_lint_timeout)
}

/// Log a linter run; tracebacks are errors, everything else a warning
pub fn report_lint_output(output: &ToolOutput, timeout_secs: u64) -> Vec<String> {
    let crashed = output.stderr.contains("Traceback (most recent call last)");
    let mut findings = Vec::new();

    for line in output.lines() {
        if crashed {
            error!("{}", line);
        } else {
            warn!("{}", line);
        }
        findings.push(line.to_string());
    }

    if output.timed_out {
        error!(
            "{} exceeded the {}s timeout and was terminated",
            ANSIBLE_LINT, timeout_secs
        );
    } else if crashed {
        error!("{} failed unexpectedly", ANSIBLE_LINT);
    } else if findings.is_empty() {
        info!("...{} found no issues", ANSIBLE_LINT);
    }

    findings
}
