use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread;

use log::{debug, warn};

use super::command::Invocation;
use super::{PGPErr, Result};

/// Both streams of a batched run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CapturedOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CapturedOutput {
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

fn launch_err(executable: &str, source: io::Error) -> PGPErr {
    PGPErr::Launch { executable: executable.to_string(), source }
}

/// Run with piped streams: the passphrase line (if any) then `input` go to stdin, stdout and
/// stderr are captured.
pub fn run_batched(
    executable: &str,
    invocation: &Invocation,
    input: &[u8],
) -> Result<CapturedOutput> {
    debug!("Running batched: {} {}", executable, invocation.redacted());
    let prefix = invocation.stdin_prefix();
    let needs_stdin = prefix.is_some() || !input.is_empty();

    let mut child = Command::new(executable)
        .args(invocation.args())
        .stdin(if needs_stdin { Stdio::piped() } else { Stdio::null() })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| launch_err(executable, e))?;

    let stdin = if needs_stdin {
        Some(child.stdin.take().ok_or(PGPErr::CannotTakeStdin)?)
    } else {
        None
    };

    // feed stdin from a second thread, a child filling its stdout pipe would otherwise block us
    let (output, written) = thread::scope(|s| {
        let writer = s.spawn(move || -> io::Result<()> {
            if let Some(mut stdin) = stdin {
                if let Some(prefix) = prefix {
                    stdin.write_all(prefix)?;
                }
                stdin.write_all(input)?;
                stdin.flush()?;
            }
            Ok(())
        });
        let output = child.wait_with_output();
        let written = writer.join().unwrap_or_else(|_| {
            Err(io::Error::new(io::ErrorKind::Other, "stdin writer panicked"))
        });
        (output, written)
    });
    let output = output?;

    if !output.status.success() {
        return Err(PGPErr::Execution {
            operation: invocation.operation(),
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        });
    }

    match written {
        // the tool may legitimately stop reading once it has what it needs
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            debug!("{} closed stdin early", invocation.operation());
        }
        Err(e) => return Err(PGPErr::Io(e)),
        Ok(()) => {}
    }

    Ok(CapturedOutput { stdout: output.stdout, stderr: output.stderr })
}

/// Run attached to the caller's terminal. Nothing is captured.
pub fn run_interactive(executable: &str, invocation: &Invocation) -> Result<()> {
    debug!("Running interactive: {} {}", executable, invocation.redacted());
    if invocation.stdin_prefix().is_some() {
        warn!("Passphrase ignored for interactive {}", invocation.operation());
    }
    let status = Command::new(executable)
        .args(invocation.args())
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| launch_err(executable, e))?;
    if status.success() {
        Ok(())
    } else {
        Err(PGPErr::Execution {
            operation: invocation.operation(),
            code: status.code(),
            stdout: Vec::new(),
            stderr: Vec::new(),
        })
    }
}
