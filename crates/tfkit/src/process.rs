//! Run child processes while streaming their output into writers.

use std::io::{self, Read, Write};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;

use crate::error::{Error, Result};

/// Where a child's standard error goes.
pub enum StderrTarget<'a> {
    /// Copy into this writer
    Capture(&'a mut (dyn Write + Send)),
    /// Leave attached to the parent's stderr, uncaptured
    Inherit,
}

/// Spawn `cmd` and copy its stdout into `stdout` and its stderr per `stderr`
/// until the child exits.
///
/// Both pipes are drained on scoped threads so a chatty stderr cannot block
/// the child while stdout is being read. Stdin is closed.
pub fn run_streamed(
    cmd: &mut Command,
    stdout: &mut (dyn Write + Send),
    stderr: StderrTarget<'_>,
) -> Result<ExitStatus> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    log::debug!("Running: {}", describe(cmd));

    cmd.stdin(Stdio::null()).stdout(Stdio::piped());
    match stderr {
        StderrTarget::Capture(_) => cmd.stderr(Stdio::piped()),
        StderrTarget::Inherit => cmd.stderr(Stdio::inherit()),
    };

    let mut child = cmd.spawn().map_err(|source| Error::Launch {
        program: program.clone(),
        source,
    })?;

    let child_stdout = child.stdout.take();
    let child_stderr = child.stderr.take();

    let copied = thread::scope(|scope| {
        let err_handle = match (stderr, child_stderr) {
            (StderrTarget::Capture(writer), Some(pipe)) => {
                Some(scope.spawn(move || pump(pipe, writer)))
            }
            _ => None,
        };

        let out_result = match child_stdout {
            Some(pipe) => pump(pipe, stdout),
            None => Ok(()),
        };

        let err_result = match err_handle {
            Some(handle) => handle
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("stderr reader thread panicked"))),
            None => Ok(()),
        };

        out_result.and(err_result)
    });

    let status = child.wait()?;
    copied?;

    log::debug!("{program} finished with {status}");
    Ok(status)
}

/// Like [`run_streamed`], but a non-zero exit becomes [`Error::ExitStatus`].
pub fn run_checked(
    cmd: &mut Command,
    stdout: &mut (dyn Write + Send),
    stderr: StderrTarget<'_>,
) -> Result<()> {
    let status = run_streamed(cmd, stdout, stderr)?;
    if status.success() {
        Ok(())
    } else {
        Err(Error::ExitStatus {
            program: cmd.get_program().to_string_lossy().into_owned(),
            status,
        })
    }
}

/// Copy everything from `reader` into `writer` chunk by chunk.
fn pump<R: Read>(mut reader: R, writer: &mut (dyn Write + Send)) -> io::Result<()> {
    let mut chunk = [0u8; 8192];
    loop {
        let n = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&chunk[..n])?;
    }
    writer.flush()
}

/// Render a command line for logging.
pub fn describe(cmd: &Command) -> String {
    let mut parts = vec![cmd.get_program().to_string_lossy().into_owned()];
    parts.extend(cmd.get_args().map(|a| a.to_string_lossy().into_owned()));
    parts.join(" ")
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::sink::CaptureSink;

    #[test]
    fn test_captures_both_streams() {
        let mut out = CaptureSink::new();
        let mut err = CaptureSink::new();
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo planning; echo warning >&2"]);

        let status = run_streamed(&mut cmd, &mut out, StderrTarget::Capture(&mut err)).unwrap();

        assert!(status.success());
        assert_eq!(out.contents(), "planning\n");
        assert_eq!(err.contents(), "warning\n");
    }

    #[test]
    fn test_inherit_leaves_stderr_uncaptured() {
        let mut out = CaptureSink::new();
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo applied"]);

        run_streamed(&mut cmd, &mut out, StderrTarget::Inherit).unwrap();
        assert_eq!(out.contents(), "applied\n");
    }

    #[test]
    fn test_large_output_does_not_deadlock() {
        let mut out = CaptureSink::new();
        let mut err = CaptureSink::new();
        let mut cmd = Command::new("sh");
        cmd.args([
            "-c",
            "i=0; while [ $i -lt 5000 ]; do echo line$i; echo err$i >&2; i=$((i+1)); done",
        ]);

        run_streamed(&mut cmd, &mut out, StderrTarget::Capture(&mut err)).unwrap();
        assert_eq!(out.contents().lines().count(), 5000);
        assert_eq!(err.contents().lines().count(), 5000);
    }

    #[test]
    fn test_checked_reports_exit_status() {
        let mut out = CaptureSink::new();
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo partial; exit 3"]);

        let err = run_checked(&mut cmd, &mut out, StderrTarget::Inherit).unwrap_err();
        match err {
            Error::ExitStatus { program, status } => {
                assert_eq!(program, "sh");
                assert_eq!(status.code(), Some(3));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(out.contents(), "partial\n");
    }

    #[test]
    fn test_missing_program_is_launch_error() {
        let mut out = CaptureSink::new();
        let mut cmd = Command::new("tfkit-definitely-not-installed");

        let err = run_streamed(&mut cmd, &mut out, StderrTarget::Inherit).unwrap_err();
        assert!(matches!(err, Error::Launch { .. }));
        assert!(out.contents().is_empty());
    }

    #[test]
    fn test_describe() {
        let mut cmd = Command::new("terraform");
        cmd.args(["init", "-upgrade=true"]);
        assert_eq!(describe(&cmd), "terraform init -upgrade=true");
    }
}
