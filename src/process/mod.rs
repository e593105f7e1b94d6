//! Interpreter process management (spawn, output drain, bounded wait).
//!
//! The interpreter leads its own process group, so anything a script starts
//! is killed together with it once the run is over.

use std::{io, path::Path, process::ExitStatus, process::Stdio, time::Duration};

use log::{debug, warn};
use tokio::{
    io::{AsyncRead, AsyncReadExt},
    process::{Child, ChildStderr, ChildStdout, Command},
    time::{sleep, timeout},
};

use crate::config::Interpreter;

/// How long the pipes are still read once the interpreter is gone.
pub const DRAIN_GRACE: Duration = Duration::from_millis(250);

const CHUNK: usize = 8 * 1024;

pub struct ProcessHandle {
    pub child: Child,
    /// Also the process group id on unix.
    pub pid: Option<u32>,
    pub stdout: ChildStdout,
    pub stderr: ChildStderr,
}

#[derive(Debug)]
pub enum Exit {
    Exited(ExitStatus),
    TimedOut,
    WaitFailed(io::Error),
}

#[derive(Debug)]
pub struct Captured {
    pub exit: Exit,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Start `interpreter` with `script` as its program argument, in `workdir`.
pub fn spawn(interpreter: &Interpreter, script: &Path, workdir: &Path) -> io::Result<ProcessHandle> {
    let mut cmd = Command::new(&interpreter.program);
    cmd.args(&interpreter.args)
        .arg(script)
        .current_dir(workdir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    cmd.process_group(0);

    let mut child = cmd.spawn()?;
    let pid = child.id();
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "no stdout"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "no stderr"))?;

    debug!("spawned {} {} (pid {:?})", interpreter, script.display(), pid);
    Ok(ProcessHandle {
        child,
        pid,
        stdout,
        stderr,
    })
}

/// Wait for the process while draining both pipes.
///
/// Output is read as it arrives so a chatty child never stalls on a full
/// pipe. The run is `TimedOut` only if `limit` passes before the
/// interpreter exits; after its exit the pipes get at most `DRAIN_GRACE`.
/// Either way the whole process group is killed before returning.
pub async fn supervise(handle: ProcessHandle, limit: Duration) -> Captured {
    let ProcessHandle {
        mut child,
        pid,
        mut stdout,
        mut stderr,
    } = handle;
    let mut out = Vec::new();
    let mut err = Vec::new();

    let exit = {
        let drains = async {
            tokio::join!(
                drain(&mut stdout, &mut out, "stdout"),
                drain(&mut stderr, &mut err, "stderr"),
            );
        };
        tokio::pin!(drains);
        let bound = sleep(limit);
        tokio::pin!(bound);
        let mut drained = false;

        let waited = loop {
            tokio::select! {
                status = child.wait() => break Some(status),
                _ = &mut drains, if !drained => drained = true,
                _ = &mut bound => break None,
            }
        };

        let exit = match waited {
            Some(Ok(status)) => Exit::Exited(status),
            Some(Err(e)) => Exit::WaitFailed(e),
            None => {
                warn!("process exceeded {}ms, killing", limit.as_millis());
                Exit::TimedOut
            }
        };

        kill_group(pid);
        if !matches!(exit, Exit::Exited(_)) {
            if let Err(e) = child.kill().await {
                warn!("failed to kill process: {}", e);
            }
        }

        if !drained && timeout(DRAIN_GRACE, &mut drains).await.is_err() {
            debug!("output pipes still open after {}ms grace", DRAIN_GRACE.as_millis());
        }
        exit
    };

    Captured {
        exit,
        stdout: out,
        stderr: err,
    }
}

#[cfg(unix)]
fn kill_group(pid: Option<u32>) {
    use nix::{
        errno::Errno,
        sys::signal::{killpg, Signal},
        unistd::Pid,
    };

    let Some(pid) = pid else { return };
    match killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
        Ok(()) => debug!("killed process group {}", pid),
        Err(Errno::ESRCH) => {}
        Err(e) => warn!("failed to kill process group {}: {}", pid, e),
    }
}

#[cfg(not(unix))]
fn kill_group(_pid: Option<u32>) {}

/// Append everything `reader` yields to `buf` until end of stream.
///
/// Cancel safe: a chunk is appended only once its read has completed, so
/// `buf` holds exactly the bytes read when the future is dropped.
async fn drain<R>(reader: &mut R, buf: &mut Vec<u8>, stream: &str)
where
    R: AsyncRead + Unpin,
{
    let mut chunk = [0u8; CHUNK];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!("reading {} failed: {}", stream, e);
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn drain_collects_in_order() {
        let data: Vec<u8> = (0..50_000u32).map(|i| (i % 251) as u8).collect();
        let mut reader: &[u8] = &data;
        let mut buf = Vec::new();
        drain(&mut reader, &mut buf, "test").await;
        assert_eq!(buf, data);
    }

    #[tokio::test]
    async fn spawn_missing_program_fails() {
        let dir = tempfile::tempdir().unwrap();
        let interp = Interpreter::new("/definitely/not/an/interpreter");
        let res = spawn(&interp, &dir.path().join("x.py"), dir.path());
        assert!(res.is_err());
    }
}
