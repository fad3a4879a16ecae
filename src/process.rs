//! Scoped child process with piped stdin/stdout.
//!
//! [`AsyncProcess`] owns the child and any background tasks attached to it.
//! Dropping it aborts those tasks and kills the child if it is still
//! running, so an early return (or a failed parse) never leaks a process.

use std::future::Future;
use std::io;
use std::process::{ExitStatus, Stdio};

use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::task::JoinHandle;

/// Which pipes to open on the child.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessOptions {
    pub enable_stdin: bool,
    pub enable_stdout: bool,
}

/// A running child process and the tasks feeding it.
pub struct AsyncProcess {
    program: String,
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: Option<ChildStdout>,
    tasks: Vec<JoinHandle<()>>,
}

impl AsyncProcess {
    /// Spawn `program` with `args`. Stderr is always discarded.
    pub fn spawn<I, S>(program: &str, args: I, options: ProcessOptions) -> io::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(if options.enable_stdin {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(if options.enable_stdout {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let mut child = command.spawn()?;
        tracing::debug!(program, pid = ?child.id(), "Spawned process");

        Ok(Self {
            program: program.to_string(),
            stdin: child.stdin.take(),
            stdout: child.stdout.take(),
            child,
            tasks: Vec::new(),
        })
    }

    /// Hand stdin over to a feeder task; dropping it there closes the pipe.
    pub fn take_stdin(&mut self) -> Option<ChildStdin> {
        self.stdin.take()
    }

    /// Run `task` in the background for as long as this process lives.
    pub fn attach_task<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tasks.push(tokio::spawn(task));
    }

    /// Read up to `n` bytes; fewer only at end of output.
    pub async fn read(&mut self, n: usize) -> io::Result<Vec<u8>> {
        let stdout = self.stdout.as_mut().ok_or_else(closed_stdout)?;
        let mut buf = Vec::with_capacity(n.min(64 * 1024));
        stdout.take(n as u64).read_to_end(&mut buf).await?;
        Ok(buf)
    }

    /// Read everything the child writes until it closes stdout.
    pub async fn read_to_end(&mut self) -> io::Result<Vec<u8>> {
        let stdout = self.stdout.as_mut().ok_or_else(closed_stdout)?;
        let mut buf = Vec::new();
        stdout.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    /// Wait for the child to exit, leaving attached tasks running.
    pub async fn wait(&mut self) -> io::Result<ExitStatus> {
        self.child.wait().await
    }

    /// Stop attached tasks, close the pipes and wait for the child to exit.
    pub async fn close(mut self) -> io::Result<ExitStatus> {
        for task in self.tasks.drain(..) {
            task.abort();
        }
        self.stdin = None;
        self.stdout = None;
        let status = self.child.wait().await?;
        tracing::debug!(program = %self.program, %status, "Process exited");
        Ok(status)
    }
}

impl Drop for AsyncProcess {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
        // kill_on_drop covers the child itself; this just makes it eager
        let _ = self.child.start_kill();
    }
}

fn closed_stdout() -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, "stdout is not open")
}
