use std::{
    io::{self, Read, Write},
    process::{Child, ChildStdin, Command, Stdio},
    thread,
    time::{Duration, Instant},
};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use log::{debug, error, info, warn};

use super::Shell;
use crate::config::ShellConfig;
use crate::error::{HarnessError, Result};
use crate::models::{result::CommandResult, table::ResultTable};

const EXIT_GRACE: Duration = Duration::from_secs(2);
const TERM_GRACE: Duration = Duration::from_secs(1);
const WAIT_STEP: Duration = Duration::from_millis(50);

/// An external interactive shell driven over its stdin/stdout. Output is
/// read in the background and a response ends when the prompt reappears.
/// On unix stdout and stderr share one pipe, so an error printed before the
/// prompt always lands in the same response.
pub struct ProcessShell {
    child: Child,
    stdin: Option<ChildStdin>,
    receiver: Receiver<Vec<u8>>,
    config: ShellConfig,
    banner: String,
    /// Prompts still owed by commands that timed out.
    stale_prompts: usize,
}

impl ProcessShell {
    pub fn spawn(config: ShellConfig) -> Result<Self> {
        info!("Starting shell '{}'.", config.program);
        let spawn_error = |source: io::Error| HarnessError::Spawn {
            program: config.program.clone(),
            source,
        };
        let (sender, receiver) = unbounded();
        let mut command = Command::new(&config.program);
        command.args(&config.args).stdin(Stdio::piped());

        #[cfg(unix)]
        let mut child = {
            let (output, stdout, stderr) = merged_output().map_err(spawn_error)?;
            let child = command
                .stdout(stdout)
                .stderr(stderr)
                .spawn()
                .map_err(spawn_error)?;
            // the write ends held by `command` must close for EOF to reach us
            drop(command);
            spawn_reader(output, sender);
            child
        };

        #[cfg(not(unix))]
        let mut child = {
            let mut child = command
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .spawn()
                .map_err(spawn_error)?;
            drop(command);
            let stdout = child.stdout.take().ok_or(HarnessError::ShellExited)?;
            let stderr = child.stderr.take().ok_or(HarnessError::ShellExited)?;
            spawn_reader(stdout, sender.clone());
            spawn_reader(stderr, sender);
            child
        };

        let stdin = child.stdin.take();
        let mut shell = ProcessShell {
            child,
            stdin,
            receiver,
            config,
            banner: String::new(),
            stale_prompts: 0,
        };
        shell.banner = shell.read_until_prompt(shell.config.startup_timeout())?;
        debug!("Shell ready (pid {}).", shell.child.id());
        Ok(shell)
    }

    /// Output printed before the first prompt.
    pub fn banner(&self) -> &str {
        &self.banner
    }

    pub fn shutdown(&mut self) -> Result<()> {
        let Some(mut stdin) = self.stdin.take() else {
            return Ok(());
        };
        let _ = writeln!(stdin, "{}", self.config.exit_command);
        let _ = stdin.flush();
        drop(stdin);

        if self.wait_for_exit(EXIT_GRACE)? {
            return Ok(());
        }
        warn!("Shell did not exit, sending SIGTERM.");
        terminate(&self.child);
        if self.wait_for_exit(TERM_GRACE)? {
            return Ok(());
        }
        warn!("Shell ignored SIGTERM, killing.");
        self.child.kill()?;
        self.child.wait()?;
        Ok(())
    }

    fn wait_for_exit(&mut self, grace: Duration) -> Result<bool> {
        let deadline = Instant::now() + grace;
        loop {
            if let Some(status) = self.child.try_wait()? {
                info!("Shell exited: {}", status);
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            thread::sleep(WAIT_STEP);
        }
    }

    fn read_until_prompt(&self, timeout: Duration) -> Result<String> {
        let deadline = Instant::now() + timeout;
        let mut buffer = Vec::new();
        loop {
            {
                let text = String::from_utf8_lossy(&buffer);
                if let Some(before) = text.trim_end().strip_suffix(self.config.prompt.as_str()) {
                    return Ok(before.to_string());
                }
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(chunk) => buffer.extend_from_slice(&chunk),
                Err(RecvTimeoutError::Timeout) => {
                    return Err(HarnessError::ResponseTimeout(timeout));
                }
                Err(RecvTimeoutError::Disconnected) => {
                    error!("Shell closed its output: {}", String::from_utf8_lossy(&buffer));
                    return Err(HarnessError::ShellExited);
                }
            }
        }
    }
}

impl Shell for ProcessShell {
    fn execute(&mut self, line: &str) -> Result<CommandResult> {
        debug!("{} {}", self.config.prompt, line);
        let timeout = self.config.response_timeout();
        while self.stale_prompts > 0 {
            let late = self.read_until_prompt(timeout)?;
            warn!("Discarding late output: {}", late.trim());
            self.stale_prompts -= 1;
        }

        let stdin = self.stdin.as_mut().ok_or(HarnessError::ShellExited)?;
        writeln!(stdin, "{}", line)?;
        stdin.flush()?;

        match self.read_until_prompt(timeout) {
            Ok(raw) => Ok(render_response(line, &raw, &self.config)),
            Err(e @ HarnessError::ResponseTimeout(_)) => {
                self.stale_prompts += 1;
                Err(e)
            }
            Err(e) => Err(e),
        }
    }
}

impl Drop for ProcessShell {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            error!("Failed to stop shell: {}", e);
        }
    }
}

fn spawn_reader<R: Read + Send + 'static>(mut source: R, sender: Sender<Vec<u8>>) {
    thread::spawn(move || {
        let mut chunk = [0u8; 4096];
        loop {
            match source.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => {
                    if sender.send(chunk[..n].to_vec()).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to read shell output: {}", e);
                    break;
                }
            }
        }
    });
}

/// One pipe for both stdout and stderr, so the child's writes keep their
/// order. Both ends are close-on-exec; the child only sees the dup'd copies.
#[cfg(unix)]
fn merged_output() -> io::Result<(std::fs::File, Stdio, Stdio)> {
    use std::os::fd::{FromRawFd, OwnedFd};

    let mut fds = [0 as libc::c_int; 2];
    if unsafe { libc::pipe(fds.as_mut_ptr()) } != 0 {
        return Err(io::Error::last_os_error());
    }
    let reader = unsafe { OwnedFd::from_raw_fd(fds[0]) };
    let writer = unsafe { OwnedFd::from_raw_fd(fds[1]) };
    for fd in fds {
        if unsafe { libc::fcntl(fd, libc::F_SETFD, libc::FD_CLOEXEC) } != 0 {
            return Err(io::Error::last_os_error());
        }
    }
    let stderr = writer.try_clone()?;
    Ok((
        std::fs::File::from(reader),
        Stdio::from(writer),
        Stdio::from(stderr),
    ))
}

#[cfg(unix)]
fn terminate(child: &Child) {
    unsafe {
        libc::kill(child.id() as i32, libc::SIGTERM);
    }
}

#[cfg(not(unix))]
fn terminate(_child: &Child) {}

/// Turns the raw text between two prompts into a result: the echoed command
/// and surrounding blank lines are dropped, and any line starting with an
/// error marker makes the result a failure.
pub(crate) fn render_response(line: &str, raw: &str, config: &ShellConfig) -> CommandResult {
    let normalized = raw.replace('\r', "");
    let mut lines: Vec<&str> = normalized.lines().collect();

    if lines
        .first()
        .is_some_and(|first| first.trim() == line.trim())
    {
        lines.remove(0);
    }
    while lines.first().is_some_and(|l| l.trim().is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }

    let success = !lines.iter().any(|l| {
        let l = l.trim_start();
        config.error_markers.iter().any(|marker| l.starts_with(marker.as_str()))
    });
    let rendering = lines.join("\n");
    let table = ResultTable::parse(&rendering);
    CommandResult {
        success,
        rendering,
        table,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_echo_and_blank_lines() {
        let config = ShellConfig::default();
        let result = render_response(
            "task create t1 --definition \"timestamp\"",
            "task create t1 --definition \"timestamp\"\r\n\r\nCreated new task 't1'\r\n\r\n",
            &config,
        );
        assert!(result.success);
        assert_eq!(result.rendering, "Created new task 't1'");
        assert!(result.table.is_none());
    }

    #[test]
    fn error_marker_fails_result() {
        let config = ShellConfig::default();
        let result = render_response(
            "task destroy --name nope",
            "Command failed org.springframework.cloud.dataflow.rest.client.DataFlowClientException: Could not find task definition named nope\n",
            &config,
        );
        assert!(!result.success);
    }

    #[test]
    fn table_is_parsed_from_response() {
        let config = ShellConfig::default();
        let raw = "\n+----+--+\n|Name|ID|\n+----+--+\n|t1  |3 |\n+----+--+\n";
        let result = render_response("task execution list --name t1", raw, &config);
        assert!(result.success);
        assert_eq!(result.table.unwrap().value(1, 1), Some("3"));
    }
}
