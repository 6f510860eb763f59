use std::io::{self, Write};
use std::process::{Command, Stdio};

use tracing::{debug, warn};

/// Default pager arguments for `less`: chop long lines, keep the screen.
const LESS_ARGS: &[&str] = &["-S", "-X"];

/// A pager command line taken from `$PAGER`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagerCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl PagerCommand {
    /// Parse `$PAGER`; unset means `less`, blank disables paging.
    pub fn from_env_value(value: Option<&str>) -> Option<Self> {
        let mut words = value.unwrap_or("less").split_whitespace();
        let program = words.next()?.to_string();
        let mut args: Vec<String> = words.map(str::to_string).collect();
        if program == "less" && args.is_empty() {
            args = LESS_ARGS.iter().map(|a| a.to_string()).collect();
        }
        Some(Self { program, args })
    }

    /// Feed `output` to the pager and wait for it to exit. Quitting the
    /// pager before reading everything is not an error.
    fn page(&self, output: &str) -> io::Result<()> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(output.as_bytes()) {
                Err(e) if e.kind() != io::ErrorKind::BrokenPipe => return Err(e),
                _ => {}
            }
        }
        child.wait()?;
        Ok(())
    }
}

/// Whether `output` needs more lines than the terminal has.
pub fn exceeds_screen(output: &str, terminal_rows: usize) -> bool {
    output.lines().count() >= terminal_rows
}

/// Height of the terminal on stdout, `None` when stdout is not a terminal.
fn terminal_rows() -> Option<usize> {
    #[cfg(unix)]
    {
        use std::os::unix::io::AsRawFd;
        let fd = io::stdout().as_raw_fd();
        if unsafe { libc::isatty(fd) } == 0 {
            return None;
        }
        let mut size: libc::winsize = unsafe { std::mem::zeroed() };
        let rc = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut size as *mut libc::winsize) };
        if rc == 0 && size.ws_row > 0 {
            return Some(usize::from(size.ws_row));
        }
        std::env::var("LINES").ok().and_then(|l| l.trim().parse().ok())
    }
    #[cfg(not(unix))]
    {
        None
    }
}

/// Write a report to stdout, through `$PAGER` when `allow_paging` is set
/// and the report does not fit on the terminal.
pub fn emit(output: &str, allow_paging: bool) -> io::Result<()> {
    if allow_paging {
        let rows = terminal_rows();
        let pager = std::env::var("PAGER").ok();
        match (rows, PagerCommand::from_env_value(pager.as_deref())) {
            (Some(rows), Some(cmd)) if exceeds_screen(output, rows) => {
                debug!("Paging {} lines through {:?}", output.lines().count(), cmd);
                match cmd.page(output) {
                    Ok(()) => return Ok(()),
                    Err(e) => warn!("Pager '{}' failed, printing directly: {}", cmd.program, e),
                }
            }
            _ => {}
        }
    }

    let mut stdout = io::stdout().lock();
    match stdout.write_all(output.as_bytes()).and_then(|_| stdout.flush()) {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}
