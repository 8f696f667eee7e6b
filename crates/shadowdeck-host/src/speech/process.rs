use std::{
    env,
    ffi::OsStr,
    io,
    path::Path,
    process::{Child, Command, Stdio},
};

use log::{debug, warn};
use thiserror::Error;

/// Placeholder replaced by the speech language in command arguments.
pub const LANG_PLACEHOLDER: &str = "{lang}";

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("empty command line")]
    Empty,
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// Program plus fixed leading arguments, split on whitespace.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn parse(raw: &str) -> Result<Self, ProcessError> {
        let mut parts = raw.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or(ProcessError::Empty)?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    /// Whether the program can be found, either as a path or on `PATH`.
    pub fn is_available(&self) -> bool {
        let program = Path::new(&self.program);
        if program.components().count() > 1 {
            return program.is_file();
        }

        env::var_os("PATH")
            .map(|paths| {
                env::split_paths(&paths).any(|dir| is_executable_file(&dir.join(program)))
            })
            .unwrap_or(false)
    }

    /// Start the program with its fixed arguments, `{lang}` substituted, and
    /// one trailing argument. Output is discarded.
    pub(crate) fn spawn(
        &self,
        lang: Option<&str>,
        trailing: impl AsRef<OsStr>,
    ) -> Result<Child, ProcessError> {
        let lang = lang.map(str::to_ascii_lowercase).unwrap_or_default();
        let args = self
            .args
            .iter()
            .map(|arg| arg.replace(LANG_PLACEHOLDER, &lang));

        Command::new(&self.program)
            .args(args)
            .arg(trailing)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| ProcessError::Spawn {
                program: self.program.clone(),
                source,
            })
    }
}

#[cfg(unix)]
fn is_executable_file(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable_file(path: &Path) -> bool {
    path.is_file() || path.with_extension("exe").is_file()
}

/// Child process that is killed when stopped or dropped.
#[derive(Debug, Default)]
pub(crate) struct RunningChild {
    child: Option<Child>,
}

impl RunningChild {
    pub(crate) fn start(&mut self, child: Child) {
        self.stop();
        self.child = Some(child);
    }

    pub(crate) fn is_running(&mut self) -> bool {
        let Some(child) = self.child.as_mut() else {
            return false;
        };

        match child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                debug!("speech: process {} exited {}", child.id(), status);
                self.child = None;
                false
            }
            Err(err) => {
                warn!("speech: cannot poll process {}: {}", child.id(), err);
                self.child = None;
                false
            }
        }
    }

    pub(crate) fn stop(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };
        if let Ok(None) = child.try_wait() {
            if let Err(err) = child.kill() {
                warn!("speech: cannot stop process {}: {}", child.id(), err);
            }
        }
        // Reap so no zombie is left behind.
        let _ = child.wait();
    }
}

impl Drop for RunningChild {
    fn drop(&mut self) {
        self.stop();
    }
}
