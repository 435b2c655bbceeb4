//! The seam through which every external tool is launched.
//!
//! The pipeline never touches `tokio::process` directly: each stage builds an
//! [`Invocation`] and hands it to a [`CommandRunner`]. Production code uses
//! [`SystemRunner`]; tests plug in a scripted runner that records the
//! invocations and fabricates the files the real tools would write.

use std::ffi::{OsStr, OsString};
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tracing::debug;

/// A program plus its ordered arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// File name of the program, for dispatch and log lines.
    pub fn program_name(&self) -> &str {
        self.program
            .file_stem()
            .and_then(OsStr::to_str)
            .unwrap_or_default()
    }

    /// Arguments as lossy strings.
    pub fn arg_strings(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    /// Value of the first `prefix…` argument, e.g. `-sOutputFile=`.
    pub fn arg_value(&self, prefix: &str) -> Option<String> {
        self.arg_strings()
            .into_iter()
            .find_map(|a| a.strip_prefix(prefix).map(str::to_string))
    }
}

/// What a finished tool reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    /// `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// The last `n` lines of stderr, for error messages.
    pub fn stderr_tail(&self, n: usize) -> String {
        let lines: Vec<&str> = self.stderr.lines().collect();
        lines[lines.len().saturating_sub(n)..].join("\n")
    }
}

/// Launches external programs and waits for them.
///
/// `Err` means the program could not be started; a program that ran and
/// failed is an `Ok` with `success == false`.
pub trait CommandRunner: Send + Sync {
    fn run(&self, invocation: &Invocation) -> impl Future<Output = io::Result<CommandOutput>> + Send;
}

/// Runs tools as real child processes, blocking the pipeline until they exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> io::Result<CommandOutput> {
        debug!(
            "exec {} {}",
            invocation.program.display(),
            invocation.arg_strings().join(" ")
        );
        let output = tokio::process::Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .output()
            .await?;

        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Path rendered as an argument, lossless on every platform.
pub(crate) fn path_arg(prefix: &str, path: &Path) -> OsString {
    let mut arg = OsString::from(prefix);
    arg.push(path.as_os_str());
    arg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invocation_builder_and_lookup() {
        let inv = Invocation::new("/usr/bin/gs")
            .args(["-dBATCH", "-r100"])
            .arg(path_arg("-sOutputFile=", Path::new("/tmp/a_gs.tif")));
        assert_eq!(inv.program_name(), "gs");
        assert_eq!(inv.arg_value("-r").as_deref(), Some("100"));
        assert_eq!(inv.arg_value("-sOutputFile=").as_deref(), Some("/tmp/a_gs.tif"));
        assert_eq!(inv.arg_value("-dFirstPage="), None);
    }

    #[test]
    fn program_name_strips_windows_extension() {
        let inv = Invocation::new("gswin64c.exe");
        assert_eq!(inv.program_name(), "gswin64c");
    }

    #[test]
    fn stderr_tail_keeps_last_lines() {
        let out = CommandOutput {
            stderr: "a\nb\nc\nd".into(),
            ..CommandOutput::default()
        };
        assert_eq!(out.stderr_tail(2), "c\nd");
        assert_eq!(out.stderr_tail(10), "a\nb\nc\nd");
    }

    #[tokio::test]
    async fn system_runner_reports_launch_failure() {
        let inv = Invocation::new("/definitely/not/a/real/tool");
        assert!(SystemRunner.run(&inv).await.is_err());
    }
}
