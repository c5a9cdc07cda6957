//! Exit codes for the testbandit CLI.
//!
//! Exit code ranges:
//! - 0: Success
//! - 10-19: User/input errors (fix the arguments or experiment file)
//! - 20-29: Internal errors (bugs, should be reported)

use tb_common::Error;

/// Exit codes for testbandit operations.
///
/// These codes are a stable contract for automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Ok = 0,

    /// Invalid arguments (bad counts, bad priors)
    ArgsError = 10,

    /// Engine invoked out of order (too few variations, no trials)
    PreconditionError = 11,

    /// Experiment file failed to parse or validate
    ConfigError = 12,

    /// Internal error (bug - please report)
    InternalError = 20,

    /// I/O error
    IoError = 21,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the code name as a string constant (for JSON output).
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Ok => "OK",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::PreconditionError => "ERR_PRECONDITION",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
        }
    }
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        match err {
            Error::InvalidArgument(_) => ExitCode::ArgsError,
            Error::Precondition(_) => ExitCode::PreconditionError,
            Error::Config(_) => ExitCode::ConfigError,
            Error::Sampling(_) => ExitCode::InternalError,
            Error::Io(_) | Error::Json(_) => ExitCode::IoError,
        }
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.as_i32() as u8)
    }
}
