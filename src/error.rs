//! Application error type.
//!
//! Every fallible operation in the crate returns `AppError`. The error carries
//! the process exit code so `main` can map failures to a status without
//! inspecting messages:
//!
//! - `2`: invalid arguments or I/O problems with files the user pointed at
//! - `3`: unusable data (e.g. a store that cannot be parsed)
//! - `4`: internal/numerical failures

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    /// Caller supplied a value outside the documented contract.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(2, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(2, message)
    }

    pub fn data(message: impl Into<String>) -> Self {
        Self::new(3, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(4, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
