use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TokenError>;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token string is not in a recognized format")]
    UnrecognizedFormat,
    #[error("invalid token length")]
    BadLength,
    #[error("unsupported token version")]
    TokenVersion,
    #[error("token checksum failed")]
    ChecksumFailed,
    #[error("invalid password format")]
    BadPassword,
    #[error("missing required password")]
    MissingPassword,
    #[error("missing required device ID")]
    MissingDeviceId,
    #[error("seed decryption failed")]
    DecryptFailed,
    #[error("device ID does not match the token")]
    BadDeviceId,
    #[error("multiple tokens found")]
    MultipleTokens,
    #[error("missing or malformed sdtid field '{0}'")]
    SdtidField(String),
    #[error("malformed XML: {0}")]
    Xml(String),
    #[error("can't sign the sdtid batch: {0}")]
    Signature(String),
    #[error("PIN must be {min}-{max} digits", min = crate::constants::MIN_PIN, max = crate::constants::MAX_PIN)]
    PinLength,
    #[error("PIN can only contain digits")]
    PinNotNumeric,
    #[error("PIN is required for this token")]
    PinRequired,
    #[error("encrypted PIN is garbled")]
    EncryptedPin,
    #[error("time value is out of range: {0}")]
    TimeOutOfRange(i64),
    #[error("no token has been imported")]
    NoToken,
    #[error("token seed has not been decrypted")]
    SeedNotLoaded,
    #[error("rcfile error: {0}")]
    Config(#[from] toml::de::Error),
    #[error("rcfile write error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),
    #[error("HOME is not set so the rcfile can't be located")]
    NoHomeDir,
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("random number generator failure: {0}")]
    Random(#[from] rand_core::Error),
    #[error("out of memory")]
    OutOfMemory,
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Closed taxonomy every engine failure collapses onto.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidFormat,
    NotFound,
    IoError,
    OutOfMemory,
}

/// Per-call outcome reported across a foreign-function boundary.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Status {
    Success,
    InvalidFormat,
    IoError,
    NotFound,
}

impl TokenError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TokenError::NotFound(_) | TokenError::NoHomeDir => ErrorKind::NotFound,
            TokenError::OutOfMemory => ErrorKind::OutOfMemory,
            TokenError::Io(err) if err.kind() == io::ErrorKind::NotFound => ErrorKind::NotFound,
            TokenError::Io(err) if err.kind() == io::ErrorKind::OutOfMemory => {
                ErrorKind::OutOfMemory
            }
            TokenError::Io(_) | TokenError::Random(_) | TokenError::ConfigWrite(_) => {
                ErrorKind::IoError
            }
            TokenError::UnrecognizedFormat
            | TokenError::BadLength
            | TokenError::TokenVersion
            | TokenError::ChecksumFailed
            | TokenError::BadPassword
            | TokenError::MissingPassword
            | TokenError::MissingDeviceId
            | TokenError::DecryptFailed
            | TokenError::BadDeviceId
            | TokenError::MultipleTokens
            | TokenError::SdtidField(_)
            | TokenError::Xml(_)
            | TokenError::Signature(_)
            | TokenError::PinLength
            | TokenError::PinNotNumeric
            | TokenError::PinRequired
            | TokenError::EncryptedPin
            | TokenError::TimeOutOfRange(_)
            | TokenError::NoToken
            | TokenError::SeedNotLoaded
            | TokenError::Config(_) => ErrorKind::InvalidFormat,
        }
    }

    pub fn status(&self) -> Status {
        Status::from(self.kind())
    }
}

impl From<ErrorKind> for Status {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::InvalidFormat => Status::InvalidFormat,
            ErrorKind::NotFound => Status::NotFound,
            ErrorKind::IoError | ErrorKind::OutOfMemory => Status::IoError,
        }
    }
}

impl Status {
    /// Numeric code used by managed-runtime callers.
    pub fn code(self) -> i32 {
        match self {
            Status::Success => 0,
            Status::InvalidFormat => -1,
            Status::IoError => -2,
            Status::NotFound => -3,
        }
    }

    pub fn of<T>(result: &Result<T>) -> Status {
        match result {
            Ok(_) => Status::Success,
            Err(err) => err.status(),
        }
    }
}
