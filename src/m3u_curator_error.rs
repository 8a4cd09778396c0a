use std::error::Error;
use std::fmt::{Display, Formatter, Result};

#[macro_export]
macro_rules! create_m3u_curator_error_result {
     ($kind: expr, $($arg:tt)*) => {
        Err($crate::m3u_curator_error::M3uCuratorError::new($kind, format!($($arg)*)))
    }
}

#[macro_export]
macro_rules! info_err {
    ($($arg:tt)*) => {
        $crate::m3u_curator_error::M3uCuratorError::new($crate::m3u_curator_error::M3uCuratorErrorKind::Info, format!($($arg)*))
    }
}

#[macro_export]
macro_rules! notify_err {
    ($($arg:tt)*) => {
        $crate::m3u_curator_error::M3uCuratorError::new($crate::m3u_curator_error::M3uCuratorErrorKind::Notify, format!($($arg)*))
    }
}

pub use create_m3u_curator_error_result;
pub use info_err;
pub use notify_err;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum M3uCuratorErrorKind {
    // do not send with messaging
    Info,
    // runtime failure, the run could not complete
    Notify,
}

#[derive(Debug)]
pub struct M3uCuratorError {
    pub kind: M3uCuratorErrorKind,
    pub message: String,
}

impl M3uCuratorError {
    pub const fn new(kind: M3uCuratorErrorKind, message: String) -> Self {
        Self {
            kind,
            message,
        }
    }
}

impl Display for M3uCuratorError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "M3uCurator error: {}", self.message)
    }
}

impl Error for M3uCuratorError {}

impl From<std::io::Error> for M3uCuratorError {
    fn from(err: std::io::Error) -> Self {
        Self::new(M3uCuratorErrorKind::Notify, err.to_string())
    }
}

pub fn str_to_io_error(err: &str) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, err)
}
