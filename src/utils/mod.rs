pub mod default_utils;
pub mod compression;
pub mod file;
pub mod network;
pub mod step_measure;

#[macro_export]
macro_rules! debug_if_enabled {
    ($fmt:expr, $( $args:expr ),*) => {
        if log::log_enabled!(log::Level::Debug) {
            log::log!(log::Level::Debug, $fmt, $($args),*);
        }
    };

    ($txt:expr) => {
        if log::log_enabled!(log::Level::Debug) {
            log::log!(log::Level::Debug, $txt);
        }
    };
}

#[macro_export]
macro_rules! trace_if_enabled {
    ($fmt:expr, $( $args:expr ),*) => {
        if log::log_enabled!(log::Level::Trace) {
            log::log!(log::Level::Trace, $fmt, $($args),*);
        }
    };

    ($txt:expr) => {
        if log::log_enabled!(log::Level::Trace) {
            log::log!(log::Level::Trace, $txt);
        }
    };
}

pub use debug_if_enabled;
pub use trace_if_enabled;

pub use self::default_utils::*;
pub use self::compression::*;
pub use self::file::*;
pub use self::network::*;
pub use self::step_measure::*;
