pub mod config_reader;
pub mod file_utils;

pub use self::config_reader::*;
pub use self::file_utils::*;
