pub mod compression_utils;

pub use self::compression_utils::*;
