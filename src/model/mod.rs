pub mod config;
pub mod config_cache;
pub mod config_channel;
pub mod config_group;
pub mod config_log;
pub mod config_plugin;
pub mod config_validation;
pub mod playlist;

pub use self::config::*;
pub use self::config_cache::*;
pub use self::config_channel::*;
pub use self::config_group::*;
pub use self::config_log::*;
pub use self::config_plugin::*;
pub use self::config_validation::*;
pub use self::playlist::*;
