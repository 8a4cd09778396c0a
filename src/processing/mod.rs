pub mod parser;
pub mod plugin;
pub mod processor;
