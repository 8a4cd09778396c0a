mod builtin;
mod registry;

pub use self::builtin::*;
pub use self::registry::*;
