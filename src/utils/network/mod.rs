pub mod request;
pub mod validator;

pub use self::request::*;
pub use self::validator::*;
