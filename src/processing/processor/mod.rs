pub mod mapper;
pub mod resolver;
pub mod playlist;
#[cfg(test)]
pub(crate) mod test_validator;
