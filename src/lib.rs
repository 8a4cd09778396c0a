pub mod m3u_curator_error;
pub mod model;
pub mod processing;
pub mod repository;
pub mod utils;
