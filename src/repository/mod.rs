pub mod cache_repository;
pub mod m3u_repository;
pub mod storage;
