pub mod cache_repo;
pub mod favorites_repo;
pub mod network;
pub mod storage;
