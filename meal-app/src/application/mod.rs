pub mod app_state;
pub mod data_loader;
pub mod dto;
pub mod offline_worker;
