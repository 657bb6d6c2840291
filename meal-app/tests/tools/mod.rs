#![allow(dead_code)]

pub mod show_output;
pub mod stub_fetcher;
