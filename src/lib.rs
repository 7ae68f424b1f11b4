pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod navigation;
pub mod repository;
pub mod sanitize;
pub mod services;
