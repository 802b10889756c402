pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod export;
pub mod listing;
pub mod models;
pub mod services;
pub mod store;
pub mod ui;

pub use error::{AppError, Result};
