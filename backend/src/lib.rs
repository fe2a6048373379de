pub mod clock;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
