pub mod api;
pub mod auth;
pub mod clock;
pub mod config;
pub mod models;
pub mod report;
pub mod store;
pub mod sync;
pub mod view;
