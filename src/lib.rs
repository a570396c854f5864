pub mod auth;
pub mod axum_http;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod usecases;
