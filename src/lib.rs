//! frontpage - invite-only publishing site
//!
//! This library provides the core of the site: configuration, persistence,
//! business services and the HTTP API.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
