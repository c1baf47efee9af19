//! # Wizelabs API Server Library
//!
//! HTTP API for the Wizelabs innovation portal: projects, employee
//! profiles, the internship pipeline and GitHub activity.
//!
//! ## Modules
//!
//! - `app`: application state and router builder
//! - `config`: configuration from the environment
//! - `error`: error handling and HTTP response mapping
//! - `middleware`: session authentication and security headers
//! - `oauth`: identity provider client
//! - `routes`: route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod oauth;
pub mod routes;
