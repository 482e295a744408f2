#![doc = "The `todo_web` library crate."]
#![doc = ""]
#![doc = "This crate contains the stores, the authentication and task services, the session"]
#![doc = "middleware, routing configuration, views and error handling for the to-do list"]
#![doc = "application. It is used by the main binary (`main.rs`) to construct and run the server."]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod tasks;
pub mod views;

pub use crate::error::AppError;
