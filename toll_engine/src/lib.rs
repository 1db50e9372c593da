//! Toll Engine library crate.
//!
//! This crate exposes the congestion-tax fee engine and the API
//! components as reusable modules.  External applications may depend
//! on the `toll_engine` crate and call into `engine::FeeEngine`
//! directly or embed the API via `api::build_router`.

pub mod api;
pub mod calendar;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod rates;
pub mod repository;
pub mod settings;

pub use config::TollConfig;
pub use engine::FeeEngine;
pub use error::{Result, TollError};
