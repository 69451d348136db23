//! Core types: configuration, errors, shared constants

pub mod config;
pub mod constants;
pub mod error;
