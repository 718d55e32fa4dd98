// src/lib.rs

//! fortuned Library

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod server;
pub mod services;
pub mod storage;
