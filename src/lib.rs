// src/lib.rs

//! newsnotes library
//!
//! Scrapes articles from a configured page, stores them once per link, and
//! tracks saved articles and their notes.

pub mod app;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;

pub use app::NewsDesk;
