//! Command handlers

pub mod config;
pub mod post;
pub mod render;
