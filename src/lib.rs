// src/lib.rs
pub mod banner;
pub mod bindings;
pub mod cli;
pub mod config;
pub mod console;
pub mod controller;
pub mod errors;
pub mod models;
pub mod transport;
pub mod view;
