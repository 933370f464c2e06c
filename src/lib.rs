pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod importer;
pub mod logging;
pub mod models;
pub mod sis;
pub mod state;
pub mod web;
