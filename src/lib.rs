// ABOUTME: Library module for syncdb
// ABOUTME: Exports all core functionality for use in binary and tests

pub mod commands;
pub mod config;
pub mod driver;
pub mod dump;
pub mod error;
pub mod import;
pub mod process;
pub mod staging;
pub mod tables;
pub mod transfer;
