//! Use-case services consumed by front ends.
//!
//! # Responsibility
//! - Compose DAOs into the operations a front end needs.
//! - Keep front ends independent of SQLite details.

pub mod computer_service;
