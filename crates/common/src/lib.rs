//! Shared configuration, error and data types for Agent Herald.

pub mod config;
pub mod db;
pub mod error;
pub mod types;
