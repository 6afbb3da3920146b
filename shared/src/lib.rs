//! Shared utilities for backend services

pub mod observability;
