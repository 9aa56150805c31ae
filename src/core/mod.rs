//! Core fetch pipeline
//!
//! Sources are resolved into items, each item runs through mirror failover,
//! every candidate gets a freshness decision and at most one transfer, and
//! the item outcomes are classified into a task report.

pub mod config;
pub mod dest;
pub mod error;
pub mod executor;
pub mod failover;
pub mod freshness;
pub mod options;
pub mod output;
pub mod report;
pub mod source;
pub mod task;
