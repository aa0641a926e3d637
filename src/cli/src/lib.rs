//! A3S Index CLI - build and check multi-architecture image indexes.

pub mod commands;
pub mod output;
