//! Route Handlers

pub mod parameters;
pub mod predictions;
