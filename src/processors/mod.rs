//! File processors for comment datasets

pub mod comments;
pub mod dataset;
