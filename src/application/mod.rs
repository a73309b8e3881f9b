//! Application services layer.

pub mod documents;
pub mod error;
pub mod pagination;
pub mod projection;
pub mod repos;
