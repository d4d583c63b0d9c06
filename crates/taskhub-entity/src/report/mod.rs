//! Progress report domain entities.

pub mod model;

pub use model::Report;
