//! Background job implementations.

pub mod cleanup;
pub mod deadline;
