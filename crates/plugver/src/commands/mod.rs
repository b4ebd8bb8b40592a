//! Command implementations

pub mod release;

pub mod validate;
