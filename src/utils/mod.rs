//! Small shared helpers.

pub mod links;
