//! Small shared helpers.

pub mod mime;
