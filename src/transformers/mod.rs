//! Request/response transformers
//!
//! Each provider supplies transformers that map the normalized types to its
//! wire format; the generic executors own the HTTP plumbing.

pub mod audio;
pub mod request;
pub mod response;
