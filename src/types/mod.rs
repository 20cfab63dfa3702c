//! Core data types shared by the client, router, adapters and orchestrator.

pub mod audio;
pub mod chat;
pub mod http;
pub mod request;
pub mod response;
pub mod tools;

pub use audio::*;
pub use chat::*;
pub use http::*;
pub use request::*;
pub use response::*;
pub use tools::*;
