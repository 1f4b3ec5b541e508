//! Live table rendering and delivery library
//!
//! Server-side prerendering, signed script requests, and client-side
//! hydration for interactive HTML tables.

pub mod error;
pub mod hydrate;
pub mod model;
pub mod prerender;
pub mod server;
pub mod sign;

mod request;

pub use request::*;
