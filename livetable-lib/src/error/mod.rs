//! Error types

mod hydrate;
mod prerender;
mod server;

pub use hydrate::*;
pub use prerender::*;
pub use server::*;
