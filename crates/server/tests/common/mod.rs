//! Common test utilities and fixtures.

pub mod descriptors;
pub mod events;
pub mod server;

#[allow(unused_imports)]
pub use descriptors::*;
#[allow(unused_imports)]
pub use events::*;
#[allow(unused_imports)]
pub use server::*;
