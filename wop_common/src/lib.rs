mod cents;

pub mod helpers;
pub mod op;
mod secret;

pub use cents::Cents;
pub use secret::Secret;
