#[allow(clippy::module_inception)]
mod types;

pub use types::*;
