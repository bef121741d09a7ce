//! Object model for the kinds this controller reads and writes.
mod controller_config;
mod image_config;
mod meta;
mod pool;
mod quantity;
mod rendered;
mod runtime_config;

pub use controller_config::*;
pub use image_config::*;
pub use meta::*;
pub use pool::*;
pub use quantity::*;
pub use rendered::*;
pub use runtime_config::*;

#[cfg(test)]
mod quantity_test;
