mod retry;
mod scoped_timer;

pub use retry::*;
pub use scoped_timer::*;

#[cfg(test)]
mod retry_test;
