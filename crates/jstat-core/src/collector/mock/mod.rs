//! In-memory `jstat` stand-in for testing without a JVM.

mod runner;
pub mod scenarios;

pub use runner::MockRunner;
