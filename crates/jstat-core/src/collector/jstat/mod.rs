//! `jstat` report modes and the parser for their output.

pub mod mode;
pub mod parser;

pub use mode::{ColumnMapping, ReportMode};
pub use parser::{Observation, ParseError, extract};
