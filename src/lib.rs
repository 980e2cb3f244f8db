#[macro_use]
extern crate log;

pub mod augment;
pub mod confidence;
pub mod dimacs;
pub mod literal;
pub mod output;
pub mod phase;
pub mod pipeline;
pub mod prelude;
pub mod report;
