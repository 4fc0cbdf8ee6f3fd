mod config;
#[allow(clippy::module_inception)]
mod driver;
mod samples;

pub use config::{Budget, Config, Sample};
pub use driver::Driver;
pub use samples::build as build_sample;
