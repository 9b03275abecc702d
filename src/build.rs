mod builder;
mod documents;
mod paths;
pub mod pipeline;
mod report;
pub mod runner;
mod scrub;
mod tokens;

pub use builder::Builder;
pub use paths::html_dir;
pub use runner::SystemRunner;
