pub mod args;
pub mod decode;
pub mod errors;
pub mod plugin;
pub mod report;
pub mod trivy;
