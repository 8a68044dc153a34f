pub mod args;
pub mod engine;
pub mod errors;
pub mod report;
pub mod transaction;
