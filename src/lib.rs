pub mod cancel;
pub mod config;
pub mod error;
pub mod fetch;
pub mod output;
pub mod parser;
pub mod policy;
pub mod summary;
pub mod validate;
