pub mod config;
pub mod fetch;
pub mod filter;
pub mod loader;
pub mod model;
pub mod output;
pub mod pager;
pub mod prompt;
pub mod stats;
