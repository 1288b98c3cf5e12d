pub mod config;
pub mod logging;

pub mod catalog;
pub mod fetch;
pub mod link;
pub mod memory;
pub mod pool;
pub mod resolver;
pub mod retry;
pub mod storage;
pub mod tally;
pub mod url_model;
pub mod worker;
