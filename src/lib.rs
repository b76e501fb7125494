pub mod app;
pub mod branch;
pub mod errors;
pub mod managers;
pub mod mcp;
pub mod services;
pub mod utils;
