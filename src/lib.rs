pub mod config;
pub mod dates;
pub mod endpoint;
pub mod index_patch;
pub mod logger;
pub mod publish;
pub mod render;
pub mod server;
pub mod store;
pub mod submission;
mod test_data;
