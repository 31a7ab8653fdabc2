pub mod archive;
pub mod models;
pub mod parser;
pub mod store;

pub use archive::extract_feed;
pub use models::*;
pub use parser::{parse_feed, parse_feed_bytes};
pub use store::RegistryStore;
