pub mod error;
pub mod report;
pub mod traits;
pub mod types;

pub use error::*;
pub use report::*;
pub use traits::*;
pub use types::*;
