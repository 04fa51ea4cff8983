pub mod error;
pub mod form;
pub mod timestamp;

pub use error::Error;
pub use timestamp::Timestamp;
