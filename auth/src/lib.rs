mod error;
pub mod password;
pub mod token;

pub use error::*;
