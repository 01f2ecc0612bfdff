pub mod entity;
pub mod principal;
pub mod text;
pub mod vector;

mod error;

pub use error::{Error, Result};
