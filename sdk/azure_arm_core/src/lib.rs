#![doc = include_str!("../README.md")]

pub mod auth;
pub mod client;
pub mod error;
pub mod lro;
pub mod options;
pub mod paging;
pub mod request;
pub mod response;

#[cfg(feature = "test-support")]
pub mod test_support;

pub use error::{ArmError, ArmResult};
