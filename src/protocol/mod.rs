//! Wire types exchanged between the validator and its host

mod types;

pub use types::*;
