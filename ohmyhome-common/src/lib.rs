#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod macros;
pub mod remote;

#[doc(hidden)]
pub use serde as _serde;

mod error;
mod setting;
mod value;
pub use error::*;
pub use setting::*;
pub use value::*;
