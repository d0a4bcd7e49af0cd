//! Byte-level pixel format handling.

mod convert;

pub use convert::{argb_to_rgba, premultiply};
