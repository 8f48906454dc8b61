//! Input helpers.
//!
//! - image file intake + validation (`image`)
//! - saved response documents (`document`)

pub mod document;
pub mod image;

pub use document::*;
pub use image::*;
