pub mod common;
pub mod image;
pub mod request;
pub mod video;

pub use common::*;
pub use image::*;
pub use request::*;
pub use video::*;
