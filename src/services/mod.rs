// Service modules

pub mod images;

pub use images::{ImageError, ImageService};
