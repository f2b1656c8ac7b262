// src/posts/mod.rs

pub mod handlers;
pub mod models;
pub mod routes;
pub mod validators;


// Re-export commonly used items
pub use models::*;
pub use routes::posts_routes;
