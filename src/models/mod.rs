pub mod image;
pub mod property;
