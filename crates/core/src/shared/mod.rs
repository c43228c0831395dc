pub mod constants;
pub mod image_descriptor;
pub mod image_format;
pub mod rotation;
