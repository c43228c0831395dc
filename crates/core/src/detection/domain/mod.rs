pub mod detection;
pub mod detection_buffer;
pub mod detection_engine;
pub mod detector;
pub mod image_converter;
pub mod orientation;
pub mod selection;
