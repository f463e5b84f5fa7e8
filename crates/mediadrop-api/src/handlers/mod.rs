pub mod draw;
pub mod frames;
pub mod upload;
