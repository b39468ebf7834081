//! Image Preprocessing
//!
//! Turns an image file into the input tensor an ImageNet-style classifier
//! expects:
//! - RGB decode and fixed-size resize
//! - constant bias subtraction
//! - RGB to BGR channel reversal
//! - HWC to contiguous CHW layout

pub mod config;
pub mod tensor;

pub use config::{ChannelOrder, PreprocessConfig, ResizeFilter};
pub use tensor::{preprocess, preprocess_path, reverse_channels, to_channel_first, ImageTensor};

use std::path::PathBuf;
use thiserror::Error;

/// Preprocessing error types
#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("Failed to open image {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
