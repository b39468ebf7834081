//! Preprocessing configuration

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

/// Channel order of the produced tensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelOrder {
    /// Decoder order, left untouched
    Rgb,
    /// Reversed, as Caffe-trained models expect
    Bgr,
}

/// Resampling filter used for the resize step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    /// Bicubic
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Preprocessing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Target width in pixels
    pub width: u32,

    /// Target height in pixels
    pub height: u32,

    /// Constant subtracted from every channel value.
    /// Approximates the ImageNet mean; not a per-channel mean.
    pub bias: f32,

    /// Channel order of the output tensor
    pub channel_order: ChannelOrder,

    /// Resize filter
    pub filter: ResizeFilter,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            width: 224,
            height: 224,
            bias: 128.0,
            channel_order: ChannelOrder::Bgr,
            filter: ResizeFilter::CatmullRom,
        }
    }
}

impl PreprocessConfig {
    /// Shape of the produced tensor: (channels, height, width)
    pub fn output_shape(&self) -> [usize; 3] {
        [3, self.height as usize, self.width as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_vgg_input() {
        let config = PreprocessConfig::default();
        assert_eq!(config.output_shape(), [3, 224, 224]);
        assert_eq!(config.bias, 128.0);
        assert_eq!(config.channel_order, ChannelOrder::Bgr);
    }

    #[test]
    fn test_filter_names_deserialize() {
        let filter: ResizeFilter = serde_json::from_str("\"catmull_rom\"").unwrap();
        assert_eq!(filter, ResizeFilter::CatmullRom);
        assert_eq!(FilterType::from(filter), FilterType::CatmullRom);
    }
}
