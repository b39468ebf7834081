//! Image tensor construction

use std::path::Path;

use image::{imageops, DynamicImage, ImageReader};
use ndarray::{s, Array3, ArrayView3};
use tracing::{debug, info};

use crate::{ChannelOrder, PreprocessConfig, PreprocessError};

/// Preprocessed image in channel-first (C, H, W) layout.
///
/// Always backed by standard (C-contiguous) memory.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    data: Array3<f32>,
}

impl ImageTensor {
    /// Wrap a CHW array, copying it into standard layout if needed
    pub fn from_array(data: Array3<f32>) -> Self {
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().into_owned()
        };
        Self { data }
    }

    /// Tensor shape as (channels, height, width)
    pub fn shape(&self) -> [usize; 3] {
        let (c, h, w) = self.data.dim();
        [c, h, w]
    }

    pub fn view(&self) -> ArrayView3<'_, f32> {
        self.data.view()
    }

    pub fn into_array(self) -> Array3<f32> {
        self.data
    }

    pub fn is_standard_layout(&self) -> bool {
        self.data.is_standard_layout()
    }
}

/// Reverse the last (channel) axis of an HWC array: RGB <-> BGR.
///
/// Applying it twice yields the input.
pub fn reverse_channels(hwc: ArrayView3<'_, f32>) -> Array3<f32> {
    hwc.slice(s![.., .., ..;-1]).to_owned()
}

/// Move the channel axis first: (H, W, C) -> (C, H, W), contiguous.
pub fn to_channel_first(hwc: Array3<f32>) -> Array3<f32> {
    hwc.permuted_axes([2, 0, 1]).as_standard_layout().into_owned()
}

/// Preprocess an already decoded image
pub fn preprocess(image: &DynamicImage, config: &PreprocessConfig) -> ImageTensor {
    let rgb = image.to_rgb8();
    let resized = imageops::resize(&rgb, config.width, config.height, config.filter.into());

    let bias = config.bias;
    let hwc = Array3::from_shape_fn(
        (config.height as usize, config.width as usize, 3),
        |(y, x, c)| f32::from(resized.get_pixel(x as u32, y as u32)[c]) - bias,
    );

    let ordered = match config.channel_order {
        ChannelOrder::Rgb => hwc,
        ChannelOrder::Bgr => reverse_channels(hwc.view()),
    };

    ImageTensor::from_array(to_channel_first(ordered))
}

/// Decode an image file and preprocess it
pub fn preprocess_path(
    path: impl AsRef<Path>,
    config: &PreprocessConfig,
) -> Result<ImageTensor, PreprocessError> {
    let path = path.as_ref();
    info!("Loading image from {}", path.display());

    let open_err = |source| PreprocessError::Open {
        path: path.to_path_buf(),
        source,
    };
    let image = ImageReader::open(path)
        .map_err(open_err)?
        .with_guessed_format()
        .map_err(open_err)?
        .decode()
        .map_err(|source| PreprocessError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

    debug!(
        "Decoded {}x{} image, resizing to {}x{}",
        image.width(),
        image.height(),
        config.width,
        config.height
    );

    Ok(preprocess(&image, config))
}
