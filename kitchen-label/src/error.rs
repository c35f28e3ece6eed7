use thiserror::Error;

use crate::code128::BarcodeError;

#[derive(Debug, Error)]
pub enum PrintError {
    #[error("failed to generate barcode: {0}")]
    Barcode(#[from] BarcodeError),

    #[error("failed to generate barcode")]
    EmptyMarkup,

    #[error("rasterization failed: {0}")]
    Rasterize(String),

    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("viewer could not be opened: {0}")]
    Viewer(String),

    #[error("printer error: {0}")]
    Printer(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
