use std::io::Cursor;
use std::sync::{Arc, OnceLock};

use base64::{engine::general_purpose, Engine as _};
use image::{DynamicImage, GrayImage, ImageFormat, Luma, RgbaImage};
use resvg::{tiny_skia, usvg};

use crate::consts::MAX_RASTER_DIM;
use crate::error::PrintError;

/// Rasterized label, RGBA on an opaque white background.
#[derive(Debug, Clone)]
pub struct Bitmap {
    image: RgbaImage,
}

impl Bitmap {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.image
    }

    pub fn to_png(&self) -> Result<Vec<u8>, PrintError> {
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(self.image.clone()).write_to(&mut out, ImageFormat::Png)?;
        Ok(out.into_inner())
    }

    pub fn to_data_url(&self) -> Result<String, PrintError> {
        let png = self.to_png()?;
        Ok(format!("data:image/png;base64,{}", general_purpose::STANDARD.encode(png)))
    }

    /// Threshold to pure black/white for 1-bit printers.
    pub fn to_mono(&self) -> GrayImage {
        let mut gray = DynamicImage::ImageRgba8(self.image.clone()).to_luma8();
        for px in gray.pixels_mut() {
            *px = if px[0] < 128 { Luma([0u8]) } else { Luma([255u8]) };
        }
        gray
    }
}

fn font_database() -> Arc<usvg::fontdb::Database> {
    static FONTS: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();
    FONTS
        .get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            Arc::new(db)
        })
        .clone()
}

/// Parse SVG markup and draw it into a bitmap. Blocking; can be slow for large images.
pub fn rasterize(svg: &str) -> Result<Bitmap, PrintError> {
    if svg.trim().is_empty() {
        return Err(PrintError::Rasterize("empty markup".into()));
    }
    let opt = usvg::Options { fontdb: font_database(), ..usvg::Options::default() };
    let tree = usvg::Tree::from_str(svg, &opt).map_err(|e| PrintError::Rasterize(e.to_string()))?;
    let size = tree.size().to_int_size();
    if size.width() > MAX_RASTER_DIM || size.height() > MAX_RASTER_DIM {
        return Err(PrintError::Rasterize(format!(
            "image size {}x{} exceeds {MAX_RASTER_DIM}px limit",
            size.width(),
            size.height()
        )));
    }
    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| PrintError::Rasterize(format!("invalid image size {}x{}", size.width(), size.height())))?;
    pixmap.fill(tiny_skia::Color::WHITE);
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    // opaque background, so premultiplied == straight alpha
    let image = RgbaImage::from_raw(size.width(), size.height(), pixmap.take())
        .ok_or_else(|| PrintError::Rasterize("pixel buffer size mismatch".into()))?;
    Ok(Bitmap { image })
}
