// Canonical label layout constants (pixels unless noted)
pub const ID_PREFIX: &str = "KL";
pub const ID_TIME_DIGITS: u32 = 8;
pub const ID_RANDOM_DIGITS: u32 = 6;

pub const CAPTION_SEPARATOR: &str = " / ";

pub const MODULE_WIDTH: u32 = 2;   // narrow bar
pub const BAR_HEIGHT: u32 = 60;
pub const MARGIN: u32 = 10;        // quiet zone on every side
pub const TEXT_SIZE: u32 = 16;     // human readable id under the bars
pub const TEXT_MARGIN: u32 = 2;

pub const CAPTION_SIZE: u32 = 12;
pub const CAPTION_CHAR_WIDTH: f32 = 7.0; // linear width estimate per char
pub const CAPTION_EXTRA_HEIGHT: u32 = 30;
pub const CAPTION_SHIFT_UP: u32 = 8;     // bars + id text move up by this much
pub const CAPTION_OFFSET: u32 = 18;      // caption baseline below id baseline
pub const CAPTION_PADDING: u32 = 4;

pub const FONT_FAMILY: &str = "monospace";

// Largest bitmap side the rasterizer will allocate
pub const MAX_RASTER_DIM: u32 = 4096;

// Thermal printer defaults (203 dpi, 55 x 40 mm)
pub const LABEL_W: u32 = 440;
pub const LABEL_H: u32 = 320;
pub const LABEL_GAP: u32 = 24;
pub const DARKNESS: u8 = 8;
pub const SPEED: u8 = 2;
pub const TOP_MARGIN: u32 = 8;
