//! Barcoded kitchen labels.
//! - Label ids from wall clock + random suffix
//! - Caption line: product / preparer initials / prepared / expiry
//! - Code 128 barcode rendered to SVG with the caption laid out underneath
//! - Print pipeline: rasterize, wrap in an HTML print page or an EPL2 job, hand to a viewer

pub mod builder;
pub mod caption;
pub mod code128;
pub mod config;
pub mod consts;
pub mod epl;
pub mod error;
pub mod graphics;
pub mod id;
pub mod inventory;
pub mod print;
pub mod printer;

pub use builder::{render_label, try_render_label, LabelImage, LabelStyle, Shape};
pub use caption::{compose_caption, format_date, initials, CaptionInputs};
pub use code128::{BarcodeError, Code128};
pub use config::{Catalog, ConfigError, LabelConfig, PrinterConfig};
pub use epl::{build_epl_job, EplSettings};
pub use error::PrintError;
pub use graphics::{rasterize, Bitmap};
pub use id::{generate_id, IdGenerator, LabelId};
pub use inventory::{InventoryStore, LabelForm, LabelRecord, MemoryStore, StoreError};
pub use print::{EplViewer, HtmlFileViewer, PrintDocument, Printer, RawTarget, Viewer};
pub use printer::{list_printers, send_raw_to_printer, write_raw_to_device};
