//! Print pipeline: render, rasterize, wrap in a print document, hand to a viewer.
//!
//! Every failure ends the attempt: it is logged and reported as `false`,
//! nothing is retried and no error reaches the caller.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::builder::{escape_xml, try_render_label, LabelStyle};
use crate::caption::CaptionInputs;
use crate::epl::{build_epl_job, EplSettings};
use crate::error::PrintError;
use crate::graphics::{rasterize, Bitmap};
use crate::printer::{send_raw_to_printer, write_raw_to_device};

/// A standalone printable page plus the bitmap it embeds.
#[derive(Debug, Clone)]
pub struct PrintDocument {
    pub id: String,
    pub caption: Option<String>,
    pub bitmap: Bitmap,
    pub html: String,
}

impl PrintDocument {
    pub fn new(id: &str, caption: Option<&str>, bitmap: Bitmap) -> Result<Self, PrintError> {
        let data_url = bitmap.to_data_url()?;
        let id_text = escape_xml(id);
        let caption_html = caption
            .map(|c| format!("<p class=\"caption\">{}</p>\n", escape_xml(c)))
            .unwrap_or_default();
        let html = format!(
            "<!DOCTYPE html>\n\
             <html>\n<head>\n<meta charset=\"utf-8\">\n<title>Label {id_text}</title>\n\
             <style>body{{font-family:sans-serif;text-align:center;margin:16px}}\
             img{{image-rendering:pixelated}}\
             @media print{{button{{display:none}}}}</style>\n\
             </head>\n<body>\n\
             <img src=\"{data_url}\" width=\"{w}\" height=\"{h}\" alt=\"{id_text}\">\n\
             {caption_html}\
             <button onclick=\"window.print()\">Print</button>\n\
             </body>\n</html>\n",
            w = bitmap.width(),
            h = bitmap.height(),
        );
        Ok(Self { id: id.to_string(), caption: caption.map(str::to_string), bitmap, html })
    }
}

/// Presents a finished document to the user.
#[async_trait]
pub trait Viewer: Send + Sync {
    async fn open(&self, document: &PrintDocument) -> Result<(), PrintError>;
}

/// Writes `label-{id}.html` into a directory for the browser to open and print.
#[derive(Debug, Clone)]
pub struct HtmlFileViewer {
    dir: PathBuf,
}

impl HtmlFileViewer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// One file per id; bytes outside `[A-Za-z0-9_-]` are written as `%XX`.
    pub fn path_for(&self, id: &str) -> PathBuf {
        let mut safe = String::with_capacity(id.len());
        for b in id.bytes() {
            if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
                safe.push(b as char);
            } else {
                safe.push_str(&format!("%{b:02X}"));
            }
        }
        self.dir.join(format!("label-{safe}.html"))
    }
}

#[async_trait]
impl Viewer for HtmlFileViewer {
    async fn open(&self, document: &PrintDocument) -> Result<(), PrintError> {
        let path = self.path_for(&document.id);
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| PrintError::Viewer(format!("{}: {e}", self.dir.display())))?;
        tokio::fs::write(&path, document.html.as_bytes())
            .await
            .map_err(|e| PrintError::Viewer(format!("{}: {e}", path.display())))?;
        info!(path = %path.display(), "print document ready");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawTarget {
    /// Windows spooler queue name.
    Spooler(String),
    Device(PathBuf),
}

/// Sends the label straight to a thermal printer as an EPL2 job.
#[derive(Debug, Clone)]
pub struct EplViewer {
    target: RawTarget,
    settings: EplSettings,
}

impl EplViewer {
    pub fn new(target: RawTarget, settings: EplSettings) -> Self {
        Self { target, settings }
    }
}

#[async_trait]
impl Viewer for EplViewer {
    async fn open(&self, document: &PrintDocument) -> Result<(), PrintError> {
        let job = build_epl_job(&document.bitmap.to_mono(), &self.settings);
        debug!(id = %document.id, bytes = job.len(), "epl job built");
        let target = self.target.clone();
        tokio::task::spawn_blocking(move || match target {
            RawTarget::Spooler(name) => send_raw_to_printer(&name, &job),
            RawTarget::Device(path) => write_raw_to_device(&path, &job),
        })
        .await
        .map_err(|e| PrintError::Printer(e.to_string()))?
    }
}

/// The print adapter.
#[derive(Clone)]
pub struct Printer {
    style: LabelStyle,
    viewer: Arc<dyn Viewer>,
}

impl Printer {
    pub fn new(style: LabelStyle, viewer: Arc<dyn Viewer>) -> Self {
        Self { style, viewer }
    }

    pub fn style(&self) -> &LabelStyle {
        &self.style
    }

    /// Render, rasterize and open a label. `false` means the attempt failed and was logged.
    pub async fn print(&self, id: &str, caption: Option<&CaptionInputs>) -> bool {
        report(id, self.try_print(id, caption).await)
    }

    /// Same as [`Printer::print`] for markup that is already rendered.
    pub async fn print_markup(&self, id: &str, markup: &str, caption: Option<&str>) -> bool {
        report(id, self.try_print_markup(id, markup, caption).await)
    }

    async fn try_print(&self, id: &str, caption: Option<&CaptionInputs>) -> Result<(), PrintError> {
        let markup = try_render_label(id, caption, &self.style)?.to_svg();
        let caption_text = caption.map(CaptionInputs::caption);
        self.try_print_markup(id, &markup, caption_text.as_deref()).await
    }

    async fn try_print_markup(&self, id: &str, markup: &str, caption: Option<&str>) -> Result<(), PrintError> {
        if markup.trim().is_empty() {
            return Err(PrintError::EmptyMarkup);
        }
        let owned = markup.to_owned();
        let bitmap = tokio::task::spawn_blocking(move || rasterize(&owned))
            .await
            .map_err(|e| PrintError::Rasterize(e.to_string()))??;
        let document = PrintDocument::new(id, caption, bitmap)?;
        self.viewer.open(&document).await
    }
}

fn report(id: &str, result: Result<(), PrintError>) -> bool {
    match result {
        Ok(()) => {
            info!(id, "label sent to viewer");
            true
        }
        Err(e) => {
            error!(id, error = %e, "print failed");
            false
        }
    }
}
