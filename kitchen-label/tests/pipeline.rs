use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use kitchen_label::{
    generate_id, render_label, CaptionInputs, EplSettings, EplViewer, HtmlFileViewer, InventoryStore, LabelForm,
    LabelRecord, LabelStyle, MemoryStore, PrintDocument, PrintError, Printer, RawTarget, Viewer,
};

#[derive(Default)]
struct RecordingViewer {
    opened: Mutex<Vec<PrintDocument>>,
}

#[async_trait]
impl Viewer for RecordingViewer {
    async fn open(&self, document: &PrintDocument) -> Result<(), PrintError> {
        self.opened.lock().unwrap().push(document.clone());
        Ok(())
    }
}

struct BlockedViewer;

#[async_trait]
impl Viewer for BlockedViewer {
    async fn open(&self, _document: &PrintDocument) -> Result<(), PrintError> {
        Err(PrintError::Viewer("popup blocked".into()))
    }
}

fn soup() -> CaptionInputs {
    CaptionInputs::new("Soup", "Jane Doe", "2025-01-01", "2025-01-04")
}

#[test]
fn bare_render_contains_id_and_captioned_is_wider() {
    let id = generate_id();
    let style = LabelStyle::default();
    let bare = render_label(id.as_str(), None, &style);
    assert!(!bare.is_empty());
    assert!(bare.contains(id.as_str()));
    let captioned = render_label(id.as_str(), Some(&soup()), &style);
    assert!(captioned.contains("Soup / JD / 2025-01-01 / 2025-01-04"));
    assert!(declared_width(&captioned) >= declared_width(&bare));
}

fn declared_width(svg: &str) -> u32 {
    let start = svg.find("width=\"").unwrap() + "width=\"".len();
    let end = start + svg[start..].find('"').unwrap();
    svg[start..end].parse().unwrap()
}

#[test]
fn empty_id_renders_nothing() {
    assert!(render_label("", Some(&soup()), &LabelStyle::default()).is_empty());
}

#[tokio::test]
async fn generate_render_print_succeeds() {
    let viewer = Arc::new(RecordingViewer::default());
    let printer = Printer::new(LabelStyle::default(), viewer.clone());
    let id = generate_id();

    assert!(printer.print(id.as_str(), Some(&soup())).await);

    let opened = viewer.opened.lock().unwrap();
    assert_eq!(opened.len(), 1);
    assert_eq!(opened[0].id, id.as_str());
    assert_eq!(opened[0].caption.as_deref(), Some("Soup / JD / 2025-01-01 / 2025-01-04"));
    assert!(opened[0].bitmap.width() > 0);
}

#[tokio::test]
async fn malformed_markup_prints_false() {
    let viewer = Arc::new(RecordingViewer::default());
    let printer = Printer::new(LabelStyle::default(), viewer.clone());

    assert!(!printer.print_markup("KL1", "<svg width=\"10\"><rect", None).await);
    assert!(!printer.print_markup("KL1", "", None).await);
    assert!(viewer.opened.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unencodable_id_prints_false() {
    let viewer = Arc::new(RecordingViewer::default());
    let printer = Printer::new(LabelStyle::default(), viewer.clone());
    assert!(!printer.print("", Some(&soup())).await);
    assert!(!printer.print("tab\there", None).await);
    assert!(viewer.opened.lock().unwrap().is_empty());
}

#[tokio::test]
async fn blocked_viewer_prints_false() {
    let printer = Printer::new(LabelStyle::default(), Arc::new(BlockedViewer));
    assert!(!printer.print("KL1", Some(&soup())).await);
}

#[tokio::test]
async fn html_viewer_writes_print_page() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("labels");
    let viewer = HtmlFileViewer::new(&out);
    let printer = Printer::new(LabelStyle::default(), Arc::new(viewer.clone()));

    assert!(printer.print("KL42", Some(&soup())).await);

    let html = std::fs::read_to_string(viewer.path_for("KL42")).unwrap();
    assert!(html.contains("data:image/png;base64,"));
    assert!(html.contains("Soup / JD / 2025-01-01 / 2025-01-04"));
    assert!(html.contains("window.print()"));
}

#[tokio::test]
async fn html_viewer_into_a_file_path_fails() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let printer = Printer::new(LabelStyle::default(), Arc::new(HtmlFileViewer::new(file.path())));
    assert!(!printer.print("KL42", None).await);
}

#[tokio::test]
async fn epl_viewer_writes_job_to_device() {
    let dir = tempfile::tempdir().unwrap();
    let device = dir.path().join("lp0");
    let viewer = EplViewer::new(RawTarget::Device(device.clone()), EplSettings::default());
    let printer = Printer::new(LabelStyle::default(), Arc::new(viewer));

    assert!(printer.print("KL42", Some(&soup())).await);

    let job = std::fs::read(&device).unwrap();
    assert!(job.starts_with(b"N\r\nq440\r\n"));
    assert!(job.windows(2).any(|w| w == b"GW"));
    assert!(job.ends_with(b"P1\r\n"));
}

#[test]
fn saved_record_is_found_by_scanned_id() {
    let store = MemoryStore::new();
    let id = generate_id();
    let form = LabelForm {
        product: "Soup".into(),
        preparer_name: "Jane Doe".into(),
        prepared_date: "2025-01-01".into(),
        expiry_date: "2025-01-04".into(),
        container_type: "Quart".into(),
    };
    store.save(LabelRecord::from_form(id.clone(), form, chrono::Utc::now())).unwrap();

    let scanned: kitchen_label::LabelId = id.as_str().parse().unwrap();
    let found = store.get_by_id(&scanned).unwrap().unwrap();
    assert_eq!(found.container_type, "Quart");
}
