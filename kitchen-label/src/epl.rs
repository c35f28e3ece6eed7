//! EPL2 job builder for thermal label printers (binary GW + CRLF).

use image::GrayImage;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::consts::*;

/// Media and print head settings, in printer dots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EplSettings {
    pub label_width: u32,
    pub label_height: u32,
    pub gap: u32,
    pub darkness: u8, // D0..D15
    pub speed: u8,    // S1..S6
    pub top_margin: u32,
    pub copies: u32,
    /// Some drivers expect white = 1 in GW data.
    pub invert: bool,
}

impl Default for EplSettings {
    fn default() -> Self {
        Self {
            label_width: LABEL_W,
            label_height: LABEL_H,
            gap: LABEL_GAP,
            darkness: DARKNESS,
            speed: SPEED,
            top_margin: TOP_MARGIN,
            copies: 1,
            invert: false,
        }
    }
}

pub fn epl_line(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(s.as_bytes());
    buf.extend_from_slice(b"\r\n");
}

/// Pack a black/white image into rows, MSB first, black = 1.
pub fn image_to_row_bytes(img: &GrayImage, invert: bool) -> (u32, u32, Vec<u8>) {
    let (w, h) = (img.width(), img.height());
    let bpr = w.div_ceil(8) as usize;
    let mut out = vec![0u8; bpr * h as usize];

    for y in 0..h {
        for x in 0..w {
            if img.get_pixel(x, y).0[0] < 128 {
                let i = y as usize * bpr + (x as usize / 8);
                out[i] |= 1 << (7 - (x as usize % 8));
            }
        }
    }
    if invert {
        for b in &mut out {
            *b = !*b;
        }
    }
    (w, h, out)
}

pub fn gw_bytes(buf: &mut Vec<u8>, x: u32, y: u32, w: u32, h: u32, rows: &[u8]) {
    let bpr = w.div_ceil(8);
    epl_line(buf, &format!("GW{},{},{},{}", x, y, bpr, h));
    buf.extend_from_slice(rows); // RAW binary
    buf.extend_from_slice(b"\r\n");
}

/// One print job: the label bitmap centred horizontally at the top margin.
pub fn build_epl_job(label: &GrayImage, settings: &EplSettings) -> Vec<u8> {
    let (w, h, rows) = image_to_row_bytes(label, settings.invert);
    if w > settings.label_width || h + settings.top_margin > settings.label_height {
        warn!(w, h, label_width = settings.label_width, label_height = settings.label_height, "label bitmap exceeds media, printer will clip");
    }
    let x = settings.label_width.saturating_sub(w) / 2;

    let mut buf = Vec::new();
    epl_line(&mut buf, "N");
    epl_line(&mut buf, &format!("q{}", settings.label_width));
    epl_line(&mut buf, &format!("Q{},{}", settings.label_height, settings.gap));
    epl_line(&mut buf, &format!("D{}", settings.darkness));
    epl_line(&mut buf, &format!("S{}", settings.speed));
    gw_bytes(&mut buf, x, settings.top_margin, w, h, &rows);
    epl_line(&mut buf, &format!("P{}", settings.copies.max(1)));
    buf
}
