use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::caption::CaptionInputs;
use crate::code128::{BarcodeError, Code128};
use crate::consts::*;

/// Pixel geometry of a rendered label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelStyle {
    pub module_width: u32,
    pub bar_height: u32,
    pub margin: u32,
    pub text_size: u32,
    pub text_margin: u32,
    pub caption_size: u32,
    pub caption_char_width: f32,
    pub caption_extra_height: u32,
    pub caption_shift_up: u32,
    pub caption_offset: u32,
    pub caption_padding: u32,
    pub font_family: String,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            module_width: MODULE_WIDTH,
            bar_height: BAR_HEIGHT,
            margin: MARGIN,
            text_size: TEXT_SIZE,
            text_margin: TEXT_MARGIN,
            caption_size: CAPTION_SIZE,
            caption_char_width: CAPTION_CHAR_WIDTH,
            caption_extra_height: CAPTION_EXTRA_HEIGHT,
            caption_shift_up: CAPTION_SHIFT_UP,
            caption_offset: CAPTION_OFFSET,
            caption_padding: CAPTION_PADDING,
            font_family: FONT_FAMILY.to_string(),
        }
    }
}

impl LabelStyle {
    /// Crude linear width estimate; no font metrics.
    pub fn estimate_caption_width(&self, caption: &str) -> u32 {
        (caption.chars().count() as f32 * self.caption_char_width).ceil() as u32
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect { x: u32, y: u32, width: u32, height: u32, fill: &'static str },
    Text { x: u32, y: u32, size: u32, content: String },
}

/// A label as plain drawing data; `to_svg` serializes it.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelImage {
    pub width: u32,
    pub height: u32,
    pub font_family: String,
    pub shapes: Vec<Shape>,
}

impl LabelImage {
    pub fn to_svg(&self) -> String {
        let mut svg = String::new();
        // writing into a String cannot fail
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" version="1.1" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        );
        let _ = write!(svg, r##"<rect x="0" y="0" width="{}" height="{}" fill="#ffffff"/>"##, self.width, self.height);
        for shape in &self.shapes {
            match shape {
                Shape::Rect { x, y, width, height, fill } => {
                    let _ = write!(svg, r#"<rect x="{x}" y="{y}" width="{width}" height="{height}" fill="{fill}"/>"#);
                }
                Shape::Text { x, y, size, content } => {
                    let _ = write!(
                        svg,
                        r##"<text x="{x}" y="{y}" font-family="{}" font-size="{size}" text-anchor="middle" fill="#000000">{}</text>"##,
                        escape_xml(&self.font_family),
                        escape_xml(content)
                    );
                }
            }
        }
        svg.push_str("</svg>");
        svg
    }
}

pub(crate) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

pub fn try_render_label(id: &str, caption: Option<&CaptionInputs>, style: &LabelStyle) -> Result<LabelImage, BarcodeError> {
    let code = Code128::encode(id)?;

    let barcode_w = code.modules() * style.module_width;
    let natural_w = barcode_w + 2 * style.margin;
    let natural_h = 2 * style.margin + style.bar_height + style.text_margin + style.text_size;

    let caption_text = caption.map(CaptionInputs::caption);
    let shift = if caption_text.is_some() { style.caption_shift_up.min(style.margin) } else { 0 };

    // layout Y's
    let bars_y = style.margin - shift;
    let text_y = style.margin + style.bar_height + style.text_margin + style.text_size - shift;

    // caption box: (estimate, baseline, box top, box height)
    let caption_box = caption_text.as_ref().map(|text| {
        let est = style.estimate_caption_width(text);
        let caption_y = text_y.saturating_add(style.caption_offset);
        let box_y = caption_y.saturating_sub(style.caption_size + style.caption_padding / 2);
        let box_h = style.caption_size.saturating_add(2 * style.caption_padding);
        (est, caption_y, box_y, box_h)
    });

    let (width, height) = match caption_box {
        Some((est, caption_y, box_y, box_h)) => {
            let width = natural_w.max(est.saturating_add(2 * style.margin));
            // the box and the caption baseline must stay inside the image
            let height = (natural_h.saturating_add(style.caption_extra_height))
                .max(box_y.saturating_add(box_h))
                .max(caption_y.saturating_add(style.caption_padding));
            (width, height)
        }
        None => (natural_w, natural_h),
    };
    let bars_x = (width - barcode_w) / 2;
    let center_x = width / 2;
    debug!(id, width, height, bars_x, bars_y, "label layout");

    let mut shapes: Vec<Shape> = code
        .bars()
        .into_iter()
        .map(|(x, w)| Shape::Rect {
            x: bars_x + x * style.module_width,
            y: bars_y,
            width: w * style.module_width,
            height: style.bar_height,
            fill: "#000000",
        })
        .collect();
    shapes.push(Shape::Text { x: center_x, y: text_y, size: style.text_size, content: id.to_string() });

    if let (Some(text), Some((est, caption_y, box_y, box_h))) = (caption_text, caption_box) {
        let box_w = est.saturating_add(2 * style.caption_padding).min(width);
        shapes.push(Shape::Rect { x: (width - box_w) / 2, y: box_y, width: box_w, height: box_h, fill: "#ffffff" });
        shapes.push(Shape::Text { x: center_x, y: caption_y, size: style.caption_size, content: text });
    }

    Ok(LabelImage { width, height, font_family: style.font_family.clone(), shapes })
}

/// SVG markup for `id`, optionally captioned. Empty string when `id` cannot be encoded.
pub fn render_label(id: &str, caption: Option<&CaptionInputs>, style: &LabelStyle) -> String {
    match try_render_label(id, caption, style) {
        Ok(image) => image.to_svg(),
        Err(e) => {
            warn!(id, error = %e, "failed to generate barcode");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn soup() -> CaptionInputs {
        CaptionInputs::new("Soup", "Jane Doe", "2025-01-01", "2025-01-04")
    }

    fn declared(svg: &str, attr: &str) -> u32 {
        let key = format!("{attr}=\"");
        let start = svg.find(&key).unwrap() + key.len();
        let end = start + svg[start..].find('"').unwrap();
        svg[start..end].parse().unwrap()
    }

    #[test]
    fn bare_label_contains_id_text() {
        let svg = render_label("KL12345678000001", None, &LabelStyle::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(">KL12345678000001</text>"));
        assert!(!svg.contains("Soup"));
    }

    #[test]
    fn bare_label_has_natural_size() {
        let style = LabelStyle::default();
        let image = try_render_label("PJJ123C", None, &style).unwrap();
        // 10 symbols * 11 + 2 modules, 2px each, 10px margins
        assert_eq!(image.width, 112 * 2 + 20);
        assert_eq!(image.height, 20 + 60 + 2 + 16);
        assert_eq!(declared(&image.to_svg(), "width"), image.width);
    }

    #[test]
    fn caption_widens_and_heightens() {
        let style = LabelStyle::default();
        let bare = try_render_label("A1", None, &style).unwrap();
        let captioned = try_render_label("A1", Some(&soup()), &style).unwrap();
        let est = style.estimate_caption_width(&soup().caption());
        assert!(captioned.width >= bare.width);
        assert!(captioned.width >= est);
        assert_eq!(captioned.height, bare.height + style.caption_extra_height);
        assert!(captioned.height >= style.bar_height + style.caption_size + 2 * style.margin);
    }

    #[test]
    fn caption_box_fits_inside_image() {
        let style = LabelStyle::default();
        let long = CaptionInputs::new("Slow braised beef short rib with jus", "Ana Maria Lopez", "2025-01-01", "2025-01-04");
        let image = try_render_label("KL00000042123456", Some(&long), &style).unwrap();
        for shape in &image.shapes {
            if let Shape::Rect { x, y, width, height, .. } = shape {
                assert!(x + width <= image.width);
                assert!(y + height <= image.height);
            }
        }
        let Some(Shape::Text { y, content, .. }) = image.shapes.last() else { panic!("caption missing") };
        assert_eq!(content, &long.caption());
        assert!(*y < image.height);
    }

    #[test]
    fn bars_shift_up_with_caption() {
        let style = LabelStyle::default();
        let bare = try_render_label("A1", None, &style).unwrap();
        let captioned = try_render_label("A1", Some(&soup()), &style).unwrap();
        let first_y = |img: &LabelImage| match img.shapes[0] {
            Shape::Rect { y, .. } => y,
            _ => unreachable!(),
        };
        assert_eq!(first_y(&bare) - first_y(&captioned), style.caption_shift_up);
    }

    #[test]
    fn oversized_caption_style_grows_the_image() {
        let style = LabelStyle { bar_height: 10, caption_size: 60, caption_offset: 70, ..LabelStyle::default() };
        let image = try_render_label("KL1", Some(&soup()), &style).unwrap();
        for shape in &image.shapes {
            match shape {
                Shape::Rect { x, y, width, height, .. } => {
                    assert!(x + width <= image.width);
                    assert!(y + height <= image.height);
                }
                Shape::Text { y, .. } => assert!(*y <= image.height),
            }
        }
        assert!(!render_label("KL1", Some(&soup()), &style).is_empty());
    }

    #[test]
    fn rendering_is_deterministic() {
        let style = LabelStyle::default();
        assert_eq!(render_label("X-1", Some(&soup()), &style), render_label("X-1", Some(&soup()), &style));
    }

    #[test]
    fn caption_text_is_escaped() {
        let inputs = CaptionInputs::new("Mac & <Cheese>", "Jo", "2025-01-01", "2025-01-02");
        let svg = render_label("A1", Some(&inputs), &LabelStyle::default());
        assert!(svg.contains("Mac &amp; &lt;Cheese&gt; / J / 2025-01-01 / 2025-01-02"));
    }

    #[test]
    fn invalid_id_renders_empty() {
        assert_eq!(render_label("", None, &LabelStyle::default()), "");
        assert_eq!(render_label("bad\u{7}", Some(&soup()), &LabelStyle::default()), "");
    }
}
