//! Drawing surface for the report PDF.
//!
//! Layout code records shapes on a [`Page`] in PDF points (origin bottom-left);
//! [`PdfDocument::to_bytes`] replays them onto `printpdf` layers using the
//! built-in Helvetica faces.

use printpdf::path::{PaintMode, WindingOrder};
use printpdf::utils::calculate_points_for_circle;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocumentReference, PdfLayerReference,
    Point, Polygon, Pt,
};

use crate::core::error::ExportError;

pub const A4_WIDTH: f64 = 595.0;
pub const A4_HEIGHT: f64 = 842.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    /// Rough advance width per point of font size, for right-aligning and
    /// truncating. Helvetica averages a little over half an em.
    pub fn average_width(self) -> f64 {
        match self {
            Self::Regular => 0.52,
            Self::Bold => 0.56,
        }
    }
}

pub type Rgb = (u8, u8, u8);

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Text {
        origin: (f64, f64),
        size: f64,
        font: Font,
        color: Rgb,
        text: String,
    },
    Line {
        from: (f64, f64),
        to: (f64, f64),
        width: f64,
        color: Rgb,
    },
    /// Closed outline, optionally filled.
    Polygon {
        points: Vec<(f64, f64)>,
        width: f64,
        stroke: Rgb,
        fill: Option<Rgb>,
    },
    Rect {
        origin: (f64, f64),
        size: (f64, f64),
        fill: Rgb,
    },
    Circle {
        center: (f64, f64),
        radius: f64,
        fill: Rgb,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    shapes: Vec<Shape>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Every string drawn on the page, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.shapes.iter().filter_map(|shape| match shape {
            Shape::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn text(&mut self, x: f64, y: f64, size: f64, font: Font, color: Rgb, text: &str) {
        self.shapes.push(Shape::Text {
            origin: (x, y),
            size,
            font,
            color,
            text: winansi_text(text),
        });
    }

    pub fn line(&mut self, from: (f64, f64), to: (f64, f64), width: f64, color: Rgb) {
        self.shapes.push(Shape::Line {
            from,
            to,
            width,
            color,
        });
    }

    pub fn polygon(&mut self, points: &[(f64, f64)], width: f64, stroke: Rgb, fill: Option<Rgb>) {
        if points.len() < 2 {
            return;
        }
        self.shapes.push(Shape::Polygon {
            points: points.to_vec(),
            width,
            stroke,
            fill,
        });
    }

    pub fn rect(&mut self, origin: (f64, f64), size: (f64, f64), fill: Rgb) {
        self.shapes.push(Shape::Rect { origin, size, fill });
    }

    pub fn circle(&mut self, center: (f64, f64), radius: f64, fill: Rgb) {
        self.shapes.push(Shape::Circle {
            center,
            radius,
            fill,
        });
    }
}

/// Swap characters the WinAnsi-encoded standard fonts lack for their
/// Latin-1 lookalikes (`μs` is a common unit). Control characters become
/// spaces.
fn winansi_text(text: &str) -> String {
    text.chars()
        .map(|ch| match ch {
            '\u{03BC}' => '\u{00B5}',
            '\u{2212}' => '-',
            '\u{00A0}' => ' ',
            c if c.is_control() => ' ',
            c => c,
        })
        .collect()
}

fn mm(points: f64) -> Mm {
    Mm((points * 25.4 / 72.0) as f32)
}

fn point((x, y): (f64, f64)) -> Point {
    Point::new(mm(x), mm(y))
}

fn color((r, g, b): Rgb) -> Color {
    let channel = |value: u8| f32::from(value) / 255.0;
    Color::Rgb(printpdf::Rgb::new(channel(r), channel(g), channel(b), None))
}

fn render_error(err: impl std::fmt::Display) -> ExportError {
    ExportError::Render(err.to_string())
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn load(doc: &PdfDocumentReference) -> Result<Self, ExportError> {
        Ok(Self {
            regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(render_error)?,
            bold: doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(render_error)?,
        })
    }

    fn get(&self, font: Font) -> &IndirectFontRef {
        match font {
            Font::Regular => &self.regular,
            Font::Bold => &self.bold,
        }
    }
}

fn draw(layer: &PdfLayerReference, fonts: &Fonts, shape: &Shape) {
    match shape {
        Shape::Text {
            origin,
            size,
            font,
            color: rgb,
            text,
        } => {
            layer.set_fill_color(color(*rgb));
            layer.use_text(
                text.as_str(),
                *size as f32,
                mm(origin.0),
                mm(origin.1),
                fonts.get(*font),
            );
        }
        Shape::Line {
            from,
            to,
            width,
            color: rgb,
        } => {
            layer.set_outline_color(color(*rgb));
            layer.set_outline_thickness(*width as f32);
            layer.add_line(Line {
                points: vec![(point(*from), false), (point(*to), false)],
                is_closed: false,
            });
        }
        Shape::Polygon {
            points,
            width,
            stroke,
            fill,
        } => {
            layer.set_outline_color(color(*stroke));
            layer.set_outline_thickness(*width as f32);
            let mode = match fill {
                Some(fill) => {
                    layer.set_fill_color(color(*fill));
                    PaintMode::FillStroke
                }
                None => PaintMode::Stroke,
            };
            layer.add_polygon(Polygon {
                rings: vec![points.iter().map(|p| (point(*p), false)).collect()],
                mode,
                winding_order: WindingOrder::NonZero,
            });
        }
        Shape::Rect {
            origin: (x, y),
            size: (w, h),
            fill,
        } => {
            layer.set_fill_color(color(*fill));
            let corners = [(*x, *y), (x + w, *y), (x + w, y + h), (*x, y + h)];
            layer.add_polygon(Polygon {
                rings: vec![corners.iter().map(|p| (point(*p), false)).collect()],
                mode: PaintMode::Fill,
                winding_order: WindingOrder::NonZero,
            });
        }
        Shape::Circle {
            center,
            radius,
            fill,
        } => {
            layer.set_fill_color(color(*fill));
            let ring = calculate_points_for_circle(
                Pt(*radius as f32),
                Pt(center.0 as f32),
                Pt(center.1 as f32),
            );
            layer.add_polygon(Polygon {
                rings: vec![ring],
                mode: PaintMode::Fill,
                winding_order: WindingOrder::NonZero,
            });
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdfDocument {
    pages: Vec<Page>,
}

impl PdfDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, page: Page) {
        self.pages.push(page);
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Serialize as A4 pages, one layer each.
    pub fn to_bytes(&self, title: &str) -> Result<Vec<u8>, ExportError> {
        let (doc, first_page, first_layer) =
            printpdf::PdfDocument::new(title, mm(A4_WIDTH), mm(A4_HEIGHT), "Page 1");
        let fonts = Fonts::load(&doc)?;

        for (index, page) in self.pages.iter().enumerate() {
            let layer = if index == 0 {
                doc.get_page(first_page).get_layer(first_layer)
            } else {
                let (page_index, layer_index) =
                    doc.add_page(mm(A4_WIDTH), mm(A4_HEIGHT), format!("Page {}", index + 1));
                doc.get_page(page_index).get_layer(layer_index)
            };
            for shape in page.shapes() {
                draw(&layer, &fonts, shape);
            }
        }

        doc.save_to_bytes().map_err(render_error)
    }
}
