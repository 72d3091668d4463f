//! PDF rendering and delivery of a [`Report`].
//!
//! Page one carries the header and the radar chart, page two the data table
//! (continued on further pages when it does not fit). Delivery is a browser
//! download on web and a file under the platform data directory on desktop.

use time::macros::format_description;
use time::OffsetDateTime;
use tracing::info;

use crate::core::error::ExportError;

use super::pdf::{Font, Page, PdfDocument, Rgb, A4_HEIGHT, A4_WIDTH};
use super::radar::{PointKind, GRID_RINGS, MARKER_RADIUS, OUTLIER_MARKER_RADIUS, POPULATION_COLOR};
use super::Report;

pub const PDF_MIME: &str = "application/pdf";

const MARGIN: f64 = 40.0;
const INK: Rgb = (15, 23, 42);
const MUTED: Rgb = (100, 116, 139);
const GRID: Rgb = (203, 213, 225);
const HEADER_FILL: Rgb = (226, 232, 240);
const WARNING: Rgb = (180, 83, 9);

const ROW_HEIGHT: f64 = 18.0;
const TABLE_FONT_SIZE: f64 = 9.0;

/// Fixed strings printed in the PDF. Components fill these from the active
/// locale; `Default` is English.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfLabels {
    pub title: String,
    pub participant: String,
    pub date: String,
    pub task: String,
    pub sessions: String,
    pub population: String,
    pub metric: String,
    pub unit: String,
    pub data_title: String,
    pub approximate_note: String,
    pub no_data: String,
}

impl Default for PdfLabels {
    fn default() -> Self {
        Self {
            title: "Gait Analysis Report".into(),
            participant: "Participant".into(),
            date: "Date".into(),
            task: "Task".into(),
            sessions: "Sessions".into(),
            population: "Population average".into(),
            metric: "Metric".into(),
            unit: "Unit".into(),
            data_title: "Data".into(),
            approximate_note: "* scored against a task-agnostic baseline".into(),
            no_data: "No metrics to plot".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportOutcome {
    pub file_name: String,
    /// Where the file landed on desktop; `None` for a browser download.
    pub saved_to: Option<String>,
}

/// `GaitReport_<participant>_<YYYYMMDD_HHMMSS>.pdf`, participant reduced to
/// filename-safe characters.
pub fn report_file_name(participant: &str, at: OffsetDateTime) -> String {
    let participant: String = participant
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let participant = if participant.is_empty() {
        "unknown".to_string()
    } else {
        participant
    };
    let stamp = at
        .format(&format_description!(
            "[year][month][day]_[hour][minute][second]"
        ))
        .unwrap_or_else(|_| "export".into());
    format!("GaitReport_{participant}_{stamp}.pdf")
}

/// Top-left layout coordinates → PDF user space.
fn flip(y: f64) -> f64 {
    A4_HEIGHT - y
}

fn text_width(text: &str, size: f64, font: Font) -> f64 {
    text.chars().count() as f64 * size * font.average_width()
}

/// Shorten `text` with an ellipsis until it fits `width`.
fn fit(text: &str, width: f64, size: f64, font: Font) -> String {
    if text_width(text, size, font) <= width {
        return text.to_string();
    }
    let mut shortened: String = text.to_string();
    while !shortened.is_empty() && text_width(&format!("{shortened}..."), size, font) > width {
        shortened.pop();
    }
    format!("{shortened}...")
}

fn render_summary(page: &mut Page, report: &Report, labels: &PdfLabels) {
    page.text(MARGIN, flip(60.0), 20.0, Font::Bold, INK, &labels.title);

    let header = &report.header;
    let lines = [
        (&labels.participant, header.participant_id.clone()),
        (&labels.date, header.date.clone()),
        (&labels.task, header.task.clone().unwrap_or_else(|| "-".into())),
        (&labels.sessions, header.sessions.join(", ")),
    ];
    for (index, (label, value)) in lines.iter().enumerate() {
        let y = flip(92.0 + index as f64 * 18.0);
        page.text(MARGIN, y, 11.0, Font::Bold, INK, &format!("{label}:"));
        page.text(MARGIN + 90.0, y, 11.0, Font::Regular, INK, value);
    }

    render_radar(page, report, labels);
}

fn render_radar(page: &mut Page, report: &Report, labels: &PdfLabels) {
    let chart = &report.radar;
    let center = (A4_WIDTH / 2.0, 420.0);
    let outer = 170.0;
    let to_pdf = |points: Vec<(f64, f64)>| -> Vec<(f64, f64)> {
        points.into_iter().map(|(x, y)| (x, flip(y))).collect()
    };

    if chart.is_empty() {
        page.text(MARGIN, flip(center.1), 12.0, Font::Regular, MUTED, &labels.no_data);
        return;
    }

    for radius in GRID_RINGS {
        page.polygon(&to_pdf(chart.ring(radius, center, outer)), 0.5, GRID, None);
    }
    for (index, axis) in chart.axes.iter().enumerate() {
        let (x, y) = chart.project(index, GRID_RINGS[GRID_RINGS.len() - 1], center, outer);
        page.line((center.0, flip(center.1)), (x, flip(y)), 0.5, GRID);

        let (lx, ly) = chart.project(index, 4.45, center, outer);
        let label = fit(&axis.label, 120.0, 9.0, Font::Regular);
        let width = text_width(&label, 9.0, Font::Regular);
        let lx = if lx < center.0 - 1.0 {
            lx - width
        } else if lx <= center.0 + 1.0 {
            lx - width / 2.0
        } else {
            lx
        };
        page.text(lx, flip(ly) - 3.0, 9.0, Font::Regular, INK, &label);
    }

    page.polygon(&to_pdf(chart.population_ring(center, outer)), 1.5, POPULATION_COLOR, None);

    for series in &chart.series {
        let vertices = chart.vertices(series, center, outer);
        page.polygon(&to_pdf(vertices.clone()), 1.5, series.color, None);
        for ((x, y), point) in vertices.into_iter().zip(&series.points) {
            match point.kind {
                PointKind::Normal => page.circle((x, flip(y)), MARKER_RADIUS, series.color),
                PointKind::Outlier => page.rect(
                    (x - OUTLIER_MARKER_RADIUS, flip(y) - OUTLIER_MARKER_RADIUS),
                    (OUTLIER_MARKER_RADIUS * 2.0, OUTLIER_MARKER_RADIUS * 2.0),
                    series.color,
                ),
                PointKind::Missing | PointKind::Invalid => {
                    page.circle((x, flip(y)), MARKER_RADIUS - 1.0, MUTED)
                }
            }
        }
    }

    // Legend
    let mut x = MARGIN;
    let y = flip(center.1 + outer + 50.0);
    let entries = chart
        .series
        .iter()
        .map(|series| (series.label.as_str(), series.color))
        .chain(std::iter::once((labels.population.as_str(), POPULATION_COLOR)));
    for (label, color) in entries {
        page.rect((x, y - 1.0), (10.0, 10.0), color);
        page.text(x + 14.0, y, 10.0, Font::Regular, INK, label);
        x += 14.0 + text_width(label, 10.0, Font::Regular) + 18.0;
    }
}

struct Columns {
    metric: f64,
    unit: f64,
    population: f64,
    sessions: f64,
    session_width: f64,
}

impl Columns {
    fn new(session_count: usize) -> Self {
        let sessions = MARGIN + 250.0;
        Self {
            metric: MARGIN,
            unit: MARGIN + 140.0,
            population: MARGIN + 190.0,
            sessions,
            session_width: (A4_WIDTH - MARGIN - sessions) / session_count.max(1) as f64,
        }
    }
}

fn render_table_header(page: &mut Page, report: &Report, labels: &PdfLabels, columns: &Columns, top: f64) {
    page.rect(
        (MARGIN - 4.0, flip(top) - 5.0),
        (A4_WIDTH - 2.0 * MARGIN + 8.0, ROW_HEIGHT),
        HEADER_FILL,
    );
    let y = flip(top) + 1.0;
    page.text(columns.metric, y, TABLE_FONT_SIZE, Font::Bold, INK, &labels.metric);
    page.text(columns.unit, y, TABLE_FONT_SIZE, Font::Bold, INK, &labels.unit);
    let population = fit(&labels.population, 56.0, TABLE_FONT_SIZE, Font::Bold);
    page.text(columns.population, y, TABLE_FONT_SIZE, Font::Bold, INK, &population);
    for (index, session) in report.header.sessions.iter().enumerate() {
        let x = columns.sessions + index as f64 * columns.session_width;
        let label = fit(session, columns.session_width - 4.0, TABLE_FONT_SIZE, Font::Bold);
        page.text(x, y, TABLE_FONT_SIZE, Font::Bold, INK, &label);
    }
}

fn render_table(report: &Report, labels: &PdfLabels) -> Vec<Page> {
    let columns = Columns::new(report.header.sessions.len());
    let first_top = 100.0;
    let bottom = A4_HEIGHT - 70.0;

    let mut pages = Vec::new();
    let mut page = Page::new();
    page.text(MARGIN, flip(60.0), 16.0, Font::Bold, INK, &labels.data_title);
    render_table_header(&mut page, report, labels, &columns, first_top);
    let mut y = first_top + ROW_HEIGHT;

    for row in &report.rows {
        if y > bottom {
            pages.push(std::mem::take(&mut page));
            render_table_header(&mut page, report, labels, &columns, 60.0);
            y = 60.0 + ROW_HEIGHT;
        }
        let baseline = flip(y) + 1.0;
        let metric = if row.approximate {
            format!("{}*", row.label)
        } else {
            row.label.clone()
        };
        let metric = fit(&metric, 136.0, TABLE_FONT_SIZE, Font::Regular);
        page.text(columns.metric, baseline, TABLE_FONT_SIZE, Font::Regular, INK, &metric);
        let unit = fit(&row.units, 46.0, TABLE_FONT_SIZE, Font::Regular);
        page.text(columns.unit, baseline, TABLE_FONT_SIZE, Font::Regular, MUTED, &unit);
        page.text(
            columns.population,
            baseline,
            TABLE_FONT_SIZE,
            Font::Regular,
            INK,
            &row.population_display(),
        );
        for (index, session) in report.header.sessions.iter().enumerate() {
            let Some(cell) = row.cell(session) else {
                continue;
            };
            let x = columns.sessions + index as f64 * columns.session_width;
            let color = if cell.z().is_some_and(|z| !z.is_finite()) {
                WARNING
            } else {
                INK
            };
            let text = fit(&cell.display(), columns.session_width - 4.0, TABLE_FONT_SIZE, Font::Regular);
            page.text(x, baseline, TABLE_FONT_SIZE, Font::Regular, color, &text);
        }
        page.line(
            (MARGIN - 4.0, flip(y) - 5.0),
            (A4_WIDTH - MARGIN + 4.0, flip(y) - 5.0),
            0.3,
            GRID,
        );
        y += ROW_HEIGHT;
    }

    if report.rows.iter().any(|row| row.approximate) {
        page.text(MARGIN, flip(y + 10.0), 8.0, Font::Regular, MUTED, &labels.approximate_note);
    }
    pages.push(page);
    pages
}

/// Summary page followed by the data table.
pub fn layout_report(report: &Report, labels: &PdfLabels) -> PdfDocument {
    let mut document = PdfDocument::new();
    let mut summary = Page::new();
    render_summary(&mut summary, report, labels);
    document.push(summary);
    for page in render_table(report, labels) {
        document.push(page);
    }
    document
}

pub fn render_pdf(report: &Report, labels: &PdfLabels) -> Result<Vec<u8>, ExportError> {
    layout_report(report, labels).to_bytes(&labels.title)
}

/// Render and hand the PDF to the platform.
pub async fn export_report(
    report: &Report,
    labels: &PdfLabels,
    at: OffsetDateTime,
) -> Result<ExportOutcome, ExportError> {
    if report.rows.is_empty() {
        return Err(ExportError::Empty(labels.no_data.clone()));
    }
    let file_name = report_file_name(&report.header.participant_id, at);
    let document = layout_report(report, labels);
    let pages = document.page_count();
    let bytes = document.to_bytes(&labels.title)?;
    let saved_to = download_bytes(&file_name, PDF_MIME, bytes).await?;
    info!(file = %file_name, pages, saved_to = ?saved_to, "report exported");
    Ok(ExportOutcome {
        file_name,
        saved_to,
    })
}

async fn download_bytes(
    filename: &str,
    mime: &str,
    bytes: Vec<u8>,
) -> Result<Option<String>, ExportError> {
    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::JsCast;
        use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

        let failed = |what: &str| ExportError::Download(what.to_string());

        let array = js_sys::Uint8Array::from(bytes.as_slice());
        let parts = js_sys::Array::new();
        parts.push(&array.buffer());

        let mut opts = BlobPropertyBag::new();
        opts.type_(mime);
        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &opts)
            .map_err(|_| failed("Failed to create blob"))?;
        let url = Url::create_object_url_with_blob(&blob)
            .map_err(|_| failed("Unable to create download"))?;

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| failed("Document unavailable"))?;
        let anchor: HtmlAnchorElement = document
            .create_element("a")
            .map_err(|_| failed("Unable to create anchor"))?
            .dyn_into()
            .map_err(|_| failed("Anchor cast failed"))?;
        anchor.set_href(&url);
        anchor.set_download(filename);
        anchor.style().set_property("display", "none").ok();

        document
            .body()
            .ok_or_else(|| failed("Missing body"))?
            .append_child(&anchor)
            .ok();
        anchor.click();
        anchor.remove();
        Url::revoke_object_url(&url).ok();

        Ok(None)
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        use std::fs;

        let _ = mime;
        let dir = desktop_export_dir()?;
        let io_error = |path: &std::path::Path, source| ExportError::Io {
            path: path.display().to_string(),
            source,
        };
        fs::create_dir_all(&dir).map_err(|err| io_error(&dir, err))?;
        let path = dir.join(filename);
        fs::write(&path, &bytes).map_err(|err| io_error(&path, err))?;
        Ok(Some(path.to_string_lossy().to_string()))
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn desktop_export_dir() -> Result<std::path::PathBuf, ExportError> {
    let dirs = directories::ProjectDirs::from("org", "GaitVision", "GaitVision")
        .ok_or(ExportError::NoExportDir)?;
    Ok(dirs.data_dir().join("exports"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{CellValue, RadarChart, ReportCell, ReportHeader, ReportRow};
    use time::macros::datetime;

    fn report(rows: usize) -> Report {
        let sessions = vec!["Baseline".to_string(), "PI-1".to_string()];
        let rows: Vec<ReportRow> = (0..rows)
            .map(|index| ReportRow {
                metric: format!("Metric_{index}"),
                label: format!("Metric {index}"),
                units: "m/s".into(),
                population_mean: Some(0.6),
                approximate: index == 0,
                cells: vec![ReportCell {
                    session: "Baseline".into(),
                    value: CellValue::Score {
                        raw: 0.9,
                        z: Some(1.0),
                    },
                }],
            })
            .collect();
        let radar = RadarChart::build(&rows, &sessions);
        Report {
            header: ReportHeader {
                participant_id: "P07".into(),
                date: "2024-03-05".into(),
                task: Some("ST".into()),
                sessions,
            },
            rows,
            radar,
        }
    }

    #[test]
    fn file_name_carries_participant_and_timestamp() {
        let at = datetime!(2024-03-05 14:30:09 UTC);
        assert_eq!(
            report_file_name("P07", at),
            "GaitReport_P07_20240305_143009.pdf"
        );
        assert_eq!(
            report_file_name(" A/B 12 ", at),
            "GaitReport_A_B_12_20240305_143009.pdf"
        );
        assert_eq!(
            report_file_name("", at),
            "GaitReport_unknown_20240305_143009.pdf"
        );
    }

    fn all_texts(document: &PdfDocument) -> Vec<String> {
        document
            .pages()
            .iter()
            .flat_map(|page| page.texts().map(str::to_string))
            .collect()
    }

    #[test]
    fn short_reports_lay_out_two_pages() {
        let document = layout_report(&report(3), &PdfLabels::default());
        assert_eq!(document.page_count(), 2);

        let summary: Vec<&str> = document.pages()[0].texts().collect();
        assert!(summary.contains(&"P07"));
        assert!(summary.contains(&"Baseline, PI-1"));

        let texts = all_texts(&document);
        assert!(texts.iter().any(|text| text == "0.90 (z 1.00)"));
        assert!(texts.iter().any(|text| text == "Metric 0*"));
    }

    #[test]
    fn long_tables_continue_on_another_page() {
        let document = layout_report(&report(60), &PdfLabels::default());
        assert_eq!(document.page_count(), 3);
    }

    #[test]
    fn rendered_bytes_are_a_pdf() {
        let bytes = render_pdf(&report(3), &PdfLabels::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn micro_units_survive_into_the_table() {
        let mut report = report(1);
        report.rows[0].units = "μs".into();
        let texts = all_texts(&layout_report(&report, &PdfLabels::default()));
        assert!(texts.iter().any(|text| text == "\u{00B5}s"));
    }

    #[test]
    fn long_labels_are_shortened() {
        let fitted = fit("A very long metric name indeed", 60.0, 9.0, Font::Regular);
        assert!(fitted.ends_with("..."));
        assert!(text_width(&fitted, 9.0, Font::Regular) <= 60.0);
        assert_eq!(fit("Short", 60.0, 9.0, Font::Regular), "Short");
    }
}
