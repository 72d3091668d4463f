//! Radar chart geometry shared by the SVG view and the PDF.
//!
//! Radii are in z-space after encoding: 1.0 is z = -3, 2.5 is the population
//! average and 4.0 is z = +3. Axes start at twelve o'clock and run clockwise.
//! Coordinates are y-down; the PDF flips them when it draws.

use std::f64::consts::{FRAC_PI_2, TAU};

use crate::core::zscore::{encode, POPULATION_RADIUS};

use super::ReportRow;

/// Outer ring (z = +3).
pub const MAX_RADIUS: f64 = 4.0;
pub const GRID_RINGS: [f64; 4] = [1.0, 2.0, 3.0, 4.0];

pub const MARKER_RADIUS: f64 = 3.5;
pub const OUTLIER_MARKER_RADIUS: f64 = 6.0;

/// Series colours, cycled by session order.
pub const SERIES_COLORS: [(u8, u8, u8); 4] = [
    (37, 99, 235),
    (220, 38, 38),
    (22, 163, 74),
    (202, 138, 4),
];
pub const POPULATION_COLOR: (u8, u8, u8) = (100, 116, 139);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointKind {
    Normal,
    /// |z| > 3, clipped to the outer ring.
    Outlier,
    /// No value or no baseline; drawn on the population ring.
    Missing,
    /// Non-finite z (zero standard deviation); drawn on the population ring.
    Invalid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadarAxis {
    pub metric: String,
    pub label: String,
    pub angle: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadarPoint {
    pub radius: f64,
    pub kind: PointKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadarSeries {
    pub label: String,
    pub color: (u8, u8, u8),
    pub points: Vec<RadarPoint>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RadarChart {
    pub axes: Vec<RadarAxis>,
    pub series: Vec<RadarSeries>,
}

fn axis_angle(index: usize, count: usize) -> f64 {
    -FRAC_PI_2 + TAU * index as f64 / count as f64
}

fn point_for(row: &ReportRow, session: &str) -> RadarPoint {
    match row.cell(session).and_then(|cell| cell.z()) {
        Some(z) if !z.is_finite() => RadarPoint {
            radius: POPULATION_RADIUS,
            kind: PointKind::Invalid,
        },
        Some(z) => {
            let encoded = encode(Some(z));
            RadarPoint {
                radius: encoded.radius,
                kind: if encoded.outlier {
                    PointKind::Outlier
                } else {
                    PointKind::Normal
                },
            }
        }
        None => RadarPoint {
            radius: POPULATION_RADIUS,
            kind: PointKind::Missing,
        },
    }
}

impl RadarChart {
    /// One axis per report row, one series per compared session.
    pub fn build(rows: &[ReportRow], sessions: &[String]) -> Self {
        let axes = rows
            .iter()
            .enumerate()
            .map(|(index, row)| RadarAxis {
                metric: row.metric.clone(),
                label: row.label.clone(),
                angle: axis_angle(index, rows.len()),
            })
            .collect();

        let series = sessions
            .iter()
            .enumerate()
            .map(|(index, session)| RadarSeries {
                label: session.clone(),
                color: SERIES_COLORS[index % SERIES_COLORS.len()],
                points: rows.iter().map(|row| point_for(row, session)).collect(),
            })
            .collect();

        Self { axes, series }
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    /// Position of `radius` along `axis`, scaled so [`MAX_RADIUS`] lands at
    /// `outer` units from `center`.
    pub fn project(&self, axis: usize, radius: f64, center: (f64, f64), outer: f64) -> (f64, f64) {
        let angle = self.axes.get(axis).map_or(0.0, |axis| axis.angle);
        let scale = outer / MAX_RADIUS;
        (
            center.0 + radius * scale * angle.cos(),
            center.1 + radius * scale * angle.sin(),
        )
    }

    pub fn vertices(&self, series: &RadarSeries, center: (f64, f64), outer: f64) -> Vec<(f64, f64)> {
        series
            .points
            .iter()
            .enumerate()
            .map(|(axis, point)| self.project(axis, point.radius, center, outer))
            .collect()
    }

    /// Polygon for a constant radius, e.g. a grid ring or the population ring.
    pub fn ring(&self, radius: f64, center: (f64, f64), outer: f64) -> Vec<(f64, f64)> {
        (0..self.axes.len())
            .map(|axis| self.project(axis, radius, center, outer))
            .collect()
    }

    pub fn population_ring(&self, center: (f64, f64), outer: f64) -> Vec<(f64, f64)> {
        self.ring(POPULATION_RADIUS, center, outer)
    }
}

/// `"x1,y1 x2,y2 ..."` for an SVG `points` attribute.
pub fn svg_points(vertices: &[(f64, f64)]) -> String {
    vertices
        .iter()
        .map(|(x, y)| format!("{x:.2},{y:.2}"))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn css_color((r, g, b): (u8, u8, u8)) -> String {
    format!("rgb({r}, {g}, {b})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{CellValue, ReportCell};

    fn row(metric: &str, cells: &[(&str, Option<f64>)]) -> ReportRow {
        ReportRow {
            metric: metric.to_string(),
            label: metric.replace('_', " "),
            units: String::new(),
            population_mean: Some(0.0),
            approximate: false,
            cells: cells
                .iter()
                .map(|(session, z)| ReportCell {
                    session: session.to_string(),
                    value: CellValue::Score { raw: 1.0, z: *z },
                })
                .collect(),
        }
    }

    fn sessions(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn one_axis_per_metric_one_series_per_session() {
        let rows = vec![
            row("Cadence", &[("Baseline", Some(1.0)), ("PI-1", Some(-1.0))]),
            row("Step_Width", &[("Baseline", Some(0.0))]),
            row("Stride_Length", &[("Baseline", Some(4.0))]),
        ];
        let chart = RadarChart::build(&rows, &sessions(&["Baseline", "PI-1"]));
        assert_eq!(chart.axes.len(), 3);
        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[0].points[0].radius, 3.0);
        assert_eq!(chart.series[0].points[2].kind, PointKind::Outlier);
        assert_eq!(chart.series[0].points[2].radius, MAX_RADIUS);
        assert_eq!(chart.series[1].points[1].kind, PointKind::Missing);
        assert_eq!(chart.series[1].points[1].radius, POPULATION_RADIUS);
    }

    #[test]
    fn non_finite_scores_are_marked_invalid() {
        let rows = vec![row("Cadence", &[("Baseline", Some(f64::INFINITY))])];
        let chart = RadarChart::build(&rows, &sessions(&["Baseline"]));
        let point = chart.series[0].points[0];
        assert_eq!(point.kind, PointKind::Invalid);
        assert_eq!(point.radius, POPULATION_RADIUS);
    }

    #[test]
    fn first_axis_points_up() {
        let rows = vec![row("A", &[]), row("B", &[]), row("C", &[]), row("D", &[])];
        let chart = RadarChart::build(&rows, &[]);
        let (x, y) = chart.project(0, MAX_RADIUS, (100.0, 100.0), 80.0);
        assert!((x - 100.0).abs() < 1e-9);
        assert!((y - 20.0).abs() < 1e-9);

        let (x, y) = chart.project(1, MAX_RADIUS, (100.0, 100.0), 80.0);
        assert!((x - 180.0).abs() < 1e-9);
        assert!((y - 100.0).abs() < 1e-9);
    }

    #[test]
    fn population_ring_sits_at_average_radius() {
        let rows = vec![row("A", &[]), row("B", &[]), row("C", &[])];
        let chart = RadarChart::build(&rows, &[]);
        for (x, y) in chart.population_ring((0.0, 0.0), 80.0) {
            let distance = (x * x + y * y).sqrt();
            assert!((distance - 50.0).abs() < 1e-9);
        }
    }

    #[test]
    fn svg_points_are_space_separated_pairs() {
        assert_eq!(svg_points(&[(1.0, 2.5), (3.25, 4.0)]), "1.00,2.50 3.25,4.00");
    }
}
