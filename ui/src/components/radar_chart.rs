use dioxus::prelude::*;

use crate::report::radar::{
    css_color, svg_points, PointKind, GRID_RINGS, MARKER_RADIUS, OUTLIER_MARKER_RADIUS,
    POPULATION_COLOR,
};
use crate::report::RadarChart;
use crate::t;

const SIZE: f64 = 420.0;
const OUTER: f64 = 150.0;
const CENTER: (f64, f64) = (SIZE / 2.0, SIZE / 2.0);

/// z-score radar: grid rings at z = -3, -1, +1, +3, the population ring at
/// z = 0 and one polygon per compared session.
#[component]
pub fn RadarChartView(chart: RadarChart) -> Element {
    if chart.is_empty() {
        return rsx! {
            p { class: "dashboard-card__placeholder", {t!("chart-empty")} }
        };
    }

    let grid: Vec<String> = GRID_RINGS
        .iter()
        .map(|radius| svg_points(&chart.ring(*radius, CENTER, OUTER)))
        .collect();
    let spokes: Vec<(f64, f64)> = (0..chart.axes.len())
        .map(|axis| chart.project(axis, GRID_RINGS[GRID_RINGS.len() - 1], CENTER, OUTER))
        .collect();
    let labels: Vec<(String, f64, f64, &'static str)> = chart
        .axes
        .iter()
        .enumerate()
        .map(|(index, axis)| {
            let (x, y) = chart.project(index, 4.5, CENTER, OUTER);
            let anchor = if x < CENTER.0 - 1.0 {
                "end"
            } else if x > CENTER.0 + 1.0 {
                "start"
            } else {
                "middle"
            };
            (axis.label.clone(), x, y, anchor)
        })
        .collect();
    let (center_x, center_y) = CENTER;
    let view_box = format!("0 0 {SIZE} {SIZE}");
    let population = svg_points(&chart.population_ring(CENTER, OUTER));
    let population_color = css_color(POPULATION_COLOR);

    let series: Vec<(String, String, Vec<(f64, f64, PointKind)>)> = chart
        .series
        .iter()
        .map(|series| {
            let vertices = chart.vertices(series, CENTER, OUTER);
            let markers = vertices
                .iter()
                .zip(&series.points)
                .map(|((x, y), point)| (*x, *y, point.kind))
                .collect();
            (svg_points(&vertices), css_color(series.color), markers)
        })
        .collect();
    let legend: Vec<(String, String)> = chart
        .series
        .iter()
        .map(|series| (series.label.clone(), css_color(series.color)))
        .collect();

    rsx! {
        figure { class: "radar-chart",
            svg {
                class: "radar-chart__svg",
                view_box: "{view_box}",
                for points in grid.iter() {
                    polygon { class: "radar-chart__grid", points: "{points}" }
                }
                for (x, y) in spokes.iter() {
                    line {
                        class: "radar-chart__spoke",
                        x1: "{center_x}",
                        y1: "{center_y}",
                        x2: "{x}",
                        y2: "{y}",
                    }
                }
                polygon {
                    class: "radar-chart__population",
                    points: "{population}",
                    fill: "none",
                    stroke: "{population_color}",
                    stroke_dasharray: "4 3",
                }
                for (points, color, markers) in series.iter() {
                    g {
                        polygon {
                            class: "radar-chart__series",
                            points: "{points}",
                            fill: "{color}",
                            fill_opacity: "0.12",
                            stroke: "{color}",
                        }
                        for (x, y, kind) in markers.iter() {
                            {marker(*x, *y, *kind, color)}
                        }
                    }
                }
                for (label, x, y, anchor) in labels.iter() {
                    text {
                        class: "radar-chart__label",
                        x: "{x}",
                        y: "{y}",
                        text_anchor: "{anchor}",
                        dominant_baseline: "middle",
                        "{label}"
                    }
                }
            }
            figcaption { class: "radar-chart__legend",
                for (label, color) in legend.iter() {
                    span { class: "radar-chart__legend-item",
                        span { class: "radar-chart__legend-swatch", style: "background: {color}" }
                        "{label}"
                    }
                }
                span { class: "radar-chart__legend-item",
                    span {
                        class: "radar-chart__legend-swatch radar-chart__legend-swatch--population",
                        style: "background: {population_color}",
                    }
                    {t!("chart-population")}
                }
                span { class: "radar-chart__legend-item radar-chart__legend-item--note",
                    {t!("chart-outlier-note")}
                }
            }
        }
    }
}

fn marker(x: f64, y: f64, kind: PointKind, color: &str) -> Element {
    match kind {
        PointKind::Normal => rsx! {
            circle { cx: "{x}", cy: "{y}", r: "{MARKER_RADIUS}", fill: "{color}" }
        },
        PointKind::Outlier => {
            let side = OUTLIER_MARKER_RADIUS * 2.0;
            let left = x - OUTLIER_MARKER_RADIUS;
            let top = y - OUTLIER_MARKER_RADIUS;
            rsx! {
                rect {
                    class: "radar-chart__outlier",
                    x: "{left}",
                    y: "{top}",
                    width: "{side}",
                    height: "{side}",
                    fill: "{color}",
                }
            }
        }
        PointKind::Missing | PointKind::Invalid => {
            let radius = MARKER_RADIUS - 1.0;
            rsx! {
                circle { class: "radar-chart__unscored", cx: "{x}", cy: "{y}", r: "{radius}" }
            }
        }
    }
}
