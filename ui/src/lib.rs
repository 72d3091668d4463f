//! Shared UI crate for GaitVision. Dashboard logic, report export and all
//! views live here; the launchers only add routing and platform resources.

use dioxus::prelude::*;

pub mod context;
pub mod core;
pub mod i18n;
pub mod report;
pub mod views;

pub mod components {
    // Localized application navbar (components/app_navbar.rs)
    pub mod app_navbar;
    pub use app_navbar::register_nav;
    pub use app_navbar::AppNavbar;
    pub use app_navbar::NavBuilder;

    mod upload;
    pub use upload::{UploadCard, UploadKind};

    mod selectors;
    pub use selectors::{FilterBar, MetricPicker, SessionPicker};

    mod radar_chart;
    pub use radar_chart::RadarChartView;

    mod report_table;
    pub use report_table::ReportTable;

    mod export_panel;
    pub use export_panel::{localized_pdf_labels, ExportPanel};
}

/// Shared theme; web links it, desktop embeds the same file.
pub const THEME_CSS: Asset = asset!("/assets/theme/main.css");
