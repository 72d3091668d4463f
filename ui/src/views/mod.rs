mod home;
pub use home::Home;

mod dashboard;
pub use dashboard::Dashboard;

mod report;
pub use report::ReportView;
