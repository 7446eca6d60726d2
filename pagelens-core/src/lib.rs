pub mod analysis;
pub mod report;
pub mod store;

pub use analysis::{run_analysis, AnalysisOptions};
pub use report::{Report, ReportFormat, TrackingFinding};
pub use store::FsThumbnailStore;
