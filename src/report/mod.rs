//! Client-side shaping of content for display: chart series and labels.

pub mod format;
pub mod metrics;

pub use format::{format_publish_date, month_label, month_label_full};
pub use metrics::{ChartPoint, MonthTotal, aggregate_by_month, chart_points, metric_summary};
