//! Chart series derived from monthly metrics.
//!
//! DESIGN
//! ======
//! Metrics arrive one row per (author, month). The per-author series keeps
//! every row sorted by month; the aggregated series sums rows sharing a
//! label, in first-seen order, so months stay chronological.

use serde::Serialize;

use super::format::{month_label, month_label_full};
use crate::net::types::Metric;

/// One row of the per-author charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub posts: i64,
    pub frequency: f64,
    pub nick: String,
}

/// Posts summed across authors for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthTotal {
    pub label: String,
    pub posts: i64,
}

/// Sort by reference month and map to chart rows.
#[must_use]
pub fn chart_points(metrics: &[Metric]) -> Vec<ChartPoint> {
    let mut sorted: Vec<&Metric> = metrics.iter().collect();
    sorted.sort_by(|a, b| a.month.cmp(&b.month));
    sorted
        .into_iter()
        .map(|m| ChartPoint {
            label: month_label(&m.month),
            posts: m.month_posts,
            frequency: m.days_frequency.unwrap_or(0.0),
            nick: m.profile_nick.clone(),
        })
        .collect()
}

#[must_use]
pub fn aggregate_by_month(points: &[ChartPoint]) -> Vec<MonthTotal> {
    let mut totals: Vec<MonthTotal> = Vec::new();
    for point in points {
        match totals.iter_mut().find(|t| t.label == point.label) {
            Some(total) => total.posts += point.posts,
            None => totals.push(MonthTotal { label: point.label.clone(), posts: point.posts }),
        }
    }
    totals
}

/// One line of the metrics list: full month, author, and the figures present.
#[must_use]
pub fn metric_summary(metric: &Metric) -> String {
    let mut parts = vec![
        month_label_full(&metric.month),
        metric.profile_nick.clone(),
        format!("{} posts no mês", metric.month_posts),
    ];
    if metric.week_posts > 0.0 {
        parts.push(format!("{:.2} por semana", metric.week_posts));
    }
    if let Some(days) = metric.days_frequency {
        parts.push(format!("a cada {days:.1} dias"));
    }
    parts.push(format!("{} no total", metric.total_posts));
    parts.join("\t")
}

#[cfg(test)]
#[path = "metrics_test.rs"]
mod tests;
