// Aggregate health metrics, recomputed from scratch every refresh cycle

use serde::{Deserialize, Serialize};

/// Spare-capacity grade for `average_idr` (>= 30 good, >= 10 fair).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IdrGrade {
    Good,
    Fair,
    #[default]
    Poor,
}

impl IdrGrade {
    pub fn from_average(average_idr: f64) -> Self {
        if average_idr >= 30.0 {
            IdrGrade::Good
        } else if average_idr >= 10.0 {
            IdrGrade::Fair
        } else {
            IdrGrade::Poor
        }
    }
}

/// healthy + warning + critical never exceeds total: other statuses land in no bucket.
/// `online_count` comes from liveness, `declared_online` from the status field; they are
/// reported side by side and never reconciled.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub total_nodes: usize,
    pub healthy_count: usize,
    pub warning_count: usize,
    pub critical_count: usize,
    pub online_count: usize,
    #[serde(rename = "averageIDR")]
    pub average_idr: f64,
    pub idr_grade: IdrGrade,
    pub declared_online: usize,
    pub degraded_count: usize,
    pub offline_count: usize,
    pub unknown_count: usize,
    pub lagging_count: usize,
}
