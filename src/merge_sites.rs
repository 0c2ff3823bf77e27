//! Confirmed merge sites from the "ExaSPIM Merge Locations" sheet.
//!
//! Parent rows name a sample as `<brain_id>_<segmentation_id>`; their child
//! rows are individual review sites.

use crate::coords::{parse_xyz, Xyz};
use crate::error::{Error, Result};
use crate::sheet::SheetSnapshot;
use serde::Serialize;

pub const SAMPLE_COLUMN: &str = "Sample";
pub const MERGE_CONFIRMATION_COLUMN: &str = "Merge Confirmation";
pub const REVIEWED_COLUMN: &str = "Reviewed?";
pub const SEGMENTATION_ID_COLUMN: &str = "Segmentation ID";
pub const GROUND_TRUTH_ID_COLUMN: &str = "Ground Truth ID";
pub const WORLD_COORDINATES_COLUMN: &str = "World Coordinates";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeSite {
    pub brain_id: String,
    pub segmentation_id: String,
    /// Segment id recorded on the review row itself.
    pub segment_id: Option<String>,
    pub groundtruth_id: Option<String>,
    pub xyz: Xyz,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleStats {
    pub brain_id: String,
    pub segmentation_id: String,
    pub confirmed: usize,
    pub reviewed: usize,
}

impl SampleStats {
    pub fn success_rate(&self) -> Option<f64> {
        ratio(self.confirmed, self.reviewed)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MergeSiteReport {
    pub sites: Vec<MergeSite>,
    /// One entry per sample with at least one confirmed site.
    pub samples: Vec<SampleStats>,
    pub confirmed: usize,
    pub reviewed: usize,
}

impl MergeSiteReport {
    /// Confirmed over reviewed; `None` when nothing was reviewed.
    pub fn success_rate(&self) -> Option<f64> {
        ratio(self.confirmed, self.reviewed)
    }
}

fn ratio(num: usize, den: usize) -> Option<f64> {
    (den > 0).then(|| num as f64 / den as f64)
}

/// Split a sample name on its first underscore.
pub fn split_sample(sample: &str) -> Result<(String, String)> {
    sample
        .split_once('_')
        .map(|(b, s)| (b.to_string(), s.to_string()))
        .ok_or_else(|| Error::InvalidSample {
            value: sample.to_string(),
        })
}

fn is_set(snap: &SheetSnapshot, row: usize, column: &str) -> Result<bool> {
    Ok(snap.value_at(row, column)?.is_some_and(|v| v.is_truthy()))
}

/// Review sites under one sample that are both confirmed and reviewed, and
/// the number of reviewed sites regardless of confirmation.
fn confirmed_sites(
    snap: &SheetSnapshot,
    brain_id: &str,
    segmentation_id: &str,
    child_rows: &[usize],
) -> Result<(Vec<MergeSite>, usize)> {
    let mut sites = Vec::new();
    let mut reviewed = 0usize;
    for &row in child_rows {
        let is_merge = is_set(snap, row, MERGE_CONFIRMATION_COLUMN)?;
        let is_reviewed = is_set(snap, row, REVIEWED_COLUMN)?;
        if is_merge && is_reviewed {
            let coords = snap
                .text_at(row, WORLD_COORDINATES_COLUMN)?
                .unwrap_or_default();
            sites.push(MergeSite {
                brain_id: brain_id.to_string(),
                segmentation_id: segmentation_id.to_string(),
                segment_id: snap.text_at(row, SEGMENTATION_ID_COLUMN)?,
                groundtruth_id: snap.text_at(row, GROUND_TRUTH_ID_COLUMN)?,
                xyz: parse_xyz(&coords)?,
            });
        }
        if is_reviewed {
            reviewed += 1;
        }
    }
    Ok((sites, reviewed))
}

/// Collect every confirmed, reviewed merge site in the sheet.
///
/// Samples without a confirmed site add nothing to the totals.
pub fn extract_merge_sites(snap: &SheetSnapshot) -> Result<MergeSiteReport> {
    let mut report = MergeSiteReport::default();

    for (parent, children) in snap.children_map() {
        let sample = snap.text_at(*parent, SAMPLE_COLUMN)?.unwrap_or_default();
        let (brain_id, segmentation_id) = split_sample(&sample)?;
        let (sites, reviewed) = confirmed_sites(snap, &brain_id, &segmentation_id, children)?;
        if sites.is_empty() {
            continue;
        }

        let stats = SampleStats {
            brain_id,
            segmentation_id,
            confirmed: sites.len(),
            reviewed,
        };
        tracing::info!(
            brain_id = %stats.brain_id,
            success_rate = stats.success_rate().unwrap_or(0.0),
            confirmed = stats.confirmed,
            reviewed = stats.reviewed,
            "merge site sample"
        );

        report.confirmed += stats.confirmed;
        report.reviewed += stats.reviewed;
        report.sites.extend(sites);
        report.samples.push(stats);
    }

    tracing::info!(
        success_rate = report.success_rate().unwrap_or(0.0),
        confirmed = report.confirmed,
        reviewed = report.reviewed,
        "merge sites extracted"
    );
    Ok(report)
}
