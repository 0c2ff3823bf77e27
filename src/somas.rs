use crate::config::Config;
use crate::coords::{parse_xyz, Xyz};
use crate::error::{Error, Result};
use crate::path_utils::{join_key, last_segment};
use crate::storage::{self, ObjectStore};
use chrono::NaiveDate;

const RESULTS_PREFIX: &str = "results_";
const XYZ_COLUMN: &str = "xyz";

/// Name of the newest `results_<date>` directory among `prefixes`.
///
/// Each entry is a full listing prefix ("ns/id/results_20240615/"); dates
/// compare as strings, so they must be zero-padded and ISO-ordered.
pub fn find_most_recent_dirname<I, P>(prefixes: I) -> Option<String>
where
    I: IntoIterator<Item = P>,
    P: AsRef<str>,
{
    prefixes
        .into_iter()
        .map(|p| {
            let dirname = last_segment(p.as_ref());
            dirname.replace(RESULTS_PREFIX, "")
        })
        .max()
        .map(|date| format!("{RESULTS_PREFIX}{date}"))
}

/// Calendar date encoded in a results directory name, if it parses.
pub fn results_date(dirname: &str) -> Option<NaiveDate> {
    let raw = dirname.strip_prefix(RESULTS_PREFIX)?;
    ["%Y%m%d", "%Y-%m-%d", "%Y_%m_%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

pub struct SomaLoader<S> {
    store: S,
    cfg: Config,
}

impl<S: ObjectStore> SomaLoader<S> {
    pub fn new(store: S, cfg: Config) -> Self {
        Self { store, cfg }
    }

    /// Soma coordinates from the newest detection run for `brain_id`.
    ///
    /// Returns `Ok(None)` when no run exists for the brain.
    pub fn load_soma_locations(&self, brain_id: &str) -> Result<Option<Vec<Xyz>>> {
        let bucket = &self.cfg.soma_bucket;
        let prefix = join_key(&self.cfg.soma_namespace, brain_id);
        // One results_<date>/ directory per detection run
        let runs = storage::list_prefixes(&self.store, bucket, &prefix)?;

        let Some(dirname) = find_most_recent_dirname(&runs) else {
            tracing::info!(brain_id, "no soma detection results");
            return Ok(None);
        };
        tracing::info!(
            brain_id,
            dirname = %dirname,
            date = ?results_date(&dirname),
            runs = runs.len(),
            "using most recent soma results"
        );

        // {namespace}/{brain_id}/{dirname}/somas-{brain_id}.csv
        let key = join_key(&join_key(&prefix, &dirname), &format!("somas-{brain_id}.csv"));
        let bytes = self.store.read_object(bucket, &key)?;
        let somas = parse_xyz_column(&bytes, &format!("s3://{bucket}/{key}"))?;
        tracing::debug!(brain_id, count = somas.len(), "soma locations loaded");
        Ok(Some(somas))
    }
}

fn parse_xyz_column(bytes: &[u8], source: &str) -> Result<Vec<Xyz>> {
    let mut reader = csv::Reader::from_reader(bytes);
    let col = reader
        .headers()?
        .iter()
        .position(|h| h.trim() == XYZ_COLUMN)
        .ok_or_else(|| Error::MissingCsvColumn {
            column: XYZ_COLUMN.to_string(),
            path: source.to_string(),
        })?;

    // Cells hold literal "(x, y, z)" tuples
    let mut out = Vec::new();
    for record in reader.records() {
        let record = record?;
        let cell = record.get(col).unwrap_or_default();
        out.push(parse_xyz(cell)?);
    }
    Ok(out)
}
