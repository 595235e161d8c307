//! Output formatting and persistence for group summaries.
//!
//! Supports a plain-text table, a JSON report, and CSV files (optionally gzip-compressed).

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::stats::FeatureStats;
use crate::summary::{GroupKey, GroupSummary};

/// One group of a [`SummaryReport`].
#[derive(Debug, Serialize)]
pub struct SummaryRow {
    pub key: GroupKey,
    #[serde(flatten)]
    pub stats: FeatureStats,
}

/// JSON document describing a [`GroupSummary`]. NaN statistics serialize as `null`.
#[derive(Debug, Serialize)]
pub struct SummaryReport {
    pub generated_at: DateTime<Utc>,
    pub partition_key: String,
    pub feature: String,
    pub groups: Vec<SummaryRow>,
}

impl SummaryReport {
    pub fn from_summary(summary: &GroupSummary) -> Self {
        SummaryReport {
            generated_at: Utc::now(),
            partition_key: summary.partition_key().to_string(),
            feature: summary.feature().to_string(),
            groups: summary
                .iter()
                .map(|(key, stats)| SummaryRow {
                    key: key.clone(),
                    stats: *stats,
                })
                .collect(),
        }
    }
}

/// Renders the summary as an aligned text table with one line per group.
pub fn render_table(summary: &GroupSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", summary.feature());
    let _ = writeln!(
        out,
        "{:<12} {:>12} {:>12} {:>12}",
        summary.partition_key(),
        "mean",
        "median",
        "std"
    );
    for (key, stats) in summary.iter() {
        let _ = writeln!(
            out,
            "{:<12} {:>12.6} {:>12.6} {:>12.6}",
            key.to_string(),
            stats.mean,
            stats.median,
            stats.std
        );
    }
    out
}

/// Logs the summary as a text table.
pub fn print_pretty(summary: &GroupSummary) {
    info!("\n{}", render_table(summary));
}

/// Logs the summary as a pretty-printed JSON [`SummaryReport`].
pub fn print_json(summary: &GroupSummary) -> Result<()> {
    let report = SummaryReport::from_summary(summary);
    info!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Writes the summary to `path` as CSV with columns `<partition key>,mean,median,std`.
///
/// With `gzip`, the CSV is compressed and `.gz` is appended to the file name.
/// Returns the path actually written.
pub fn write_csv(path: &Path, summary: &GroupSummary, gzip: bool) -> Result<PathBuf> {
    let path = if gzip {
        let mut name = path.as_os_str().to_owned();
        name.push(".gz");
        PathBuf::from(name)
    } else {
        path.to_path_buf()
    };
    debug!(path = %path.display(), gzip, groups = summary.len(), "Writing summary CSV");

    let file =
        File::create(&path).with_context(|| format!("failed to create '{}'", path.display()))?;

    if gzip {
        let encoder = write_rows(GzEncoder::new(file, Compression::default()), summary)?;
        encoder.finish()?;
    } else {
        write_rows(file, summary)?;
    }

    Ok(path)
}

fn write_rows<W: Write>(sink: W, summary: &GroupSummary) -> Result<W> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(sink);

    writer.write_record([summary.partition_key(), "mean", "median", "std"])?;
    for (key, stats) in summary.iter() {
        writer.write_record([
            key.to_string(),
            stats.mean.to_string(),
            stats.median.to_string(),
            stats.std.to_string(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| anyhow!("failed to flush CSV writer: {}", e.error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Dataset, Value};
    use crate::summary::summarize;
    use flate2::read::GzDecoder;
    use std::env;
    use std::fs;
    use std::io::Read;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(name)
    }

    fn sample_summary() -> GroupSummary {
        let dataset = Dataset::new([
            (
                "decade",
                vec![
                    Value::from(1970_i64),
                    Value::from(1960_i64),
                    Value::from(1960_i64),
                ],
            ),
            (
                "energy",
                vec![Value::from(0.8), Value::from(0.2), Value::from(0.4)],
            ),
        ])
        .unwrap();
        summarize(&dataset, "energy").unwrap()
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&sample_summary());
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&sample_summary()).unwrap();
    }

    #[test]
    fn test_render_table_has_row_per_group() {
        let table = render_table(&sample_summary());
        let lines: Vec<_> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("decade"));
        assert!(lines[2].starts_with("1960"));
        assert!(lines[3].starts_with("1970"));
    }

    #[test]
    fn test_report_serializes_nan_as_null() {
        let report = SummaryReport::from_summary(&sample_summary());
        let json: serde_json::Value = serde_json::to_value(&report).unwrap();

        assert_eq!(json["partition_key"], "decade");
        assert_eq!(json["groups"][0]["key"], 1960);
        assert_eq!(json["groups"][1]["count"], 1);
        assert_eq!(json["groups"][1]["mean"], 0.8);
        assert!(json["groups"][1].get("stats").is_none());
        assert!(json["groups"][1]["std"].is_null());
    }

    #[test]
    fn test_write_csv_header_and_rows() {
        let path = temp_path("decade_summary_test_plain.csv");
        let _ = fs::remove_file(&path);

        let written = write_csv(&path, &sample_summary(), false).unwrap();
        assert_eq!(written, path);

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "decade,mean,median,std");
        assert!(lines[1].starts_with("1960,"));
        assert_eq!(lines[2], "1970,0.8,0.8,NaN");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_csv_gzip() {
        let path = temp_path("decade_summary_test_gzip.csv");
        let written = write_csv(&path, &sample_summary(), true).unwrap();
        assert_eq!(written, temp_path("decade_summary_test_gzip.csv.gz"));

        let mut content = String::new();
        GzDecoder::new(File::open(&written).unwrap())
            .read_to_string(&mut content)
            .unwrap();
        assert!(content.starts_with("decade,mean,median,std\n"));
        assert_eq!(content.lines().count(), 3);

        fs::remove_file(&written).unwrap();
    }
}
