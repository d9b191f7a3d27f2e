//! `adlytics export` output: rollup buckets as CSV.

use std::io;

use adlytics_aggregate::Bucket;

/// Write buckets as CSV rows. `Bucket` flattens its metrics for JSON,
/// which the csv crate's serde support rejects, so rows are written by
/// hand.
pub fn write_buckets_csv<W: io::Write>(buckets: &[Bucket], writer: W) -> anyhow::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record([
        "group_key",
        "group_label",
        "time_key",
        "impressions",
        "clicks",
        "transactions",
        "revenue",
        "spend",
        "ctr",
        "roas",
    ])?;
    for bucket in buckets {
        csv_writer.write_record([
            bucket.group_key.clone(),
            bucket.group_label.clone(),
            bucket.time.label(),
            bucket.metrics.impressions.to_string(),
            bucket.metrics.clicks.to_string(),
            bucket.metrics.transactions.to_string(),
            bucket.metrics.revenue.to_string(),
            bucket.metrics.spend.to_string(),
            bucket.ctr.to_string(),
            bucket.roas.to_string(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}
