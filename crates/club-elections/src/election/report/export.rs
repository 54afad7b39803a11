use super::summary::EngagementReport;

/// Error raised while rendering the committee CSV.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("csv buffer could not be flushed: {0}")]
    Flush(String),
    #[error("csv output is not valid utf-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Renders the engagement report as CSV.
///
/// Global metrics come first as `Metric,Value` rows, followed by one row per position with its
/// qualified candidates joined by `; `.
pub fn engagement_csv(report: &EngagementReport) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    writer.write_record(["Metric", "Value"])?;
    let metrics = [
        ("Total Members", report.total_members.to_string()),
        ("Total Nominations", report.total_nominations.to_string()),
        ("Unique Nominators", report.distinct_nominators.to_string()),
        ("Participation Rate", format!("{}%", report.participation_rate)),
        ("Full Slate Nominators", report.full_slate.to_string()),
        ("Partial Slate Nominators", report.partial_slate.to_string()),
        ("Duplicate Nominators", report.duplicate.to_string()),
        ("Qualified Candidates", report.qualified_candidates.to_string()),
        ("Pending Reviews", report.pending_reviews.to_string()),
        ("Skipped Records", report.skipped_records.to_string()),
    ];
    for (metric, value) in metrics {
        writer.write_record([metric, value.as_str()])?;
    }

    writer.write_record([
        "Position",
        "Total Nominations",
        "Approved",
        "Qualified Candidates",
    ])?;
    for position in &report.positions {
        writer.write_record([
            position.title.clone(),
            position.total_nominations.to_string(),
            position.approved.to_string(),
            position.qualified_candidates.join("; "),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Flush(err.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}
