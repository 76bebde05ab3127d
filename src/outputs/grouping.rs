//! Stored articles grouped by update date, printed to standard output.

use crate::store::{Collection, DocumentGroup, DocumentStore};
use std::fmt;
use tracing::{error, info, instrument};

const SEPARATOR: &str = "---------------------------------------------";

/// Group the `news` collection by `update_date` (ascending) and print it.
///
/// Failures are logged and swallowed; this report never aborts a run.
#[instrument(level = "info", skip_all)]
pub async fn print_by_update_date(store: &dyn DocumentStore) {
    match store.group_by(Collection::News, "update_date").await {
        Ok(groups) => {
            info!(groups = groups.len(), "Grouped articles by update date");
            print!("{}", render_groups(&groups));
        }
        Err(e) => error!(error = %e, "Error occurred during grouping"),
    }
}

/// Text form of the grouped report.
pub fn render_groups(groups: &[DocumentGroup]) -> String {
    GroupReport(groups).to_string()
}

struct GroupReport<'a>(&'a [DocumentGroup]);

impl fmt::Display for GroupReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No data grouped by update dates found.");
        }

        writeln!(f, "Data grouped by update dates:")?;
        writeln!(f, "{SEPARATOR}")?;
        for group in self.0 {
            writeln!(f, "Date: {}", group.key.as_deref().unwrap_or("unknown"))?;
            for doc in &group.documents {
                let header = doc.get("header").and_then(|v| v.as_str()).unwrap_or("");
                let url = doc.get("url").and_then(|v| v.as_str()).unwrap_or("");
                writeln!(f, "- {header} ({url})")?;
            }
            writeln!(f, "{SEPARATOR}")?;
        }
        Ok(())
    }
}
