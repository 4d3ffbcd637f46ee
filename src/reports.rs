//! Payment-history reporting.
//!
//! Renders the role-scoped succeeded-payment history as a terminal
//! table and exports it as RFC-4180 CSV. Fields containing commas,
//! quotes, or newlines are quoted; quotes are doubled.

use crate::api::types::PaymentRecord;
use anyhow::{Context, Result};
use std::path::Path;

/// Column header of the CSV export.
pub const CSV_HEADER: &str = "id,event,payer,email,amount,currency,paid_at,status";

/// Render the full CSV document, header included.
pub fn to_csv(records: &[PaymentRecord]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for record in records {
        let row = [
            csv_field(&record.id),
            csv_field(&record.event_title),
            csv_field(&record.payer_name),
            csv_field(&record.payer_email),
            format!("{:.2}", record.amount),
            csv_field(&record.currency),
            csv_field(&record.paid_at.to_rfc3339()),
            csv_field(&record.status),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

/// Write the CSV export to a file.
pub fn write_csv(records: &[PaymentRecord], path: &Path) -> Result<()> {
    std::fs::write(path, to_csv(records))
        .with_context(|| format!("failed to write {}", path.display()))
}

/// Quote one CSV field per RFC 4180.
fn csv_field(raw: &str) -> String {
    if raw.contains(',') || raw.contains('"') || raw.contains('\n') || raw.contains('\r') {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

/// Simple aligned table for terminal display.
pub fn render_table(records: &[PaymentRecord]) -> String {
    if records.is_empty() {
        return "no succeeded payments".to_string();
    }

    let mut out = format!(
        "{:<24} {:<28} {:<20} {:>10} {:<8} {:<12}\n",
        "EVENT", "PAYER", "PAID AT", "AMOUNT", "CURRENCY", "STATUS"
    );
    for record in records {
        out.push_str(&format!(
            "{:<24} {:<28} {:<20} {:>10.2} {:<8} {:<12}\n",
            truncate(&record.event_title, 24),
            truncate(&record.payer_name, 28),
            record.paid_at.format("%Y-%m-%d %H:%M"),
            record.amount,
            record.currency,
            record.status,
        ));
    }
    out
}

fn truncate(raw: &str, max: usize) -> String {
    if raw.chars().count() <= max {
        raw.to_string()
    } else {
        let kept: String = raw.chars().take(max.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}
