//! Inspect command implementation.

use serde::Serialize;
use std::path::Path;
use xidlog_core::{file, TransactionManager, Xid};

/// Ledger inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Ledger path.
    pub path: String,
    /// File size in bytes.
    pub file_size: u64,
    /// Header counter.
    pub counter: u64,
    /// Number of active transactions.
    pub active: u64,
    /// Number of committed transactions.
    pub committed: u64,
    /// Number of aborted transactions.
    pub aborted: u64,
    /// Number of unreadable status bytes.
    pub invalid: u64,
    /// Per-transaction statuses (if requested).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transactions: Option<Vec<TransactionEntry>>,
}

/// Status of a single transaction.
#[derive(Debug, Serialize)]
pub struct TransactionEntry {
    /// Transaction ID.
    pub xid: u64,
    /// Status name, or "invalid".
    pub status: String,
}

/// Runs the inspect command.
pub fn run(path: &Path, list: bool, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = file::resolve_path(path);
    let tm = file::open(&path, &super::read_only())?;

    let stats = tm.scan()?;
    let mut result = InspectResult {
        path: path.display().to_string(),
        file_size: std::fs::metadata(&path)?.len(),
        counter: stats.counter,
        active: stats.active,
        committed: stats.committed,
        aborted: stats.aborted,
        invalid: stats.invalid,
        transactions: None,
    };

    if list {
        result.transactions = Some(list_transactions(&tm));
    }
    tm.close()?;

    // Output
    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

fn list_transactions(tm: &TransactionManager) -> Vec<TransactionEntry> {
    (1..=tm.last_xid().as_u64())
        .map(|n| {
            let status = match tm.status(Xid::new(n)) {
                Ok(Some(status)) => status.to_string(),
                _ => "invalid".to_string(),
            };
            TransactionEntry { xid: n, status }
        })
        .collect()
}

fn print_text_output(result: &InspectResult) {
    println!("Ledger: {}", result.path);
    println!("File size: {} bytes", result.file_size);
    println!("Transactions allocated: {}", result.counter);
    println!("  active:    {}", result.active);
    println!("  committed: {}", result.committed);
    println!("  aborted:   {}", result.aborted);
    if result.invalid > 0 {
        println!("  invalid:   {}", result.invalid);
    }

    if let Some(transactions) = &result.transactions {
        println!();
        for entry in transactions {
            println!("{:>10}  {}", entry.xid, entry.status);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use xidlog_core::Config;

    #[test]
    fn lists_every_transaction() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tm.xid");
        let tm = file::create(&path, &Config::default()).unwrap();
        let first = tm.begin().unwrap();
        tm.begin().unwrap();
        tm.commit(first).unwrap();

        let entries = list_transactions(&tm);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].status, "committed");
        assert_eq!(entries[1].status, "active");
        tm.close().unwrap();
    }

    #[test]
    fn json_omits_unrequested_list() {
        let result = InspectResult {
            path: "tm.xid".to_string(),
            file_size: 8,
            counter: 0,
            active: 0,
            committed: 0,
            aborted: 0,
            invalid: 0,
            transactions: None,
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["counter"], 0);
        assert!(json.get("transactions").is_none());
    }
}
