//! `loadrig history` command implementation.

use anyhow::{Context, Result};

use loadrig::config::AppConfig;
use loadrig::loadtest::model::TestResult;
use loadrig::storage::{FileResultStore, ResultStore};

/// Execute the `history` command.
pub fn execute(config: &AppConfig, script_id: Option<&str>, json: bool) -> Result<()> {
    let store = FileResultStore::open(&config.storage.results_dir)
        .context("Failed to open result store")?;
    let results = match script_id {
        Some(id) => store.find_by_script_id(id)?,
        None => store.find_all()?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else if results.is_empty() {
        eprintln!("No stored results in {}", store.dir().display());
    } else {
        print!("{}", render_table(&results));
    }
    Ok(())
}

fn render_table(results: &[TestResult]) -> String {
    let mut out = format!(
        "{:<16} {:<38} {:>8} {:>8} {:>8} {:>8} {:>10}\n",
        "TEST ID", "SCRIPT", "REQS", "FAILED", "AVG ms", "P95 ms", "RPS"
    );
    for r in results {
        out.push_str(&format!(
            "{:<16} {:<38} {:>8} {:>8} {:>8} {:>8} {:>10.1}\n",
            r.test_id,
            r.script_id,
            r.total_requests,
            r.failure,
            r.avg_latency_ms,
            r.p95_latency_ms,
            r.rps
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_render_table() {
        let started_at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let result = TestResult {
            test_id: loadrig::loadtest::model::test_id_for(&started_at),
            script_id: "s1".to_string(),
            total_requests: 120,
            success: 118,
            failure: 2,
            avg_latency_ms: 42,
            p90_latency_ms: 60,
            p95_latency_ms: 75,
            p99_latency_ms: 90,
            rps: 12.0,
            iterations: 60,
            started_at,
            errors: Default::default(),
        };

        let table = render_table(&[result]);
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("TEST ID"));
        assert!(lines[1].starts_with("20260102030405"));
        assert!(lines[1].contains(" 120 "));
        assert!(lines[1].ends_with("12.0"));
    }
}
