//! Per-dataset space usage for the usage page.
//!
//! The listing comes from an external command (by default `zfs list` in
//! scripted, parsable mode) and is parsed into rows.

use humansize::{format_size, BINARY};
use serde::Serialize;
use tokio::process::Command;

use crate::error::{PoolwatchError, Result};

/// Default listing command. The pool name is appended as the last argument.
pub const DEFAULT_USAGE_COMMAND: &str = "zfs list -H -p -o name,used,avail,refer,mountpoint -r";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetUsage {
    pub name: String,
    pub used: u64,
    pub avail: u64,
    pub refer: u64,
    pub mountpoint: String,
    pub used_human: String,
    pub avail_human: String,
    pub refer_human: String,
}

fn parse_bytes(field: &str, line_no: usize) -> Result<u64> {
    field.trim().parse().map_err(|_| {
        PoolwatchError::usage_parse(format!("line {}: {:?} is not a byte count", line_no, field))
    })
}

/// Parse tab-separated `name used avail refer mountpoint` lines.
///
/// Blank lines are skipped. Any other malformed line fails the whole parse.
pub fn parse_usage_listing(output: &str) -> Result<Vec<DatasetUsage>> {
    let mut rows = Vec::new();

    for (i, line) in output.lines().enumerate() {
        let line_no = i + 1;
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 5 {
            return Err(PoolwatchError::usage_parse(format!(
                "line {}: expected 5 fields, found {}",
                line_no,
                fields.len()
            )));
        }

        let used = parse_bytes(fields[1], line_no)?;
        let avail = parse_bytes(fields[2], line_no)?;
        let refer = parse_bytes(fields[3], line_no)?;

        rows.push(DatasetUsage {
            name: fields[0].to_string(),
            used,
            avail,
            refer,
            mountpoint: fields[4].to_string(),
            used_human: format_size(used, BINARY),
            avail_human: format_size(avail, BINARY),
            refer_human: format_size(refer, BINARY),
        });
    }

    Ok(rows)
}

/// Run the usage command for `pool` and return its stdout.
///
/// The command line is split on whitespace and executed directly, never
/// through a shell; the pool name is passed as a separate argument.
pub async fn run_usage_command(command_line: &str, pool: &str) -> Result<String> {
    let mut parts = command_line.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| PoolwatchError::usage_command("usage command is empty"))?;

    let output = Command::new(program)
        .args(parts)
        .arg(pool)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| PoolwatchError::usage_command(format!("{}: {}", program, e)))?;

    if !output.status.success() {
        return Err(PoolwatchError::usage_command(format!(
            "{} exited with {}: {}",
            program,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    String::from_utf8(output.stdout)
        .map_err(|_| PoolwatchError::usage_parse("command output is not valid UTF-8"))
}

/// Fetch and parse the usage listing of one pool.
pub async fn list_pool_usage(command_line: &str, pool: &str) -> Result<Vec<DatasetUsage>> {
    let output = run_usage_command(command_line, pool).await?;
    parse_usage_listing(&output)
}
