// Email validation command

use std::io::Write;

use anyhow::Result;
use itemflow_core::is_valid_email;
use serde::Serialize;

use crate::output::OutputFormat;

#[derive(Debug, Serialize)]
struct EmailCheck<'a> {
    address: &'a str,
    valid: bool,
}

/// Print the verdict and return it so the caller can set the exit code
pub fn run(address: &str, output: OutputFormat) -> Result<bool> {
    let check = EmailCheck {
        address,
        valid: is_valid_email(address),
    };

    output.emit(&check, |out, check| {
        let verdict = if check.valid { "valid" } else { "invalid" };
        writeln!(out, "{}: {}", check.address, verdict)
    })?;

    Ok(check.valid)
}
