//! Step definitions for cucumber tests
//!
//! Phrases follow the classic Web API step vocabulary, e.g.
//! `I send a GET request to "users/1"` or
//! `the response should contain json matching:`.

pub mod given;
pub mod then;
pub mod when;

use cucumber::gherkin::Step;

/// The docstring attached to a step.
pub(crate) fn docstring(step: &Step) -> anyhow::Result<&str> {
    step.docstring
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("Step '{}' requires a docstring", step.value))
}

/// Two-column data table rows as `(field, value)` pairs.
pub(crate) fn table_rows(step: &Step) -> anyhow::Result<Vec<(String, String)>> {
    let table = step
        .table
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("Step '{}' requires a data table", step.value))?;

    table
        .rows
        .iter()
        .map(|row| match row.as_slice() {
            [key, value] => Ok((key.clone(), value.clone())),
            _ => Err(anyhow::anyhow!(
                "Expected two columns per row, got {}",
                row.len()
            )),
        })
        .collect()
}
