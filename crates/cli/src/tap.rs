//! TAP v14 reporting for the conformance runner.
//!
//! Failures carry a YAML diagnostic block: a one-line `message` and an
//! optional multi-line `detail` (usually an expected/got listing).

use std::io::{self, Write};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Outcome {
    Pass,
    Fail {
        message: String,
        detail: Option<String>,
    },
}

#[derive(Debug)]
struct Case {
    name: String,
    outcome: Outcome,
}

/// Collected fixture outcomes, rendered once the suite has run.
#[derive(Debug, Default)]
pub struct TapReport {
    cases: Vec<Case>,
}

impl TapReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pass(&mut self, name: impl Into<String>) {
        self.cases.push(Case {
            name: name.into(),
            outcome: Outcome::Pass,
        });
    }

    pub fn fail(&mut self, name: impl Into<String>, message: impl Into<String>) {
        self.push_failure(name.into(), message.into(), None);
    }

    /// A failure whose `detail` is too long for the message line.
    pub fn fail_with_detail(
        &mut self,
        name: impl Into<String>,
        message: impl Into<String>,
        detail: impl Into<String>,
    ) {
        self.push_failure(name.into(), message.into(), Some(detail.into()));
    }

    fn push_failure(&mut self, name: String, message: String, detail: Option<String>) {
        self.cases.push(Case {
            name,
            outcome: Outcome::Fail { message, detail },
        });
    }

    pub fn failure_count(&self) -> usize {
        self.cases
            .iter()
            .filter(|c| c.outcome != Outcome::Pass)
            .count()
    }

    /// Write the report. With `failures_only`, passing cases are left out
    /// but keep their numbers, so the plan line still matches.
    pub fn write_to<W: Write>(&self, out: &mut W, failures_only: bool) -> io::Result<()> {
        writeln!(out, "TAP version 14")?;
        writeln!(out, "1..{}", self.cases.len())?;
        for (i, case) in self.cases.iter().enumerate() {
            match &case.outcome {
                Outcome::Pass => {
                    if !failures_only {
                        writeln!(out, "ok {} - {}", i + 1, case.name)?;
                    }
                }
                Outcome::Fail { message, detail } => {
                    writeln!(out, "not ok {} - {}", i + 1, case.name)?;
                    write_diagnostics(out, message, detail.as_deref())?;
                }
            }
        }
        let failed = self.failure_count();
        writeln!(out, "# tests {}", self.cases.len())?;
        writeln!(out, "# pass  {}", self.cases.len() - failed)?;
        writeln!(out, "# fail  {}", failed)?;
        out.flush()
    }
}

/// The indented `---` / `...` block that follows a `not ok` line.
fn write_diagnostics<W: Write>(out: &mut W, message: &str, detail: Option<&str>) -> io::Result<()> {
    writeln!(out, "  ---")?;
    // A JSON string literal is a valid YAML flow scalar.
    let quoted = serde_json::to_string(message).unwrap_or_else(|_| format!("{:?}", message));
    writeln!(out, "  message: {}", quoted)?;
    if let Some(detail) = detail {
        writeln!(out, "  detail: |")?;
        for line in detail.lines() {
            if line.is_empty() {
                writeln!(out)?;
            } else {
                writeln!(out, "    {}", line)?;
            }
        }
    }
    writeln!(out, "  ...")
}
