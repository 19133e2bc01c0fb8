use crate::models::tools::ToolKind;
use indexmap::IndexMap;
use std::time::Duration;

/// How a single external tool invocation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationStatus {
    Succeeded,
    /// Non-zero exit; `-1` when the process was terminated by a signal
    Failed { exit_code: i32 },
    TimedOut(Duration),
    /// The tool could not be run to completion (not installed, not executable, ...)
    Error(String),
}

impl InvocationStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

/// Result of one external tool invocation
#[derive(Debug, Clone)]
pub struct InvocationOutcome {
    pub tool: ToolKind,
    /// What the tool was run on: a source file or a list of catalogs
    pub target: String,
    pub status: InvocationStatus,
    pub duration: Duration,
}

/// Outcomes for one package, in execution order
#[derive(Debug, Clone, Default)]
pub struct PackageReport {
    pub outcomes: Vec<InvocationOutcome>,
    /// Generated UI modules whose imports were rewritten
    pub rewritten: usize,
}

impl PackageReport {
    pub fn record(&mut self, outcome: InvocationOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn failures(&self) -> impl Iterator<Item = &InvocationOutcome> {
        self.outcomes
            .iter()
            .filter(|outcome| !outcome.status.is_success())
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.status.is_success())
            .count()
    }
}

/// Aggregated result of a whole build run
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub packages: IndexMap<String, PackageReport>,
}

impl BuildReport {
    pub fn package_mut(&mut self, package: &str) -> &mut PackageReport {
        self.packages.entry(package.to_string()).or_default()
    }

    pub fn package(&self, package: &str) -> Option<&PackageReport> {
        self.packages.get(package)
    }

    pub fn outcomes(&self) -> impl Iterator<Item = &InvocationOutcome> {
        self.packages
            .values()
            .flat_map(|package| package.outcomes.iter())
    }

    pub fn failures(&self) -> impl Iterator<Item = &InvocationOutcome> {
        self.packages.values().flat_map(PackageReport::failures)
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    /// Process exit code: 0 only when every invocation succeeded
    pub fn exit_code(&self) -> i32 {
        if self.has_failures() { 1 } else { 0 }
    }

    /// Get a summary string of the run
    pub fn summary(&self) -> String {
        let total = self.outcomes().count();
        if total == 0 {
            return "Nothing to build".to_string();
        }

        let failed = self.failures().count();
        let rewritten: usize = self.packages.values().map(|p| p.rewritten).sum();

        let mut parts = vec![format!("{} of {} tool runs succeeded", total - failed, total)];
        if failed > 0 {
            parts.push(format!("{} failed", failed));
        }
        if rewritten > 0 {
            parts.push(format!("{} UI modules rewritten", rewritten));
        }
        parts.join(", ")
    }
}
