use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IssueTier {
    Completeness,
    Schema,
    Cleanliness,
    /// The file could not be read or parsed.
    Error,
}

impl IssueTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completeness => "COMPLETENESS",
            Self::Schema => "SCHEMA",
            Self::Cleanliness => "CLEANLINESS",
            Self::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub tier: IssueTier,
    pub message: String,
}

impl Issue {
    pub fn completeness(message: impl Into<String>) -> Self {
        Self {
            tier: IssueTier::Completeness,
            message: message.into(),
        }
    }

    pub fn schema(message: impl Into<String>) -> Self {
        Self {
            tier: IssueTier::Schema,
            message: message.into(),
        }
    }

    pub fn cleanliness(message: impl Into<String>) -> Self {
        Self {
            tier: IssueTier::Cleanliness,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.tier.as_str(), self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReportStatus {
    Pass,
    Fail,
    Error,
}

/// Verdict for one record file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueReport {
    pub file: String,
    pub status: ReportStatus,
    pub issue_count: usize,
    pub issues: Vec<Issue>,
}

impl IssueReport {
    /// PASS iff there are no issues.
    pub fn from_issues(file: impl Into<String>, issues: Vec<Issue>) -> Self {
        let status = if issues.is_empty() {
            ReportStatus::Pass
        } else {
            ReportStatus::Fail
        };
        Self {
            file: file.into(),
            status,
            issue_count: issues.len(),
            issues,
        }
    }

    pub fn error(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            status: ReportStatus::Error,
            issue_count: 1,
            issues: vec![Issue {
                tier: IssueTier::Error,
                message: message.into(),
            }],
        }
    }

    pub fn passed(&self) -> bool {
        self.status == ReportStatus::Pass
    }
}

/// Aggregate over a directory of records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub generated_at: DateTime<Utc>,
    pub total_files: usize,
    pub passed: usize,
    pub failed: usize,
    pub results: Vec<IssueReport>,
}

impl VerificationReport {
    pub fn new(results: Vec<IssueReport>) -> Self {
        let passed = results.iter().filter(|r| r.passed()).count();
        Self {
            generated_at: Utc::now(),
            total_files: results.len(),
            passed,
            failed: results.len() - passed,
            results,
        }
    }

    /// Console summary: header, failures with their issues, then passes.
    pub fn render_summary(&self) -> String {
        let rule = "=".repeat(50);
        let mut out = format!(
            "{rule}\n  Data Verification Report\n  {} files scanned: {} PASS, {} FAIL\n{rule}\n\n",
            self.total_files, self.passed, self.failed
        );
        for result in self.results.iter().filter(|r| !r.passed()) {
            out.push_str(&format!("FAIL {} ({} issues)\n", result.file, result.issue_count));
            for issue in &result.issues {
                out.push_str(&format!("   {issue}\n"));
            }
            out.push('\n');
        }
        for result in self.results.iter().filter(|r| r.passed()) {
            out.push_str(&format!("PASS {}\n", result.file));
        }
        out
    }
}
