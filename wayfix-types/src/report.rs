use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Machine-readable summary of one wayfix run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WayfixReport {
    pub schema: String,
    pub tool: ToolInfo,
    pub run: RunInfo,
    pub verdict: Verdict,

    #[serde(default)]
    pub ways: Vec<WayOutcome>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changeset_id: Option<String>,
}

impl WayfixReport {
    pub fn new(tool: ToolInfo, started_at: DateTime<Utc>) -> Self {
        Self {
            schema: crate::schema::WAYFIX_REPORT_V1.to_string(),
            tool,
            run: RunInfo {
                started_at,
                ended_at: None,
            },
            verdict: Verdict::default(),
            ways: vec![],
            changeset_id: None,
        }
    }

    /// Close the run and derive the verdict from the collected outcomes.
    pub fn finish(&mut self, ended_at: DateTime<Utc>) {
        self.run.ended_at = Some(ended_at);
        let tag_corrections = self.ways.iter().map(|w| w.tag_corrections).sum();
        let role_corrections = self.ways.iter().map(|w| w.role_corrections).sum();
        let status = if self.ways.iter().any(|w| w.status == WayStatus::Cancelled) {
            VerdictStatus::Cancelled
        } else if tag_corrections + role_corrections > 0 {
            VerdictStatus::Corrected
        } else {
            VerdictStatus::Clean
        };
        self.verdict = Verdict {
            status,
            counts: Counts {
                ways: self.ways.len() as u64,
                tag_corrections,
                role_corrections,
            },
        };
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunInfo {
    pub started_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub status: VerdictStatus,
    pub counts: Counts,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
    /// Nothing needed correcting.
    #[default]
    Clean,
    Corrected,
    Cancelled,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub ways: u64,
    pub tag_corrections: u64,
    pub role_corrections: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WayOutcome {
    pub way: i64,
    pub status: WayStatus,
    pub tag_corrections: u64,
    pub role_corrections: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WayStatus {
    /// Reversal needs no tag or role edits.
    Reversible,
    Corrected,
    /// Reviewer chose to reverse without corrections.
    KeptUnchanged,
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool() -> ToolInfo {
        ToolInfo {
            name: "wayfix".to_string(),
            version: None,
        }
    }

    #[test]
    fn finish_counts_and_classifies() {
        let mut report = WayfixReport::new(tool(), Utc::now());
        report.ways.push(WayOutcome {
            way: 1,
            status: WayStatus::Corrected,
            tag_corrections: 2,
            role_corrections: 1,
        });
        report.ways.push(WayOutcome {
            way: 2,
            status: WayStatus::Reversible,
            tag_corrections: 0,
            role_corrections: 0,
        });
        report.finish(Utc::now());

        assert_eq!(report.verdict.status, VerdictStatus::Corrected);
        assert_eq!(report.verdict.counts.ways, 2);
        assert_eq!(report.verdict.counts.tag_corrections, 2);
        assert_eq!(report.verdict.counts.role_corrections, 1);
        assert!(report.run.ended_at.is_some());
    }

    #[test]
    fn cancellation_dominates() {
        let mut report = WayfixReport::new(tool(), Utc::now());
        report.ways.push(WayOutcome {
            way: 1,
            status: WayStatus::Cancelled,
            tag_corrections: 1,
            role_corrections: 0,
        });
        report.finish(Utc::now());
        assert_eq!(report.verdict.status, VerdictStatus::Cancelled);
    }
}
