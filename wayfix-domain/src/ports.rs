use wayfix_types::correction::{CorrectionProposal, Selection};
use wayfix_types::osm::{DataSet, PrimitiveId, Relation, Way};

/// Read-only access to the surrounding data model.
///
/// wayfix-domain only queries through this trait so it can run against any store.
pub trait DataView {
    fn way(&self, id: i64) -> Option<&Way>;

    /// Relations that have `id` among their members.
    fn referrers(&self, id: PrimitiveId) -> Vec<&Relation>;
}

impl DataView for DataSet {
    fn way(&self, id: i64) -> Option<&Way> {
        self.ways.get(&id)
    }

    fn referrers(&self, id: PrimitiveId) -> Vec<&Relation> {
        DataSet::referrers(self, id)
    }
}

/// What the reviewer decided about a [`CorrectionProposal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewDecision {
    /// Apply the selected corrections.
    Apply(Selection),
    /// Go ahead without any correction.
    KeepUnchanged,
    /// Abort the whole operation.
    Cancel,
}

/// Presents proposed corrections and collects a decision.
pub trait CorrectionReviewer {
    fn review(&mut self, proposal: &CorrectionProposal) -> anyhow::Result<ReviewDecision>;
}

/// Accepts every proposed correction.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl CorrectionReviewer for AcceptAll {
    fn review(&mut self, proposal: &CorrectionProposal) -> anyhow::Result<ReviewDecision> {
        Ok(ReviewDecision::Apply(Selection::all(proposal)))
    }
}

/// Proceeds without corrections.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepUnchanged;

impl CorrectionReviewer for KeepUnchanged {
    fn review(&mut self, _proposal: &CorrectionProposal) -> anyhow::Result<ReviewDecision> {
        Ok(ReviewDecision::KeepUnchanged)
    }
}

/// Cancels every proposal.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectAll;

impl CorrectionReviewer for RejectAll {
    fn review(&mut self, _proposal: &CorrectionProposal) -> anyhow::Result<ReviewDecision> {
        Ok(ReviewDecision::Cancel)
    }
}
