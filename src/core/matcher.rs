use crate::core::scoring::count_coincidences;
use crate::models::Report;

/// Minimum coincidences for a found report to count as a probable match
pub const DEFAULT_MATCH_THRESHOLD: u8 = 3;

/// Result of the matching process
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub matches: Vec<Report>,
    pub total_candidates: usize,
}

/// Scores found-pet reports against a user's loss reports
///
/// A candidate is a probable match when at least one loss report, on its own,
/// shares `threshold` or more attributes with it. Tallies are never summed
/// across loss reports.
#[derive(Debug, Clone, Copy)]
pub struct Matcher {
    threshold: u8,
}

impl Matcher {
    pub fn new(threshold: u8) -> Self {
        Self { threshold }
    }

    pub fn with_default_threshold() -> Self {
        Self {
            threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Whether any single loss report reaches the threshold against `candidate`
    ///
    /// Stops at the first qualifying loss report.
    #[inline]
    pub fn is_match(&self, losses: &[Report], candidate: &Report) -> bool {
        losses
            .iter()
            .any(|loss| count_coincidences(loss, candidate) >= self.threshold)
    }

    /// Find the found candidates that probably match one of the loss reports
    ///
    /// # Arguments
    /// * `losses` - The requesting user's loss reports
    /// * `candidates` - Found reports from other users, own reports already excluded
    ///
    /// # Returns
    /// MatchResult with the matching candidates in input order, each at most once
    pub fn find_matches(&self, losses: &[Report], candidates: &[Report]) -> MatchResult {
        let total_candidates = candidates.len();

        if losses.is_empty() {
            return MatchResult {
                matches: Vec::new(),
                total_candidates,
            };
        }

        let matches = candidates
            .iter()
            .filter(|candidate| self.is_match(losses, candidate))
            .cloned()
            .collect();

        MatchResult {
            matches,
            total_candidates,
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_threshold()
    }
}

/// Find probable matches with the default threshold
pub fn find_matches(losses: &[Report], candidates: &[Report]) -> Vec<Report> {
    Matcher::with_default_threshold()
        .find_matches(losses, candidates)
        .matches
}
