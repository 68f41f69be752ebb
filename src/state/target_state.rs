//! Target state definitions for tracking one target through a run
//!
//! A target waits in a retry state between failed attempts and ends in
//! exactly one terminal state.

use std::fmt;

/// Represents where a target is in the collection process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetState {
    // ===== Retry States =====
    /// Last attempt got HTTP 429; waiting out the backoff
    RateLimited,

    /// Last attempt failed for another reason; waiting to retry
    Failing,

    // ===== Terminal States =====
    /// Entries merged into the accumulator
    Merged,

    /// All attempts failed; nothing was recorded for this target
    Skipped,

    /// Already present in the accumulator; never fetched
    AlreadyCollected,
}

impl TargetState {
    /// Returns true if the target is done for this run
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Merged | Self::Skipped | Self::AlreadyCollected
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RateLimited => "rate_limited",
            Self::Failing => "failing",
            Self::Merged => "merged",
            Self::Skipped => "skipped",
            Self::AlreadyCollected => "already_collected",
        }
    }
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
