//! Campaign sessions and the start-versus-resume decision.
//!
//! [`has_real_progress`] is the single owner of the "does this campaign have
//! turns behind it" heuristic. Both the campaign list ([`plan_launch`]) and
//! the turn engine call it; nothing else may re-derive the rule.

use serde::{Deserialize, Serialize};

use crate::turn::GameResult;

/// Number of turns a campaign is expected to last, used for progress display.
pub const TURNS_PER_CAMPAIGN: u32 = 10;

/// Lifecycle status of a campaign as reported by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    /// Created but never played.
    #[default]
    NotStarted,
    /// Marked active; may or may not have turns yet.
    Active,
    /// Left mid-game with progress kept.
    Paused,
    /// Reached a terminal result.
    Completed,
    /// Discarded by the player.
    Abandoned,
    /// A status this client does not know about.
    #[serde(other)]
    Unknown,
}

impl CampaignStatus {
    /// Whether the campaign can no longer be played.
    #[must_use]
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Completed | Self::Abandoned)
    }
}

/// Progress counters mirrored from the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CampaignProgress {
    /// Current level.
    #[serde(alias = "currentLevel")]
    pub level: u32,
    /// Player team score.
    pub score: u32,
    /// Opponent team score.
    #[serde(alias = "opponent_score")]
    pub opponent_score: u32,
    /// Turns played so far. The ground truth for "has this campaign started".
    #[serde(alias = "time", alias = "elapsed_turns")]
    pub elapsed_turns: u32,
    /// Current mission label.
    #[serde(alias = "current_mission")]
    pub current_mission: Option<String>,
    /// Opaque context tag supplied by the game server.
    #[serde(alias = "game_context")]
    pub game_context: Option<serde_json::Value>,
}

/// One played campaign, as cached by the campaign-selection flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignSession {
    /// Opaque stable identifier.
    #[serde(alias = "_id", default)]
    pub id: String,
    /// Display label.
    #[serde(alias = "campaignName", default)]
    pub name: String,
    /// Backend lifecycle status.
    #[serde(default)]
    pub status: CampaignStatus,
    /// Progress counters.
    #[serde(default)]
    pub progress: CampaignProgress,
    /// When the campaign was last played, if ever.
    #[serde(alias = "lastPlayedDate", default)]
    pub last_played_at: Option<String>,
}

impl CampaignSession {
    /// Creates a fresh, never-played campaign.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: CampaignStatus::NotStarted,
            progress: CampaignProgress::default(),
            last_played_at: None,
        }
    }

    /// Returns the identifier, or `None` if it is blank.
    #[must_use]
    pub fn campaign_id(&self) -> Option<&str> {
        let id = self.id.trim();
        (!id.is_empty()).then_some(id)
    }

    /// Display name, falling back to a generic label.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            "Campaign"
        } else {
            &self.name
        }
    }
}

/// Whether the campaign has turns behind it and must be resumed rather than
/// started.
///
/// A campaign can be marked `active` the instant it is created, so the status
/// alone is not a resume signal; `elapsed_turns` is.
#[must_use]
pub fn has_real_progress(session: &CampaignSession) -> bool {
    session.progress.elapsed_turns > 0
        || session.status.is_finished()
        || session
            .last_played_at
            .as_deref()
            .is_some_and(|at| !at.trim().is_empty())
}

/// What the campaign list should do when the player picks a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchPlan {
    /// Begin a new game.
    Start,
    /// Continue a game in progress.
    Resume,
    /// Show the summary of a finished campaign.
    Review,
}

impl LaunchPlan {
    /// Button label for this plan.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::Resume => "Continue",
            Self::Review => "Review",
        }
    }
}

/// Decides how the campaign list launches `session`.
#[must_use]
pub fn plan_launch(session: &CampaignSession) -> LaunchPlan {
    if session.status.is_finished() {
        LaunchPlan::Review
    } else if has_real_progress(session) {
        LaunchPlan::Resume
    } else {
        LaunchPlan::Start
    }
}

/// Percentage of the expected campaign length already played, capped at 100.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn progress_percentage(progress: &CampaignProgress) -> u8 {
    if progress.elapsed_turns == 0 {
        return 0;
    }
    let pct = (f64::from(progress.elapsed_turns) / f64::from(TURNS_PER_CAMPAIGN) * 100.0).round();
    pct.min(100.0) as u8
}

/// Outcome of a finished campaign from its final score line.
#[must_use]
pub fn final_outcome(progress: &CampaignProgress) -> GameResult {
    match progress.score.cmp(&progress.opponent_score) {
        std::cmp::Ordering::Greater => GameResult::Win,
        std::cmp::Ordering::Less => GameResult::Lose,
        std::cmp::Ordering::Equal => GameResult::Draw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with(status: CampaignStatus, elapsed_turns: u32) -> CampaignSession {
        let mut session = CampaignSession::new("c1", "Derby Day");
        session.status = status;
        session.progress.elapsed_turns = elapsed_turns;
        session
    }

    #[test]
    fn test_active_session_without_turns_has_no_real_progress() {
        let session = session_with(CampaignStatus::Active, 0);
        assert!(!has_real_progress(&session));
        assert_eq!(plan_launch(&session), LaunchPlan::Start);
    }

    #[test]
    fn test_elapsed_turns_mark_real_progress() {
        let session = session_with(CampaignStatus::Active, 3);
        assert!(has_real_progress(&session));
        assert_eq!(plan_launch(&session), LaunchPlan::Resume);
    }

    #[test]
    fn test_last_played_marks_real_progress() {
        let mut session = session_with(CampaignStatus::Paused, 0);
        session.last_played_at = Some("2026-01-15T10:00:00Z".into());
        assert!(has_real_progress(&session));
    }

    #[test]
    fn test_blank_last_played_is_ignored() {
        let mut session = session_with(CampaignStatus::NotStarted, 0);
        session.last_played_at = Some(String::new());
        assert!(!has_real_progress(&session));
    }

    #[test]
    fn test_finished_sessions_are_reviewed() {
        for status in [CampaignStatus::Completed, CampaignStatus::Abandoned] {
            let session = session_with(status, 0);
            assert!(has_real_progress(&session));
            assert_eq!(plan_launch(&session), LaunchPlan::Review);
            assert_eq!(plan_launch(&session).label(), "Review");
        }
    }

    #[test]
    fn test_deserializes_backend_campaign_shape() {
        // Arrange
        let json = serde_json::json!({
            "_id": "66a1f",
            "campaignName": "Rooftop League",
            "status": "active",
            "progress": { "time": 4, "score": 2, "opponent_score": 1 },
            "lastPlayedDate": "2026-01-15T10:00:00Z",
            "createdAt": "2026-01-10T08:00:00Z"
        });

        // Act
        let session: CampaignSession = serde_json::from_value(json).unwrap();

        // Assert
        assert_eq!(session.campaign_id(), Some("66a1f"));
        assert_eq!(session.display_name(), "Rooftop League");
        assert_eq!(session.status, CampaignStatus::Active);
        assert_eq!(session.progress.elapsed_turns, 4);
        assert_eq!(session.progress.opponent_score, 1);
        assert_eq!(session.last_played_at.as_deref(), Some("2026-01-15T10:00:00Z"));
    }

    #[test]
    fn test_unknown_status_does_not_fail_deserialization() {
        let json = serde_json::json!({ "id": "c9", "status": "archived" });
        let session: CampaignSession = serde_json::from_value(json).unwrap();
        assert_eq!(session.status, CampaignStatus::Unknown);
        assert!(!has_real_progress(&session));
    }

    #[test]
    fn test_blank_id_is_reported_as_missing() {
        let session = CampaignSession::new("  ", "");
        assert_eq!(session.campaign_id(), None);
        assert_eq!(session.display_name(), "Campaign");
    }

    #[test]
    fn test_progress_percentage_is_capped() {
        let mut progress = CampaignProgress::default();
        assert_eq!(progress_percentage(&progress), 0);
        progress.elapsed_turns = 4;
        assert_eq!(progress_percentage(&progress), 40);
        progress.elapsed_turns = 14;
        assert_eq!(progress_percentage(&progress), 100);
    }

    #[test]
    fn test_final_outcome_compares_scores() {
        let mut progress = CampaignProgress {
            score: 3,
            opponent_score: 1,
            ..CampaignProgress::default()
        };
        assert_eq!(final_outcome(&progress), GameResult::Win);
        progress.opponent_score = 3;
        assert_eq!(final_outcome(&progress), GameResult::Draw);
        progress.opponent_score = 5;
        assert_eq!(final_outcome(&progress), GameResult::Lose);
    }
}
