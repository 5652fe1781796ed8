//! Plain-text rendering of the session for the terminal.

use std::fmt::Write as _;

use serde_json::Value;
use urbansoccer_core::campaign::{
    CampaignSession, LaunchPlan, final_outcome, plan_launch, progress_percentage,
};
use urbansoccer_core::turn::{ActionCard, GameResult};
use urbansoccer_session::{NarrationEntry, SessionPhase, SessionView};

/// Glyph shown for cards without an icon of their own.
pub const DEFAULT_CARD_GLYPH: &str = "*";

fn card_glyph(card: &ActionCard) -> &str {
    if let Some(icon) = card.icon.as_deref().filter(|i| !i.trim().is_empty()) {
        return icon;
    }
    match card.action_id.as_str() {
        "tocar_curto" => "->",
        "drible_rapido" => ">>",
        "chutar_area" => "(o)",
        "passe_longo" => "-/",
        "defesa" => "[#]",
        "correr" => "=>",
        _ => DEFAULT_CARD_GLYPH,
    }
}

fn metric(view: &SessionView, key: &str) -> Option<u64> {
    view.turn.metrics.get(key).and_then(Value::as_u64)
}

/// Renders the current turn: header, narration, cards and prompt hints.
#[must_use]
pub fn render_view(view: &SessionView) -> String {
    let mut out = String::new();
    let name = view.campaign_name.as_deref().unwrap_or("Campaign");

    let _ = write!(out, "== {name}");
    if let (Some(score), Some(opponent)) = (metric(view, "score"), metric(view, "opponentScore")) {
        let _ = write!(out, "  {score} x {opponent}");
    }
    if let Some(turns) = view.turn.elapsed_turns() {
        let _ = write!(out, "  turn {turns}");
    }
    out.push('\n');

    if view.healed {
        out.push_str("(saved game was unusable; a new match was started)\n");
    }

    match view.phase {
        SessionPhase::Loading => out.push_str("Loading...\n"),
        SessionPhase::Submitting => out.push_str("Playing your card...\n"),
        SessionPhase::LoadError => {
            let error = view.last_error.as_deref().unwrap_or("The game could not be loaded.");
            let _ = writeln!(out, "{error}");
        }
        SessionPhase::Idle => out.push_str("No game loaded.\n"),
        SessionPhase::AwaitingAction | SessionPhase::GameOver => {
            let _ = writeln!(out, "\n{}\n", view.turn.narration.trim());
            if let Some(error) = &view.last_error {
                let _ = writeln!(out, "! {error}");
            }
            if let Some(label) = view.result_label {
                let _ = writeln!(out, "*** {label} ***");
            }
            if !view.accepts_selection() {
                return out;
            }
            for (index, card) in view.turn.available_actions.iter().enumerate() {
                let armed = view.armed_action.as_deref() == Some(card.action_id.as_str());
                let marker = if armed { '>' } else { ' ' };
                let glyph = card_glyph(card);
                let _ = write!(out, "{marker} {}. {glyph} {}", index + 1, card.label);
                if let Some(description) = &card.description {
                    let _ = write!(out, " - {description}");
                }
                out.push('\n');
            }
            if view.armed_action.is_some() {
                out.push_str("(select the card again or 'c' to play it, 'x' to cancel)\n");
            }
        }
    }
    out
}

/// Renders the line announcing how the selected campaign is launched.
///
/// Finished campaigns also show their final score and outcome.
#[must_use]
pub fn render_launch(session: &CampaignSession) -> String {
    let plan = plan_launch(session);
    let progress = &session.progress;
    let mut out = format!(
        "{} {} ({}% played)\n",
        plan.label(),
        session.display_name(),
        progress_percentage(progress)
    );
    if plan == LaunchPlan::Review {
        let _ = writeln!(
            out,
            "Final score {} x {}: {}",
            progress.score,
            progress.opponent_score,
            GameResult::label(Some(final_outcome(progress)))
        );
    }
    out
}

/// Renders the narration history, oldest first.
#[must_use]
pub fn render_history(history: &[NarrationEntry]) -> String {
    if history.is_empty() {
        return "No narration yet.\n".to_owned();
    }
    let mut out = String::new();
    for entry in history {
        let _ = writeln!(
            out,
            "[{}] #{} {}",
            entry.recorded_at.format("%H:%M:%S"),
            entry.turn_sequence,
            entry.text.trim()
        );
    }
    out
}
