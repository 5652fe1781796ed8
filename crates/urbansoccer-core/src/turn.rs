//! Turn payloads and the engine's working turn state.

use serde::{Deserialize, Deserializer, Serialize};

/// Snapshot of server-side game metrics. Opaque to the engine.
pub type Metrics = serde_json::Map<String, serde_json::Value>;

/// A playable action offered for the current turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionCard {
    /// Identifier submitted back to the server when the card is played.
    pub action_id: String,
    /// Short display label.
    #[serde(default)]
    pub label: String,
    /// Optional longer description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional icon hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl ActionCard {
    /// Creates a card with only an id and a label.
    #[must_use]
    pub fn new(action_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            action_id: action_id.into(),
            label: label.into(),
            description: None,
            icon: None,
        }
    }
}

/// Terminal outcome of a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    /// The player won.
    Win,
    /// The player lost.
    Lose,
    /// Neither side won.
    Draw,
}

impl GameResult {
    /// Display label for a (possibly unknown) result.
    #[must_use]
    pub fn label(result: Option<Self>) -> &'static str {
        match result {
            Some(Self::Win) => "Victory!",
            Some(Self::Lose) => "Defeat",
            Some(Self::Draw) => "Draw",
            None => "Game Over",
        }
    }
}

/// Body returned by the start, resume and play endpoints.
///
/// Start and resume never set `is_game_over`; it defaults to `false`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TurnPayload {
    /// Narration for the new turn.
    #[serde(deserialize_with = "null_as_default")]
    pub narration: String,
    /// Cards offered for the new turn.
    #[serde(deserialize_with = "null_as_default")]
    pub available_cards: Vec<ActionCard>,
    /// Server-side metrics snapshot.
    #[serde(deserialize_with = "null_as_default")]
    pub game_state: Metrics,
    /// Whether the campaign has ended.
    #[serde(deserialize_with = "null_as_default")]
    pub is_game_over: bool,
    /// Terminal result, when `is_game_over` is set.
    pub result: Option<GameResult>,
}

// A resumed session may come back with explicit nulls.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl TurnPayload {
    /// Whether the payload can seed a playable turn: some narration and at
    /// least one card. Terminal payloads only need narration.
    #[must_use]
    pub fn is_coherent(&self) -> bool {
        let has_narration = !self.narration.trim().is_empty();
        if self.is_game_over {
            has_narration
        } else {
            has_narration && !self.available_cards.is_empty()
        }
    }
}

/// The engine's working state for the current screen.
///
/// Replaced wholesale from each accepted payload; never merged field by field.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnState {
    /// Current narration text.
    pub narration: String,
    /// Cards playable this turn, unique by `action_id`.
    pub available_actions: Vec<ActionCard>,
    /// Mirrored server metrics.
    pub metrics: Metrics,
    /// Whether the campaign has ended.
    pub is_terminal: bool,
    /// Terminal result; only meaningful when `is_terminal`.
    pub result: Option<GameResult>,
}

impl TurnState {
    /// Builds a turn state from a server payload.
    ///
    /// Duplicate action ids keep their first occurrence. A terminal payload
    /// freezes the action list to empty.
    #[must_use]
    pub fn from_payload(payload: TurnPayload) -> Self {
        let TurnPayload {
            narration,
            available_cards,
            game_state,
            is_game_over,
            result,
        } = payload;

        let mut available_actions: Vec<ActionCard> = Vec::with_capacity(available_cards.len());
        if !is_game_over {
            for card in available_cards {
                if !available_actions
                    .iter()
                    .any(|existing| existing.action_id == card.action_id)
                {
                    available_actions.push(card);
                }
            }
        }

        Self {
            narration,
            available_actions,
            metrics: game_state,
            is_terminal: is_game_over,
            result: if is_game_over { result } else { None },
        }
    }

    /// Looks up a playable card by id.
    #[must_use]
    pub fn action(&self, action_id: &str) -> Option<&ActionCard> {
        self.available_actions
            .iter()
            .find(|card| card.action_id == action_id)
    }

    /// Turns played according to the mirrored metrics, if reported.
    #[must_use]
    pub fn elapsed_turns(&self) -> Option<u64> {
        ["elapsedTurns", "time"]
            .iter()
            .find_map(|key| self.metrics.get(*key).and_then(serde_json::Value::as_u64))
    }
}
