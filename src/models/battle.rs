//! Battle log models.
//!
//! `RawBattle` mirrors the game-data API battle log entry. `MatchRecord` is
//! the reduced form the analyzer works on: one player side, one opponent
//! side.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Battle time format used by the game-data API, e.g. `20250301T181512.000Z`.
const BATTLE_TIME_FORMAT: &str = "%Y%m%dT%H%M%S%.fZ";

/// Game mode reference on a raw battle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawGameMode {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
}

/// A card played in a battle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBattleCard {
    pub name: String,
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub max_level: Option<u32>,
}

/// One participant of a battle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawParticipant {
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub starting_trophies: Option<i32>,
    #[serde(default)]
    pub trophy_change: Option<i32>,
    #[serde(default)]
    pub crowns: u32,
    #[serde(default)]
    pub cards: Vec<RawBattleCard>,
}

/// A battle log entry as returned by the game-data API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBattle {
    #[serde(default)]
    pub battle_time: String,
    #[serde(rename = "type", default)]
    pub battle_type: String,
    #[serde(default)]
    pub game_mode: Option<RawGameMode>,
    #[serde(default)]
    pub team: Vec<RawParticipant>,
    #[serde(default)]
    pub opponent: Vec<RawParticipant>,
}

/// A card as played in one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayedCard {
    pub name: String,
    pub level: u32,
}

/// One side of a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSide {
    pub crowns: u32,
    pub trophy_change: Option<i32>,
    pub cards: Vec<PlayedCard>,
}

impl MatchSide {
    fn from_raw(raw: &RawParticipant) -> Self {
        Self {
            crowns: raw.crowns,
            trophy_change: raw.trophy_change,
            cards: raw
                .cards
                .iter()
                .map(|c| PlayedCard {
                    name: c.name.clone(),
                    level: c.level,
                })
                .collect(),
        }
    }
}

/// Outcome of a match from the player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchOutcome {
    Win,
    Loss,
    Draw,
}

/// A past battle reduced to the player and their opponent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub battle_time: Option<DateTime<Utc>>,
    pub battle_type: String,
    pub mode: String,
    pub player: MatchSide,
    pub opponent: MatchSide,
}

impl MatchRecord {
    /// Reduce a raw battle to a match record.
    ///
    /// Only the first entry of `team` and `opponent` is used. Returns `None`
    /// when either side is missing.
    pub fn from_raw(raw: &RawBattle) -> Option<Self> {
        let player = raw.team.first()?;
        let opponent = raw.opponent.first()?;

        Some(Self {
            battle_time: parse_battle_time(&raw.battle_time),
            battle_type: raw.battle_type.clone(),
            mode: raw
                .game_mode
                .as_ref()
                .and_then(|m| m.name.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            player: MatchSide::from_raw(player),
            opponent: MatchSide::from_raw(opponent),
        })
    }

    /// Convert a whole battle log, skipping malformed entries.
    pub fn from_battle_log(raw: &[RawBattle]) -> Vec<Self> {
        raw.iter()
            .filter_map(|b| {
                let record = Self::from_raw(b);
                if record.is_none() {
                    tracing::warn!(
                        "Skipping battle at '{}': missing team or opponent",
                        b.battle_time
                    );
                }
                record
            })
            .collect()
    }

    /// Strict crown comparison; equal crowns is a draw.
    pub fn outcome(&self) -> MatchOutcome {
        use std::cmp::Ordering;
        match self.player.crowns.cmp(&self.opponent.crowns) {
            Ordering::Greater => MatchOutcome::Win,
            Ordering::Less => MatchOutcome::Loss,
            Ordering::Equal => MatchOutcome::Draw,
        }
    }

    pub fn is_win(&self) -> bool {
        self.outcome() == MatchOutcome::Win
    }

    pub fn is_loss(&self) -> bool {
        self.outcome() == MatchOutcome::Loss
    }
}

fn parse_battle_time(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, BATTLE_TIME_FORMAT)
        .ok()
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn raw_battle_json() -> &'static str {
        r##"{
            "battleTime": "20250301T181512.000Z",
            "type": "PvP",
            "gameMode": {"id": 72000006, "name": "Ladder"},
            "team": [{
                "tag": "#ME", "crowns": 2, "trophyChange": 30,
                "cards": [{"name": "Hog Rider", "id": 26000021, "level": 11, "maxLevel": 14}]
            }],
            "opponent": [{
                "tag": "#THEM", "crowns": 1, "trophyChange": -30,
                "cards": [{"name": "Balloon", "level": 10}]
            }]
        }"##
    }

    #[test]
    fn test_from_raw() {
        let raw: RawBattle = serde_json::from_str(raw_battle_json()).unwrap();
        let record = MatchRecord::from_raw(&raw).unwrap();

        assert_eq!(record.mode, "Ladder");
        assert_eq!(record.battle_type, "PvP");
        assert_eq!(record.player.crowns, 2);
        assert_eq!(record.player.trophy_change, Some(30));
        assert_eq!(record.opponent.cards[0].name, "Balloon");
        assert!(record.is_win());

        let time = record.battle_time.unwrap();
        assert_eq!(time.year(), 2025);
        assert_eq!(time.hour(), 18);
    }

    #[test]
    fn test_from_raw_missing_side() {
        let raw = RawBattle {
            battle_time: "20250301T181512.000Z".to_string(),
            team: vec![RawParticipant::default()],
            ..Default::default()
        };
        assert!(MatchRecord::from_raw(&raw).is_none());
        assert!(MatchRecord::from_battle_log(&[raw]).is_empty());
    }

    #[test]
    fn test_unknown_mode_and_bad_time() {
        let raw = RawBattle {
            battle_time: "yesterday".to_string(),
            team: vec![RawParticipant::default()],
            opponent: vec![RawParticipant::default()],
            ..Default::default()
        };
        let record = MatchRecord::from_raw(&raw).unwrap();
        assert_eq!(record.mode, "Unknown");
        assert!(record.battle_time.is_none());
    }

    #[test]
    fn test_outcome_is_strict() {
        let raw: RawBattle = serde_json::from_str(raw_battle_json()).unwrap();
        let mut record = MatchRecord::from_raw(&raw).unwrap();

        record.opponent.crowns = 2;
        assert_eq!(record.outcome(), MatchOutcome::Draw);
        assert!(!record.is_win());
        assert!(!record.is_loss());

        record.opponent.crowns = 3;
        assert_eq!(record.outcome(), MatchOutcome::Loss);
    }

    #[test]
    fn test_only_first_participant_counts() {
        let mut raw: RawBattle = serde_json::from_str(raw_battle_json()).unwrap();
        raw.team.push(RawParticipant {
            crowns: 0,
            ..Default::default()
        });
        let record = MatchRecord::from_raw(&raw).unwrap();
        assert_eq!(record.player.crowns, 2);
    }
}
