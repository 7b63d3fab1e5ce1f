use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

use super::event::PlayerId;
use crate::error::{EpisodeError, Result};

/// Playing role, as recorded in the player register.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PlayerRole {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

/// Which spelling of a role to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleNotation {
    /// GK / DF / MD / FW
    Two,
    /// GKP / DEF / MID / FWD
    Three,
    Full,
}

impl PlayerRole {
    pub fn notation(&self, notation: RoleNotation) -> &'static str {
        match (self, notation) {
            (PlayerRole::Goalkeeper, RoleNotation::Two) => "GK",
            (PlayerRole::Defender, RoleNotation::Two) => "DF",
            (PlayerRole::Midfielder, RoleNotation::Two) => "MD",
            (PlayerRole::Forward, RoleNotation::Two) => "FW",
            (PlayerRole::Goalkeeper, RoleNotation::Three) => "GKP",
            (PlayerRole::Defender, RoleNotation::Three) => "DEF",
            (PlayerRole::Midfielder, RoleNotation::Three) => "MID",
            (PlayerRole::Forward, RoleNotation::Three) => "FWD",
            (PlayerRole::Goalkeeper, RoleNotation::Full) => "Goalkeeper",
            (PlayerRole::Defender, RoleNotation::Full) => "Defender",
            (PlayerRole::Midfielder, RoleNotation::Full) => "Midfielder",
            (PlayerRole::Forward, RoleNotation::Full) => "Forward",
        }
    }

    /// Accepts any of the three notations, case-insensitively.
    pub fn parse(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "GK" | "GKP" | "GOALKEEPER" => Some(PlayerRole::Goalkeeper),
            "DF" | "DEF" | "DEFENDER" => Some(PlayerRole::Defender),
            "MD" | "MID" | "MIDFIELDER" => Some(PlayerRole::Midfielder),
            "FW" | "FWD" | "FORWARD" => Some(PlayerRole::Forward),
            _ => None,
        }
    }

    /// Defenders and keepers restarting play from the back.
    pub fn is_back_line(&self) -> bool {
        matches!(self, PlayerRole::Goalkeeper | PlayerRole::Defender)
    }
}

#[derive(Debug, Deserialize)]
struct RoleRecord {
    code2: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerRecord {
    wy_id: PlayerId,
    role: RoleRecord,
}

/// Player id → role lookup.
#[derive(Debug, Clone, Default)]
pub struct PlayerRoster {
    roles: FxHashMap<PlayerId, PlayerRole>,
}

impl PlayerRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, player_id: PlayerId, role: PlayerRole) {
        self.roles.insert(player_id, role);
    }

    /// Role of a player; untracked (id 0) and unknown players have none.
    pub fn role_of(&self, player_id: PlayerId) -> Option<PlayerRole> {
        if player_id == 0 {
            return None;
        }
        self.roles.get(&player_id).copied()
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Load the Wyscout players register (`[{ "wyId": .., "role": {"code2": ..}}]`).
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let records: Vec<PlayerRecord> = serde_json::from_reader(reader)?;
        let mut roster = Self::new();
        for record in records {
            let role = PlayerRole::parse(&record.role.code2).ok_or_else(|| {
                EpisodeError::InvalidInput(format!(
                    "player {} has unknown role code `{}`",
                    record.wy_id, record.role.code2
                ))
            })?;
            roster.insert(record.wy_id, role);
        }
        Ok(roster)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_json_reader(std::io::BufReader::new(file))
    }
}

impl FromIterator<(PlayerId, PlayerRole)> for PlayerRoster {
    fn from_iter<I: IntoIterator<Item = (PlayerId, PlayerRole)>>(iter: I) -> Self {
        Self {
            roles: iter.into_iter().collect(),
        }
    }
}
