use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use super::event::{MatchId, TeamId};
use super::score::RunningScore;
use crate::error::{EpisodeError, Result};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn opponent(&self) -> Self {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }
}

/// How the match was decided.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DurationClass {
    Regular,
    ExtraTime,
    Penalties,
}

impl DurationClass {
    pub fn has_extra_time(&self) -> bool {
        matches!(self, DurationClass::ExtraTime | DurationClass::Penalties)
    }
}

/// One team's entry in the match metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeamRecord {
    pub team_id: TeamId,
    pub side: Side,
    #[serde(rename = "scoreHT")]
    pub score_ht: u32,
    /// Full-time score, extra time included, shootout excluded
    pub score: u32,
}

/// Authoritative per-match metadata.
///
/// Loads either from the normalized form (`teams` as a list) or straight
/// from the Wyscout matches layout (`wyId`, `duration`, `teamsData` keyed by
/// team id).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatchInfo {
    #[serde(alias = "wyId")]
    pub match_id: MatchId,
    #[serde(alias = "duration")]
    pub duration_class: DurationClass,
    #[serde(alias = "teamsData", deserialize_with = "deserialize_teams")]
    pub teams: Vec<TeamRecord>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TeamsRepr {
    List(Vec<TeamRecord>),
    Keyed(BTreeMap<String, TeamRecord>),
}

fn deserialize_teams<'de, D>(deserializer: D) -> std::result::Result<Vec<TeamRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match TeamsRepr::deserialize(deserializer)? {
        TeamsRepr::List(teams) => teams,
        TeamsRepr::Keyed(teams) => teams.into_values().collect(),
    })
}

impl MatchInfo {
    pub fn new(
        match_id: MatchId,
        duration_class: DurationClass,
        home: TeamRecord,
        away: TeamRecord,
    ) -> Self {
        Self {
            match_id,
            duration_class,
            teams: vec![home, away],
        }
    }

    pub fn side_of(&self, team_id: TeamId) -> Option<Side> {
        self.teams
            .iter()
            .find(|t| t.team_id == team_id)
            .map(|t| t.side)
    }

    pub fn team_on(&self, side: Side) -> Result<&TeamRecord> {
        self.teams.iter().find(|t| t.side == side).ok_or_else(|| {
            EpisodeError::consistency(
                Some(self.match_id),
                None,
                format!("match metadata has no {:?} team", side),
            )
        })
    }

    pub fn half_time_score(&self) -> Result<RunningScore> {
        Ok(RunningScore::new(
            self.team_on(Side::Away)?.score_ht,
            self.team_on(Side::Home)?.score_ht,
        ))
    }

    pub fn full_time_score(&self) -> Result<RunningScore> {
        Ok(RunningScore::new(
            self.team_on(Side::Away)?.score,
            self.team_on(Side::Home)?.score,
        ))
    }

    /// Exactly one home and one away team with distinct ids.
    pub fn validate(&self) -> Result<()> {
        let home = self.team_on(Side::Home)?;
        let away = self.team_on(Side::Away)?;
        if self.teams.len() != 2 || home.team_id == away.team_id {
            return Err(EpisodeError::consistency(
                Some(self.match_id),
                None,
                format!(
                    "expected two distinct teams in match metadata, found {}",
                    self.teams.len()
                ),
            ));
        }
        Ok(())
    }
}
