use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::match_info::Side;

/// Running score of a match as of some event.
///
/// Renders as `"{away}-{home}"`, which is the column format downstream
/// feature engineering reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct RunningScore {
    pub away: u32,
    pub home: u32,
}

impl RunningScore {
    pub fn new(away: u32, home: u32) -> Self {
        Self { away, home }
    }

    pub fn goals_for(&self, side: Side) -> u32 {
        match side {
            Side::Home => self.home,
            Side::Away => self.away,
        }
    }

    /// Score with one more goal for `side`.
    pub fn credit(self, side: Side) -> Self {
        match side {
            Side::Home => Self::new(self.away, self.home + 1),
            Side::Away => Self::new(self.away + 1, self.home),
        }
    }

    /// Goals for `side` minus goals against it.
    pub fn differential_for(&self, side: Side) -> i64 {
        self.goals_for(side) as i64 - self.goals_for(side.opponent()) as i64
    }

    /// Neither component went down between `self` and `later`.
    pub fn is_reachable(&self, later: &RunningScore) -> bool {
        later.away >= self.away && later.home >= self.home
    }
}

impl fmt::Display for RunningScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.away, self.home)
    }
}

impl FromStr for RunningScore {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (away, home) = s
            .split_once('-')
            .ok_or_else(|| format!("score `{}` is not in away-home form", s))?;
        let away = away
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("bad away score in `{}`: {}", s, e))?;
        let home = home
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("bad home score in `{}`: {}", s, e))?;
        Ok(Self::new(away, home))
    }
}

impl From<RunningScore> for String {
    fn from(score: RunningScore) -> Self {
        score.to_string()
    }
}

impl TryFrom<String> for RunningScore {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
