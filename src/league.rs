use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A league served by the provider. Declaration order is the default
/// iteration order, which fixes the append order of combined outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum League {
    Nba,
    Nhl,
    Nfl,
    Mlb,
}

/// How a league's provider reports its season calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeagueClass {
    /// Bare-year seasons with no `REG`/`POST` suffix convention.
    Irregular,
    /// Year-suffixed season tokens (`2025REG`, `2025POST`).
    Annual,
}

impl League {
    pub const ALL: [League; 4] = [League::Nba, League::Nhl, League::Nfl, League::Mlb];

    pub fn as_str(&self) -> &'static str {
        match self {
            League::Nba => "nba",
            League::Nhl => "nhl",
            League::Nfl => "nfl",
            League::Mlb => "mlb",
        }
    }

    pub fn class(&self) -> LeagueClass {
        match self {
            League::Nfl => LeagueClass::Irregular,
            League::Nba | League::Nhl | League::Mlb => LeagueClass::Annual,
        }
    }
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for League {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nba" => Ok(League::Nba),
            "nhl" => Ok(League::Nhl),
            "nfl" => Ok(League::Nfl),
            "mlb" => Ok(League::Mlb),
            other => Err(format!("unknown league '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_nfl_is_irregular() {
        let irregular: Vec<League> = League::ALL
            .into_iter()
            .filter(|l| l.class() == LeagueClass::Irregular)
            .collect();
        assert_eq!(irregular, vec![League::Nfl]);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("NHL".parse::<League>().unwrap(), League::Nhl);
        assert!("mls".parse::<League>().is_err());
    }

    #[test]
    fn test_serde_uses_lowercase_ids() {
        let json = serde_json::to_string(&League::Mlb).unwrap();
        assert_eq!(json, "\"mlb\"");
    }
}
