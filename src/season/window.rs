//! Season-window resolution.
//!
//! Turns a [`CanonicalSeason`] into the standings tokens to request and the
//! default view. The branching lives in [`WINDOW_RULES`], one row per
//! `(LeagueClass, SeasonPhase)`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::league::{League, LeagueClass};
use crate::season::normalize::CanonicalSeason;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeasonPhase {
    Regular,
    Post,
    Off,
    Unknown,
}

impl SeasonPhase {
    pub fn from_value(value: &Value) -> Self {
        let raw = match value {
            Value::Null => return SeasonPhase::Unknown,
            Value::String(s) => s.to_uppercase(),
            other => other.to_string().to_uppercase(),
        };
        match raw.as_str() {
            "REG" => SeasonPhase::Regular,
            "POST" => SeasonPhase::Post,
            "OFF" => SeasonPhase::Off,
            _ => SeasonPhase::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Reg,
    Post,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonWindow {
    pub reg_param: Option<String>,
    pub post_param: Option<String>,
    pub default_view: View,
    pub should_fetch_post: bool,
}

impl SeasonWindow {
    /// Post-season token to request, if any.
    pub fn post_request(&self) -> Option<&str> {
        match (&self.post_param, self.should_fetch_post) {
            (Some(token), true) => Some(token.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum RegToken {
    /// `2025`
    Year,
    /// `2024REG`
    PrevYearReg,
    /// `ApiSeason`, else `2025REG`
    ApiOrYearReg,
}

#[derive(Debug, Clone, Copy)]
enum PostToken {
    Skip,
    /// `2025POST`
    YearPost,
    /// `2024POST`
    PrevYearPost,
    /// `ApiSeason` when it already names the post-season, else `2025POST`
    ApiIfPostOrYearPost,
}

#[derive(Debug, Clone, Copy)]
struct WindowRule {
    class: LeagueClass,
    phase: SeasonPhase,
    reg: RegToken,
    post: PostToken,
    default_view: View,
}

const fn rule(
    class: LeagueClass,
    phase: SeasonPhase,
    reg: RegToken,
    post: PostToken,
    default_view: View,
) -> WindowRule {
    WindowRule {
        class,
        phase,
        reg,
        post,
        default_view,
    }
}

use LeagueClass::{Annual, Irregular};
use PostToken::*;
use RegToken::*;
use SeasonPhase::*;

const WINDOW_RULES: [WindowRule; 8] = [
    rule(Irregular, Post, Year, YearPost, View::Post),
    rule(Irregular, Off, Year, PrevYearPost, View::Post),
    rule(Irregular, Regular, Year, Skip, View::Reg),
    rule(Irregular, Unknown, Year, Skip, View::Reg),
    rule(Annual, Off, PrevYearReg, PrevYearPost, View::Post),
    rule(Annual, Post, ApiOrYearReg, ApiIfPostOrYearPost, View::Post),
    rule(Annual, Regular, ApiOrYearReg, PrevYearPost, View::Reg),
    // Always guesses a post-season for an unrecognized type; untested provider edge.
    rule(Annual, Unknown, ApiOrYearReg, YearPost, View::Reg),
];

/// Compute the standings window for `league` in its current `season`.
pub fn resolve(season: &CanonicalSeason, league: League) -> SeasonWindow {
    let api_season = token_of(&season.api_season);

    let Some(year) = season_year(&season.season) else {
        return SeasonWindow {
            reg_param: api_season,
            post_param: None,
            default_view: View::Reg,
            should_fetch_post: false,
        };
    };

    let phase = SeasonPhase::from_value(&season.season_type);
    let class = league.class();
    let rule = WINDOW_RULES
        .iter()
        .find(|r| r.class == class && r.phase == phase)
        .copied()
        .unwrap_or(WindowRule {
            class,
            phase,
            reg: ApiOrYearReg,
            post: Skip,
            default_view: View::Reg,
        });

    // A year with no predecessor (i64::MIN) has no previous-season token.
    let prev_year = year.checked_sub(1);

    let reg_param = match rule.reg {
        Year => Some(year.to_string()),
        PrevYearReg => prev_year
            .map(|prev| format!("{prev}REG"))
            .or_else(|| api_season.clone()),
        ApiOrYearReg => Some(api_season.clone().unwrap_or_else(|| format!("{year}REG"))),
    };

    let post_param = match rule.post {
        Skip => None,
        YearPost => Some(format!("{year}POST")),
        PrevYearPost => prev_year.map(|prev| format!("{prev}POST")),
        ApiIfPostOrYearPost => Some(
            api_season
                .filter(|api| api.contains("POST"))
                .unwrap_or_else(|| format!("{year}POST")),
        ),
    };

    SeasonWindow {
        should_fetch_post: post_param.is_some(),
        reg_param,
        post_param,
        default_view: rule.default_view,
    }
}

/// Integer season year, from a JSON number or numeric string.
fn season_year(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Provider season token as a string; `null` means absent.
fn token_of(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::season::normalize::normalize;
    use serde_json::json;

    fn window(league: League, raw: Value) -> SeasonWindow {
        resolve(&normalize(&raw), league)
    }

    #[test]
    fn test_irregular_post_season() {
        let w = window(League::Nfl, json!({ "Season": 2025, "SeasonType": "POST" }));
        assert_eq!(w.reg_param.as_deref(), Some("2025"));
        assert_eq!(w.post_param.as_deref(), Some("2025POST"));
        assert_eq!(w.default_view, View::Post);
        assert!(w.should_fetch_post);
    }

    #[test]
    fn test_irregular_off_season_shows_last_playoffs() {
        let w = window(League::Nfl, json!({ "Season": 2026, "SeasonType": "off" }));
        assert_eq!(w.reg_param.as_deref(), Some("2026"));
        assert_eq!(w.post_param.as_deref(), Some("2025POST"));
        assert_eq!(w.default_view, View::Post);
        assert!(w.should_fetch_post);
    }

    #[test]
    fn test_irregular_bare_year_has_no_post() {
        let w = window(League::Nfl, json!(2025));
        assert_eq!(w.reg_param.as_deref(), Some("2025"));
        assert_eq!(w.post_param, None);
        assert_eq!(w.default_view, View::Reg);
        assert!(!w.should_fetch_post);
        assert_eq!(w.post_request(), None);
    }

    #[test]
    fn test_annual_off_season() {
        let w = window(League::Nba, json!({ "Season": 2026, "SeasonType": "OFF" }));
        assert_eq!(w.reg_param.as_deref(), Some("2025REG"));
        assert_eq!(w.post_param.as_deref(), Some("2025POST"));
        assert_eq!(w.default_view, View::Post);
        assert!(w.should_fetch_post);
    }

    #[test]
    fn test_annual_regular_season() {
        let w = window(
            League::Nhl,
            json!({ "Season": 2025, "SeasonType": "REG", "ApiSeason": "2025REG" }),
        );
        assert_eq!(w.reg_param.as_deref(), Some("2025REG"));
        assert_eq!(w.post_param.as_deref(), Some("2024POST"));
        assert_eq!(w.default_view, View::Reg);
        assert!(w.should_fetch_post);
    }

    #[test]
    fn test_annual_regular_season_without_api_season() {
        let w = window(League::Mlb, json!({ "Season": 2025, "SeasonType": "REG" }));
        assert_eq!(w.reg_param.as_deref(), Some("2025REG"));
        assert_eq!(w.post_param.as_deref(), Some("2024POST"));
    }

    #[test]
    fn test_annual_post_season_uses_api_tokens() {
        let w = window(
            League::Nba,
            json!({ "Season": 2025, "SeasonType": "POST", "ApiSeason": "2025POST" }),
        );
        assert_eq!(w.reg_param.as_deref(), Some("2025POST"));
        assert_eq!(w.post_param.as_deref(), Some("2025POST"));
        assert_eq!(w.default_view, View::Post);
    }

    #[test]
    fn test_annual_post_season_without_api_season() {
        let w = window(League::Nba, json!({ "Season": 2025, "SeasonType": "POST" }));
        assert_eq!(w.reg_param.as_deref(), Some("2025REG"));
        assert_eq!(w.post_param.as_deref(), Some("2025POST"));
    }

    #[test]
    fn test_annual_post_season_ignores_non_post_api_token() {
        let w = window(
            League::Nhl,
            json!({ "Season": 2025, "SeasonType": "POST", "ApiSeason": "2025STAR" }),
        );
        assert_eq!(w.post_param.as_deref(), Some("2025POST"));
    }

    #[test]
    fn test_annual_unknown_type_guesses_current_post() {
        let w = window(League::Mlb, json!({ "Season": 2025, "SeasonType": "PRE" }));
        assert_eq!(w.reg_param.as_deref(), Some("2025REG"));
        assert_eq!(w.post_param.as_deref(), Some("2025POST"));
        assert_eq!(w.default_view, View::Reg);
        assert!(w.should_fetch_post);
    }

    #[test]
    fn test_annual_bare_year_falls_into_unknown_row() {
        let w = window(League::Nba, json!(2025));
        assert_eq!(w.reg_param.as_deref(), Some("2025"));
        assert_eq!(w.post_param.as_deref(), Some("2025POST"));
    }

    #[test]
    fn test_missing_season_uses_api_season_only() {
        for league in League::ALL {
            let w = window(league, json!({ "SeasonType": "OFF", "ApiSeason": "2025OFF" }));
            assert_eq!(w.reg_param.as_deref(), Some("2025OFF"));
            assert_eq!(w.post_param, None);
            assert_eq!(w.default_view, View::Reg);
            assert!(!w.should_fetch_post);
        }
    }

    #[test]
    fn test_nothing_known_leaves_reg_param_empty() {
        let w = window(League::Nhl, Value::Null);
        assert_eq!(w.reg_param, None);
        assert_eq!(w.post_request(), None);
    }

    #[test]
    fn test_numeric_string_season_is_coerced() {
        let w = window(League::Nba, json!({ "Season": "2026", "SeasonType": "OFF" }));
        assert_eq!(w.reg_param.as_deref(), Some("2025REG"));
    }

    #[test]
    fn test_earliest_year_has_no_previous_season() {
        let w = window(League::Nba, json!({ "Season": i64::MIN, "SeasonType": "OFF" }));
        assert_eq!(w.reg_param, None);
        assert_eq!(w.post_param, None);
        assert!(!w.should_fetch_post);
        assert_eq!(w.post_request(), None);

        let w = window(
            League::Nba,
            json!({ "Season": i64::MIN, "SeasonType": "OFF", "ApiSeason": "2025OFF" }),
        );
        assert_eq!(w.reg_param.as_deref(), Some("2025OFF"));
        assert_eq!(w.post_param, None);

        let w = window(League::Nfl, json!({ "Season": i64::MIN, "SeasonType": "OFF" }));
        assert_eq!(w.reg_param, Some(i64::MIN.to_string()));
        assert_eq!(w.post_param, None);
    }

    #[test]
    fn test_huge_negative_float_season_does_not_panic() {
        let w = window(League::Mlb, json!({ "Season": -1e300, "SeasonType": "REG" }));
        assert_eq!(w.reg_param, Some(format!("{}REG", i64::MIN)));
        assert_eq!(w.post_param, None);
        assert!(!w.should_fetch_post);
    }

    #[test]
    fn test_every_class_and_phase_has_a_rule() {
        for class in [Irregular, Annual] {
            for phase in [Regular, Post, Off, Unknown] {
                assert!(WINDOW_RULES
                    .iter()
                    .any(|r| r.class == class && r.phase == phase));
            }
        }
    }
}
