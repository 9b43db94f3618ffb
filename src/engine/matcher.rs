use crate::error::UnknownTeamError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Canonical NBA team identity. The slug is the stable key used for snapshots and reports.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub enum Team {
    AtlantaHawks,
    BostonCeltics,
    BrooklynNets,
    CharlotteHornets,
    ChicagoBulls,
    ClevelandCavaliers,
    DallasMavericks,
    DenverNuggets,
    DetroitPistons,
    GoldenStateWarriors,
    HoustonRockets,
    IndianaPacers,
    LosAngelesClippers,
    LosAngelesLakers,
    MemphisGrizzlies,
    MiamiHeat,
    MilwaukeeBucks,
    MinnesotaTimberwolves,
    NewOrleansPelicans,
    NewYorkKnicks,
    OklahomaCityThunder,
    OrlandoMagic,
    Philadelphia76ers,
    PhoenixSuns,
    PortlandTrailBlazers,
    SacramentoKings,
    SanAntonioSpurs,
    TorontoRaptors,
    UtahJazz,
    WashingtonWizards,
}

impl Team {
    pub const ALL: [Team; 30] = [
        Team::AtlantaHawks,
        Team::BostonCeltics,
        Team::BrooklynNets,
        Team::CharlotteHornets,
        Team::ChicagoBulls,
        Team::ClevelandCavaliers,
        Team::DallasMavericks,
        Team::DenverNuggets,
        Team::DetroitPistons,
        Team::GoldenStateWarriors,
        Team::HoustonRockets,
        Team::IndianaPacers,
        Team::LosAngelesClippers,
        Team::LosAngelesLakers,
        Team::MemphisGrizzlies,
        Team::MiamiHeat,
        Team::MilwaukeeBucks,
        Team::MinnesotaTimberwolves,
        Team::NewOrleansPelicans,
        Team::NewYorkKnicks,
        Team::OklahomaCityThunder,
        Team::OrlandoMagic,
        Team::Philadelphia76ers,
        Team::PhoenixSuns,
        Team::PortlandTrailBlazers,
        Team::SacramentoKings,
        Team::SanAntonioSpurs,
        Team::TorontoRaptors,
        Team::UtahJazz,
        Team::WashingtonWizards,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Team::AtlantaHawks => "atlanta-hawks",
            Team::BostonCeltics => "boston-celtics",
            Team::BrooklynNets => "brooklyn-nets",
            Team::CharlotteHornets => "charlotte-hornets",
            Team::ChicagoBulls => "chicago-bulls",
            Team::ClevelandCavaliers => "cleveland-cavaliers",
            Team::DallasMavericks => "dallas-mavericks",
            Team::DenverNuggets => "denver-nuggets",
            Team::DetroitPistons => "detroit-pistons",
            Team::GoldenStateWarriors => "golden-state-warriors",
            Team::HoustonRockets => "houston-rockets",
            Team::IndianaPacers => "indiana-pacers",
            Team::LosAngelesClippers => "los-angeles-clippers",
            Team::LosAngelesLakers => "los-angeles-lakers",
            Team::MemphisGrizzlies => "memphis-grizzlies",
            Team::MiamiHeat => "miami-heat",
            Team::MilwaukeeBucks => "milwaukee-bucks",
            Team::MinnesotaTimberwolves => "minnesota-timberwolves",
            Team::NewOrleansPelicans => "new-orleans-pelicans",
            Team::NewYorkKnicks => "new-york-knicks",
            Team::OklahomaCityThunder => "oklahoma-city-thunder",
            Team::OrlandoMagic => "orlando-magic",
            Team::Philadelphia76ers => "philadelphia-76ers",
            Team::PhoenixSuns => "phoenix-suns",
            Team::PortlandTrailBlazers => "portland-trail-blazers",
            Team::SacramentoKings => "sacramento-kings",
            Team::SanAntonioSpurs => "san-antonio-spurs",
            Team::TorontoRaptors => "toronto-raptors",
            Team::UtahJazz => "utah-jazz",
            Team::WashingtonWizards => "washington-wizards",
        }
    }

    /// Every accepted spelling, already in normalized form (see [`normalize_label`]).
    /// The first entry is the display name.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Team::AtlantaHawks => &["ATLANTA HAWKS", "ATLANTA", "HAWKS", "ATL"],
            Team::BostonCeltics => &["BOSTON CELTICS", "BOSTON", "CELTICS", "BOS"],
            Team::BrooklynNets => &["BROOKLYN NETS", "BROOKLYN", "NETS", "BKN", "BRK"],
            Team::CharlotteHornets => &["CHARLOTTE HORNETS", "CHARLOTTE", "HORNETS", "CHA", "CHO"],
            Team::ChicagoBulls => &["CHICAGO BULLS", "CHICAGO", "BULLS", "CHI"],
            Team::ClevelandCavaliers => {
                &["CLEVELAND CAVALIERS", "CLEVELAND", "CAVALIERS", "CAVS", "CLE"]
            }
            Team::DallasMavericks => &["DALLAS MAVERICKS", "DALLAS", "MAVERICKS", "MAVS", "DAL"],
            Team::DenverNuggets => &["DENVER NUGGETS", "DENVER", "NUGGETS", "DEN"],
            Team::DetroitPistons => &["DETROIT PISTONS", "DETROIT", "PISTONS", "DET"],
            Team::GoldenStateWarriors => &[
                "GOLDEN STATE WARRIORS",
                "GOLDEN STATE",
                "GOLDEN ST",
                "WARRIORS",
                "GSW",
                "GS",
            ],
            Team::HoustonRockets => &["HOUSTON ROCKETS", "HOUSTON", "ROCKETS", "HOU"],
            Team::IndianaPacers => &["INDIANA PACERS", "INDIANA", "PACERS", "IND"],
            Team::LosAngelesClippers => &[
                "LOS ANGELES CLIPPERS",
                "LA CLIPPERS",
                "LOS ANGELES C",
                "CLIPPERS",
                "LAC",
            ],
            Team::LosAngelesLakers => &[
                "LOS ANGELES LAKERS",
                "LA LAKERS",
                "LOS ANGELES L",
                "LAKERS",
                "LAL",
            ],
            Team::MemphisGrizzlies => &["MEMPHIS GRIZZLIES", "MEMPHIS", "GRIZZLIES", "MEM"],
            Team::MiamiHeat => &["MIAMI HEAT", "MIAMI", "HEAT", "MIA"],
            Team::MilwaukeeBucks => &["MILWAUKEE BUCKS", "MILWAUKEE", "BUCKS", "MIL"],
            Team::MinnesotaTimberwolves => &[
                "MINNESOTA TIMBERWOLVES",
                "MINNESOTA",
                "TIMBERWOLVES",
                "WOLVES",
                "MIN",
            ],
            Team::NewOrleansPelicans => {
                &["NEW ORLEANS PELICANS", "NEW ORLEANS", "PELICANS", "NOP", "NO"]
            }
            Team::NewYorkKnicks => {
                &["NEW YORK KNICKS", "NEW YORK", "NY KNICKS", "KNICKS", "NYK", "NY"]
            }
            Team::OklahomaCityThunder => &[
                "OKLAHOMA CITY THUNDER",
                "OKLAHOMA CITY",
                "OKLA CITY",
                "THUNDER",
                "OKC",
            ],
            Team::OrlandoMagic => &["ORLANDO MAGIC", "ORLANDO", "MAGIC", "ORL"],
            Team::Philadelphia76ers => &[
                "PHILADELPHIA 76ERS",
                "PHILADELPHIA",
                "PHILADELPHIA SIXERS",
                "76ERS",
                "SIXERS",
                "PHI",
            ],
            Team::PhoenixSuns => &["PHOENIX SUNS", "PHOENIX", "SUNS", "PHX", "PHO"],
            Team::PortlandTrailBlazers => &[
                "PORTLAND TRAIL BLAZERS",
                "PORTLAND",
                "TRAIL BLAZERS",
                "BLAZERS",
                "POR",
            ],
            Team::SacramentoKings => &["SACRAMENTO KINGS", "SACRAMENTO", "KINGS", "SAC"],
            Team::SanAntonioSpurs => &["SAN ANTONIO SPURS", "SAN ANTONIO", "SPURS", "SAS", "SA"],
            Team::TorontoRaptors => &["TORONTO RAPTORS", "TORONTO", "RAPTORS", "TOR"],
            Team::UtahJazz => &["UTAH JAZZ", "UTAH", "JAZZ", "UTA"],
            Team::WashingtonWizards => &["WASHINGTON WIZARDS", "WASHINGTON", "WIZARDS", "WAS", "WSH"],
        }
    }

    pub fn display_name(self) -> &'static str {
        self.aliases()[0]
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl Serialize for Team {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.slug())
    }
}

impl<'de> Deserialize<'de> for Team {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        resolve(&raw).map_err(serde::de::Error::custom)
    }
}

/// Uppercase, fold punctuation and collapse whitespace so that slugs ("los-angeles-lakers"),
/// API labels ("Los Angeles Lakers") and site short forms ("L.A. Lakers") compare equal.
pub fn normalize_label(raw: &str) -> String {
    let s = raw
        .to_uppercase()
        .replace(['-', '_', '\u{a0}'], " ")
        .replace(['.', '\'', '\u{2019}'], "")
        .replace('&', " AND ");
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Map any known spelling of a team to its canonical identity.
pub fn resolve(raw: &str) -> Result<Team, UnknownTeamError> {
    let key = normalize_label(raw);
    if key.is_empty() {
        return Err(UnknownTeamError::new(raw));
    }
    Team::ALL
        .iter()
        .copied()
        .find(|team| team.aliases().contains(&key.as_str()))
        .ok_or_else(|| UnknownTeamError::new(raw))
}
