use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// The football news sites we know how to scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceId {
    #[serde(rename = "90mins")]
    NinetyMin,
    #[serde(rename = "onefootball")]
    OneFootball,
    #[serde(rename = "espn")]
    Espn,
    #[serde(rename = "goal")]
    Goal,
    #[serde(rename = "fourfourtwo-epl")]
    FourFourTwoEpl,
    #[serde(rename = "fourfourtwo-laliga")]
    FourFourTwoLaLiga,
    #[serde(rename = "fourfourtwo-ucl")]
    FourFourTwoUcl,
    #[serde(rename = "fourfourtwo-bundesliga")]
    FourFourTwoBundesliga,
}

impl SourceId {
    pub const ALL: [SourceId; 8] = [
        SourceId::NinetyMin,
        SourceId::OneFootball,
        SourceId::Espn,
        SourceId::Goal,
        SourceId::FourFourTwoEpl,
        SourceId::FourFourTwoLaLiga,
        SourceId::FourFourTwoUcl,
        SourceId::FourFourTwoBundesliga,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::NinetyMin => "90mins",
            SourceId::OneFootball => "onefootball",
            SourceId::Espn => "espn",
            SourceId::Goal => "goal",
            SourceId::FourFourTwoEpl => "fourfourtwo-epl",
            SourceId::FourFourTwoLaLiga => "fourfourtwo-laliga",
            SourceId::FourFourTwoUcl => "fourfourtwo-ucl",
            SourceId::FourFourTwoBundesliga => "fourfourtwo-bundesliga",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SourceId::NinetyMin => "90mins",
            SourceId::OneFootball => "OneFootball",
            SourceId::Espn => "ESPN",
            SourceId::Goal => "Goal.com",
            SourceId::FourFourTwoEpl => "FourFourTwo EPL",
            SourceId::FourFourTwoLaLiga => "FourFourTwo La Liga",
            SourceId::FourFourTwoUcl => "FourFourTwo UCL",
            SourceId::FourFourTwoBundesliga => "FourFourTwo Bundesliga",
        }
    }

    pub fn category(&self) -> Category {
        Category::from_source_name(self.as_str())
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceId::ALL
            .iter()
            .copied()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| Error::InvalidSource(s.to_string()))
    }
}

/// Coarse competition tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Epl,
    Laliga,
    Ucl,
    Bundesliga,
    General,
}

impl Category {
    /// Derives the category by substring match on a source name.
    pub fn from_source_name(source: &str) -> Self {
        if source.contains("epl") {
            Category::Epl
        } else if source.contains("laliga") {
            Category::Laliga
        } else if source.contains("ucl") {
            Category::Ucl
        } else if source.contains("bundesliga") {
            Category::Bundesliga
        } else {
            Category::General
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Epl => "epl",
            Category::Laliga => "laliga",
            Category::Ucl => "ucl",
            Category::Bundesliga => "bundesliga",
            Category::General => "general",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "epl" => Ok(Category::Epl),
            "laliga" => Ok(Category::Laliga),
            "ucl" => Ok(Category::Ucl),
            "bundesliga" => Ok(Category::Bundesliga),
            "general" => Ok(Category::General),
            other => Err(Error::Storage(format!("Unknown category: {}", other))),
        }
    }
}
