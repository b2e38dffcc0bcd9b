//! Raw score to 1–5 standardized score, per assessment component.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{NormError, Result};

/// Standardized score returned when a raw score falls outside every band.
pub const UNDETERMINED: u8 = 0;

/// The eight components of the aptitude profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    VisualPerception,
    Spatial,
    Reasoning,
    Numerical,
    Gestalt,
    Coordination,
    Memory,
    VerbalComprehension,
}

impl Component {
    pub const ALL: [Component; 8] = [
        Component::VisualPerception,
        Component::Spatial,
        Component::Reasoning,
        Component::Numerical,
        Component::Gestalt,
        Component::Coordination,
        Component::Memory,
        Component::VerbalComprehension,
    ];

    /// Display name as it appears on the assessment form.
    pub fn name(self) -> &'static str {
        match self {
            Component::VisualPerception => "Visual Perception",
            Component::Spatial => "Spatial",
            Component::Reasoning => "Reasoning",
            Component::Numerical => "Numerical",
            Component::Gestalt => "Gestalt",
            Component::Coordination => "Co-ordination",
            Component::Memory => "Memory",
            Component::VerbalComprehension => "Verbal Comprehension",
        }
    }

    /// The component's five bands, lowest score first.
    pub fn bands(self) -> &'static [ScoreBand; 5] {
        match self {
            Component::VisualPerception => &VISUAL_PERCEPTION,
            Component::Spatial => &SPATIAL,
            Component::Reasoning => &REASONING,
            Component::Numerical => &NUMERICAL,
            Component::Gestalt => &GESTALT,
            Component::Coordination => &COORDINATION,
            Component::Memory => &MEMORY,
            Component::VerbalComprehension => &VERBAL_COMPREHENSION,
        }
    }

    /// Map a raw score to 1–5, or [`UNDETERMINED`] if no band contains it.
    pub fn standardize(self, raw: i64) -> u8 {
        self.bands()
            .iter()
            .find(|band| band.contains(raw))
            .map_or(UNDETERMINED, |band| band.score)
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Component {
    type Err = NormError;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "visualperception" => Ok(Component::VisualPerception),
            "spatial" => Ok(Component::Spatial),
            "reasoning" => Ok(Component::Reasoning),
            "numerical" => Ok(Component::Numerical),
            "gestalt" => Ok(Component::Gestalt),
            "coordination" => Ok(Component::Coordination),
            "memory" => Ok(Component::Memory),
            "verbalcomprehension" => Ok(Component::VerbalComprehension),
            _ => Err(NormError::UnknownComponent(s.to_string())),
        }
    }
}

/// An inclusive raw-score range and the standardized score it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreBand {
    pub min: i64,
    pub max: i64,
    pub score: u8,
}

impl ScoreBand {
    const fn new(min: i64, max: i64, score: u8) -> Self {
        Self { min, max, score }
    }

    pub fn contains(&self, raw: i64) -> bool {
        (self.min..=self.max).contains(&raw)
    }
}

const VISUAL_PERCEPTION: [ScoreBand; 5] = [
    ScoreBand::new(0, 8, 1),
    ScoreBand::new(9, 15, 2),
    ScoreBand::new(16, 22, 3),
    ScoreBand::new(23, 28, 4),
    ScoreBand::new(29, 32, 5),
];

const SPATIAL: [ScoreBand; 5] = [
    ScoreBand::new(0, 5, 1),
    ScoreBand::new(6, 10, 2),
    ScoreBand::new(11, 15, 3),
    ScoreBand::new(16, 19, 4),
    ScoreBand::new(20, 24, 5),
];

const REASONING: [ScoreBand; 5] = [
    ScoreBand::new(0, 6, 1),
    ScoreBand::new(7, 12, 2),
    ScoreBand::new(13, 18, 3),
    ScoreBand::new(19, 23, 4),
    ScoreBand::new(24, 28, 5),
];

const NUMERICAL: [ScoreBand; 5] = [
    ScoreBand::new(0, 7, 1),
    ScoreBand::new(8, 14, 2),
    ScoreBand::new(15, 21, 3),
    ScoreBand::new(22, 27, 4),
    ScoreBand::new(28, 30, 5),
];

const GESTALT: [ScoreBand; 5] = [
    ScoreBand::new(0, 4, 1),
    ScoreBand::new(5, 8, 2),
    ScoreBand::new(9, 12, 3),
    ScoreBand::new(13, 16, 4),
    ScoreBand::new(17, 20, 5),
];

const COORDINATION: [ScoreBand; 5] = [
    ScoreBand::new(0, 10, 1),
    ScoreBand::new(11, 20, 2),
    ScoreBand::new(21, 30, 3),
    ScoreBand::new(31, 38, 4),
    ScoreBand::new(39, 45, 5),
];

const MEMORY: [ScoreBand; 5] = [
    ScoreBand::new(0, 3, 1),
    ScoreBand::new(4, 7, 2),
    ScoreBand::new(8, 11, 3),
    ScoreBand::new(12, 14, 4),
    ScoreBand::new(15, 18, 5),
];

const VERBAL_COMPREHENSION: [ScoreBand; 5] = [
    ScoreBand::new(0, 9, 1),
    ScoreBand::new(10, 17, 2),
    ScoreBand::new(18, 25, 3),
    ScoreBand::new(26, 32, 4),
    ScoreBand::new(33, 36, 5),
];

/// Standardize a raw score for a component named by its display name.
///
/// An unknown component is a configuration error. A raw score outside the
/// component's bands yields `0`.
pub fn standardize(component: &str, raw: i64) -> Result<u8> {
    let component: Component = component.parse()?;
    let score = component.standardize(raw);
    tracing::debug!(%component, raw, score, "standardized score");
    Ok(score)
}
