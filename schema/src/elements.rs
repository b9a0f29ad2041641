use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Crystal elements. `Null` is the element of plain physical techniques and
/// never interacts with the weakness table.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Element {
    Fire,
    Water,
    Earth,
    Wind,
    Light,
    Shadow,
    Null,
}

impl Element {
    /// The element this one is weak against.
    pub fn weakness(self) -> Element {
        use Element::*;

        match self {
            Fire => Water,
            Water => Earth,
            Earth => Wind,
            Wind => Fire,
            Light => Shadow,
            Shadow => Light,
            Null => Null,
        }
    }

    pub fn is_null(self) -> bool {
        self == Element::Null
    }

    /// Scaling applied when an ability of element `attacking` lands on a unit
    /// of element `defending`.
    ///
    /// Returns: 1.25 = the ability is the defender's weakness, 0.75 = the
    /// attacker's element is weak to the defender, 0.9 = same element,
    /// 1.0 = neutral or either side elementless.
    pub fn multiplier(attacking: Option<Element>, defending: Option<Element>) -> f64 {
        let (Some(attacking), Some(defending)) = (attacking, defending) else {
            return 1.0;
        };
        if attacking.is_null() || defending.is_null() {
            return 1.0;
        }

        if defending.weakness() == attacking {
            1.25
        } else if attacking.weakness() == defending {
            0.75
        } else if attacking == defending {
            0.9
        } else {
            1.0
        }
    }
}
