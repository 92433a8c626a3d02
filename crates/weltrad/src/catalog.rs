use palette::Srgba;
use serde::Serialize;
use serde_with::DeserializeFromStr;
use strum::{Display as StrumDisplay, EnumIter, EnumString, IntoEnumIterator};

/// The twelve worldviews, in dial order starting at the top.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
pub enum Worldview {
    #[strum(serialize = "Materialismus", serialize = "0")]
    Materialismus,
    #[strum(serialize = "Sensualismus", serialize = "1")]
    Sensualismus,
    #[strum(to_string = "Phänomenalismus", serialize = "Phaenomenalismus", serialize = "2")]
    Phaenomenalismus,
    #[strum(serialize = "Realismus", serialize = "3")]
    Realismus,
    #[strum(serialize = "Dynamismus", serialize = "4")]
    Dynamismus,
    #[strum(serialize = "Individualismus", serialize = "5")]
    Individualismus,
    #[strum(serialize = "Spiritualismus", serialize = "6")]
    Spiritualismus,
    #[strum(serialize = "Pneumatismus", serialize = "7")]
    Pneumatismus,
    #[strum(serialize = "Psychismus", serialize = "8")]
    Psychismus,
    #[strum(serialize = "Idealismus", serialize = "9")]
    Idealismus,
    #[strum(serialize = "Rationalismus", serialize = "10")]
    Rationalismus,
    #[strum(serialize = "Mathematismus", serialize = "11")]
    Mathematismus,
}

pub const WORLDVIEW_COUNT: usize = 12;

impl Worldview {
    pub fn as_index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::iter().nth(idx)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    Interesse,
    Zustimmung,
    Wut,
    Ablehnung,
    Inspiration,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reaction {
    pub kind: ReactionKind,
    pub color: Srgba<f64>,
}

impl Reaction {
    pub fn new(kind: ReactionKind, color: Srgba<f64>) -> Self {
        Self { kind, color }
    }
}

/// Neutral entry first, then right, down, left, up.
pub fn default_reactions() -> Vec<Reaction> {
    vec![
        Reaction::new(ReactionKind::Interesse, Srgba::new(1.0, 1.0, 1.0, 0.6)),
        Reaction::new(
            ReactionKind::Zustimmung,
            Srgba::new(6.0 / 255.0, 154.0 / 255.0, 26.0 / 255.0, 0.6),
        ),
        Reaction::new(
            ReactionKind::Wut,
            Srgba::new(208.0 / 255.0, 12.0 / 255.0, 68.0 / 255.0, 0.6),
        ),
        Reaction::new(
            ReactionKind::Ablehnung,
            Srgba::new(5.0 / 255.0, 40.0 / 255.0, 46.0 / 255.0, 0.6),
        ),
        Reaction::new(
            ReactionKind::Inspiration,
            Srgba::new(235.0 / 255.0, 201.0 / 255.0, 50.0 / 255.0, 0.6),
        ),
    ]
}

/// Border colour for the quadrant indicator: transparent without a
/// candidate, otherwise the colour of the reaction in that sector.
pub fn indicator_color(reactions: &[Reaction], indicator: i8) -> Srgba<f64> {
    usize::try_from(indicator)
        .ok()
        .and_then(|sector| reactions.get(sector + 1))
        .map(|r| r.color)
        .unwrap_or(Srgba::new(0.0, 0.0, 0.0, 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worldview_deserialization() {
        let cases = vec![
            ("\"materialismus\"", Worldview::Materialismus),
            ("\"Phänomenalismus\"", Worldview::Phaenomenalismus),
            ("\"phaenomenalismus\"", Worldview::Phaenomenalismus),
            ("\"11\"", Worldview::Mathematismus),
        ];

        for (json, expected) in cases {
            let deserialized: Worldview = serde_json::from_str(json).unwrap();
            assert_eq!(deserialized, expected);
        }
    }

    #[test]
    fn worldview_indices_round_trip_through_dial_positions() {
        assert_eq!(Worldview::iter().count(), WORLDVIEW_COUNT);
        assert_eq!(Worldview::from_index(4), Some(Worldview::Dynamismus));
        assert_eq!(Worldview::from_index(12), None);
        assert_eq!(Worldview::Idealismus.as_index(), 9);
    }

    #[test]
    fn test_reaction_deserialization() {
        let kind: ReactionKind = serde_json::from_str("\"WUT\"").unwrap();
        assert_eq!(kind, ReactionKind::Wut);
        assert_eq!(ReactionKind::Zustimmung.to_string(), "zustimmung");
    }

    #[test]
    fn indicator_picks_sector_colour() {
        let reactions = default_reactions();
        assert_eq!(indicator_color(&reactions, -1).alpha, 0.0);
        assert_eq!(indicator_color(&reactions, 1), reactions[2].color);
        assert_eq!(indicator_color(&reactions, 7).alpha, 0.0);
    }
}
