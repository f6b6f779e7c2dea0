//! Quiz mechanics: hidden trait scores and the alignment they resolve to.

use serde::{Deserialize, Serialize};

/// Trait changes carried by a scenario option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TraitDeltas {
    #[serde(default)]
    pub charisma: i32,
    #[serde(default)]
    pub karma: i32,
    #[serde(default)]
    pub weird: i32,
}

impl TraitDeltas {
    pub fn new(charisma: i32, karma: i32, weird: i32) -> Self {
        Self {
            charisma,
            karma,
            weird,
        }
    }
}

/// Accumulated trait scores for one run. All three start at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TraitScores {
    pub charisma: i32,
    pub karma: i32,
    pub weird: i32,
}

impl TraitScores {
    pub fn new(charisma: i32, karma: i32, weird: i32) -> Self {
        Self {
            charisma,
            karma,
            weird,
        }
    }

    /// Add an option's deltas to the running totals.
    pub fn apply(&mut self, deltas: &TraitDeltas) {
        self.charisma += deltas.charisma;
        self.karma += deltas.karma;
        self.weird += deltas.weird;
    }

    /// Resolve the final alignment for these scores.
    pub fn alignment(&self) -> Alignment {
        Alignment::classify(self.charisma, self.karma, self.weird)
    }
}

/// The final verdict shown on the summary page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alignment {
    ChaoticGoodElevatorTherapist,
    SoftSpokenMoralBackbone,
    CorporateVillainInAVelvetSuit,
    AnxiousBystanderWithMainCharacterEnergy,
    ResidentElevatorCryptid,
    MildlyConcerningButtonMasher,
    /// Fallback when no other rule matches.
    ReasonablyNormalHuman,
}

impl Alignment {
    /// Classify (charisma, karma, weird). Rules are checked in order and the
    /// first match wins.
    pub fn classify(charisma: i32, karma: i32, weird: i32) -> Self {
        if karma >= 6 && charisma >= 6 {
            Alignment::ChaoticGoodElevatorTherapist
        } else if karma >= 6 {
            Alignment::SoftSpokenMoralBackbone
        } else if karma < 0 && weird > 5 {
            Alignment::CorporateVillainInAVelvetSuit
        } else if weird >= 6 && charisma >= 4 {
            Alignment::AnxiousBystanderWithMainCharacterEnergy
        } else if weird >= 6 {
            Alignment::ResidentElevatorCryptid
        } else if karma < 0 {
            Alignment::MildlyConcerningButtonMasher
        } else {
            Alignment::ReasonablyNormalHuman
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            Alignment::ChaoticGoodElevatorTherapist => "Chaotic Good Elevator Therapist",
            Alignment::SoftSpokenMoralBackbone => "Soft-spoken Moral Backbone",
            Alignment::CorporateVillainInAVelvetSuit => "Corporate Villain in a Velvet Suit",
            Alignment::AnxiousBystanderWithMainCharacterEnergy => {
                "Anxious Bystander with Main-Character Energy"
            }
            Alignment::ResidentElevatorCryptid => "Resident Elevator Cryptid",
            Alignment::MildlyConcerningButtonMasher => "Mildly Concerning Button Masher",
            Alignment::ReasonablyNormalHuman => "Reasonably Normal Human (Suspicious)",
        }
    }
}

impl std::fmt::Display for Alignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_examples() {
        assert_eq!(
            Alignment::classify(7, 7, 0).label(),
            "Chaotic Good Elevator Therapist"
        );
        assert_eq!(
            Alignment::classify(2, 7, 0).label(),
            "Soft-spoken Moral Backbone"
        );
        assert_eq!(
            Alignment::classify(0, -1, 6).label(),
            "Corporate Villain in a Velvet Suit"
        );
        assert_eq!(
            Alignment::classify(0, 0, 0).label(),
            "Reasonably Normal Human (Suspicious)"
        );
    }

    #[test]
    fn test_classify_remaining_rules() {
        assert_eq!(
            Alignment::classify(4, 0, 6),
            Alignment::AnxiousBystanderWithMainCharacterEnergy
        );
        assert_eq!(Alignment::classify(3, 0, 6), Alignment::ResidentElevatorCryptid);
        assert_eq!(
            Alignment::classify(10, -3, 2),
            Alignment::MildlyConcerningButtonMasher
        );
    }

    #[test]
    fn test_rule_order_wins() {
        // High karma beats high weirdness.
        assert_eq!(Alignment::classify(6, 6, 20), Alignment::ChaoticGoodElevatorTherapist);
        // Negative karma with weird > 5 is the villain, not the cryptid.
        assert_eq!(Alignment::classify(9, -1, 6), Alignment::CorporateVillainInAVelvetSuit);
        // weird == 5 is not enough for the villain rule.
        assert_eq!(Alignment::classify(0, -1, 5), Alignment::MildlyConcerningButtonMasher);
    }

    #[test]
    fn test_classify_is_total() {
        for c in -10..=10 {
            for k in -10..=10 {
                for w in -10..=10 {
                    let alignment = Alignment::classify(c, k, w);
                    assert!(!alignment.label().is_empty());
                }
            }
        }
    }

    #[test]
    fn test_scores_accumulate() {
        let mut scores = TraitScores::default();
        scores.apply(&TraitDeltas::new(2, -1, 0));
        scores.apply(&TraitDeltas::new(1, 3, 4));

        assert_eq!(scores, TraitScores::new(3, 2, 4));
        assert_eq!(scores.alignment(), Alignment::ReasonablyNormalHuman);
    }
}
