use serde::{Deserialize, Serialize};

/// Percent at which the exam-bar note is added to a notification.
pub const EXAM_BAR_PERCENT: f64 = 20.0;

/// Absenteeism tiers, each gating a one-shot notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    #[serde(rename = "7%")]
    Seven,
    #[serde(rename = "10%")]
    Ten,
    #[serde(rename = "15%")]
    Fifteen,
}

impl Tier {
    /// Ascending order.
    pub const ALL: [Tier; 3] = [Tier::Seven, Tier::Ten, Tier::Fifteen];

    pub fn threshold(self) -> f64 {
        match self {
            Tier::Seven => 7.0,
            Tier::Ten => 10.0,
            Tier::Fifteen => 15.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Seven => "7%",
            Tier::Ten => "10%",
            Tier::Fifteen => "15%",
        }
    }

    pub fn is_hit(self, percent: f64) -> bool {
        percent >= self.threshold()
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Tiers reached at `percent`, lowest first.
pub fn tiers_hit(percent: f64) -> Vec<Tier> {
    Tier::ALL
        .into_iter()
        .filter(|tier| tier.is_hit(percent))
        .collect()
}

pub fn format_tiers(tiers: &[Tier]) -> String {
    if tiers.is_empty() {
        return "-".to_string();
    }
    tiers
        .iter()
        .map(|tier| tier.label())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn reaches_exam_bar(percent: f64) -> bool {
    percent >= EXAM_BAR_PERCENT
}

/// Ratchet flags recording which tiers have already been notified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierFlags {
    pub sent7: bool,
    pub sent10: bool,
    pub sent15: bool,
}

impl TierFlags {
    pub fn is_set(&self, tier: Tier) -> bool {
        match tier {
            Tier::Seven => self.sent7,
            Tier::Ten => self.sent10,
            Tier::Fifteen => self.sent15,
        }
    }

    /// Flags only move from unset to set.
    pub fn set(&mut self, tier: Tier) {
        match tier {
            Tier::Seven => self.sent7 = true,
            Tier::Ten => self.sent10 = true,
            Tier::Fifteen => self.sent15 = true,
        }
    }

    pub fn from_tiers(tiers: &[Tier]) -> Self {
        let mut flags = Self::default();
        for tier in tiers {
            flags.set(*tier);
        }
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers_hit_at_boundaries() {
        assert!(tiers_hit(0.0).is_empty());
        assert!(tiers_hit(6.99).is_empty());
        assert_eq!(tiers_hit(7.0), vec![Tier::Seven]);
        assert_eq!(tiers_hit(7.5), vec![Tier::Seven]);
        assert_eq!(tiers_hit(10.0), vec![Tier::Seven, Tier::Ten]);
        assert_eq!(tiers_hit(14.99), vec![Tier::Seven, Tier::Ten]);
        assert_eq!(tiers_hit(15.0), Tier::ALL.to_vec());
        assert_eq!(tiers_hit(250.0), Tier::ALL.to_vec());
    }

    #[test]
    fn test_format_tiers() {
        assert_eq!(format_tiers(&[]), "-");
        assert_eq!(format_tiers(&[Tier::Seven]), "7%");
        assert_eq!(format_tiers(&Tier::ALL), "7%, 10%, 15%");
    }

    #[test]
    fn test_exam_bar() {
        assert!(!reaches_exam_bar(19.99));
        assert!(reaches_exam_bar(20.0));
    }

    #[test]
    fn test_flags_ratchet() {
        let mut flags = TierFlags::from_tiers(&[Tier::Seven]);
        assert!(flags.is_set(Tier::Seven));
        assert!(!flags.is_set(Tier::Ten));

        flags.set(Tier::Fifteen);
        flags.set(Tier::Seven);
        assert_eq!(
            flags,
            TierFlags {
                sent7: true,
                sent10: false,
                sent15: true
            }
        );
    }

    #[test]
    fn test_tier_serializes_as_label() {
        let json = serde_json::to_string(&Tier::ALL).unwrap();
        assert_eq!(json, r#"["7%","10%","15%"]"#);
    }
}
