use serde::Serialize;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Perfect,
    Pass,
    Borderline,
    Fail,
}

impl Band {
    pub fn is_passing(self) -> bool {
        matches!(self, Band::Perfect | Band::Pass)
    }

    pub fn message(self, score: usize, total: usize) -> String {
        let lead = match self {
            Band::Perfect => "Congrats!",
            Band::Pass => "Well done!",
            Band::Borderline => "Almost there!",
            Band::Fail => "Oops, try again!",
        };
        format!("{} You scored {}/{}", lead, score, total)
    }
}

/// Threshold table used when the score is not perfect. Rows are checked
/// from the highest minimum down; no match means `Band::Fail`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreBands {
    thresholds: Vec<(usize, Band)>,
}

impl ScoreBands {
    pub fn new(mut thresholds: Vec<(usize, Band)>) -> Self {
        thresholds.sort_by(|a, b| b.0.cmp(&a.0));
        Self { thresholds }
    }

    pub fn with_scores(pass: usize, borderline: usize) -> Self {
        Self::new(vec![(pass, Band::Pass), (borderline, Band::Borderline)])
    }

    pub fn classify(&self, score: usize, total: usize) -> Band {
        if total > 0 && score == total {
            return Band::Perfect;
        }
        self.thresholds
            .iter()
            .find(|(min, _)| score >= *min)
            .map_or(Band::Fail, |(_, band)| *band)
    }
}

impl Default for ScoreBands {
    fn default() -> Self {
        Self::with_scores(4, 3)
    }
}

/// When a retake is offered after submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetakePolicy {
    Always,
    #[default]
    BelowPass,
}

impl RetakePolicy {
    pub fn allows(self, band: Band) -> bool {
        match self {
            RetakePolicy::Always => true,
            RetakePolicy::BelowPass => !band.is_passing(),
        }
    }
}

impl FromStr for RetakePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(RetakePolicy::Always),
            "below-pass" | "below_pass" => Ok(RetakePolicy::BelowPass),
            other => Err(format!(
                "unknown retake policy '{}', expected 'always' or 'below-pass'",
                other
            )),
        }
    }
}

/// Result of a submitted quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub score: usize,
    pub total: usize,
    pub band: Band,
    pub retake_offered: bool,
}

impl Outcome {
    pub fn message(&self) -> String {
        self.band.message(self.score, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table() {
        let bands = ScoreBands::default();
        assert_eq!(bands.classify(5, 5), Band::Perfect);
        assert_eq!(bands.classify(4, 5), Band::Pass);
        assert_eq!(bands.classify(3, 5), Band::Borderline);
        assert_eq!(bands.classify(2, 5), Band::Fail);
        assert_eq!(bands.classify(0, 5), Band::Fail);
    }

    #[test]
    fn perfect_beats_thresholds() {
        assert_eq!(ScoreBands::default().classify(2, 2), Band::Perfect);
    }

    #[test]
    fn table_order_does_not_matter() {
        let bands = ScoreBands::new(vec![(3, Band::Borderline), (8, Band::Pass)]);
        assert_eq!(bands.classify(9, 10), Band::Pass);
        assert_eq!(bands.classify(5, 10), Band::Borderline);
    }

    #[test]
    fn retake_gating() {
        assert!(!RetakePolicy::BelowPass.allows(Band::Perfect));
        assert!(!RetakePolicy::BelowPass.allows(Band::Pass));
        assert!(RetakePolicy::BelowPass.allows(Band::Borderline));
        assert!(RetakePolicy::Always.allows(Band::Perfect));
        assert_eq!("always".parse::<RetakePolicy>(), Ok(RetakePolicy::Always));
        assert!("sometimes".parse::<RetakePolicy>().is_err());
    }

    #[test]
    fn messages() {
        assert_eq!(Band::Perfect.message(5, 5), "Congrats! You scored 5/5");
        assert_eq!(Band::Fail.message(2, 5), "Oops, try again! You scored 2/5");
    }
}
