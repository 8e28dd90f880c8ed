//! Sentiment scoring for post text.
use vader_sentiment::SentimentIntensityAnalyzer;

/// Anything that can turn text into a compound polarity in `[-1.0, 1.0]`.
pub trait PolarityAnalyzer {
    fn compound(&self, text: &str) -> f64;
}

/// VADER lexicon scorer. Building one loads the lexicon, so build one per fetch and
/// reuse it for every post.
pub struct VaderAnalyzer {
    inner: SentimentIntensityAnalyzer<'static>,
}

impl VaderAnalyzer {
    pub fn new() -> Self {
        Self {
            inner: SentimentIntensityAnalyzer::new(),
        }
    }
}

impl Default for VaderAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for VaderAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("VaderAnalyzer")
    }
}

impl PolarityAnalyzer for VaderAnalyzer {
    fn compound(&self, text: &str) -> f64 {
        self.inner
            .polarity_scores(text)
            .get("compound")
            .copied()
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compound_sign_follows_polarity() {
        let vader = VaderAnalyzer::new();
        assert!(vader.compound("I love this!") > 0.0);
        assert!(vader.compound("I hate this.") < 0.0);
    }

    #[test]
    fn scores_stay_in_range() {
        let vader = VaderAnalyzer::default();
        for text in [
            "",
            "The sky is blue.",
            "BEST. DAY. EVER!!! :) :) :)",
            "awful horrible terrible disgusting",
        ] {
            let score = vader.compound(text);
            assert!((-1.0..=1.0).contains(&score), "{text:?} scored {score}");
        }
    }

    #[test]
    fn neutral_text_scores_zero() {
        assert_eq!(VaderAnalyzer::new().compound("The sky is blue."), 0.0);
    }
}
