//! Narrative generation from standardized composite scores.
//!
//! Three axes drive the text: hypoxia, glycolysis, immune. Each axis is an
//! independent band classification of its composite z-score against the
//! training-population statistics, followed by a fixed template lookup.
//! Hypoxia always contributes a sentence; glycolysis and immune stay silent
//! in the moderate band. That asymmetry is inherited behavior of the
//! deployed system and is pinned by tests.

use crate::features::{FeatureVector, GLYCOLYSIS_SCORE_IDX, HYPOXIA_SCORE_IDX, IMMUNE_SCORE_IDX};
use crate::model::ScalerStats;

/// Standardized deviation beyond which an axis reads as elevated (or, with
/// the opposite sign, reduced).
const BAND_THRESHOLD: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Band {
    Elevated,
    Moderate,
    Reduced,
}

fn band(z: f64) -> Band {
    if z > BAND_THRESHOLD {
        Band::Elevated
    } else if z < -BAND_THRESHOLD {
        Band::Reduced
    } else {
        Band::Moderate
    }
}

const HYPOXIA_ELEVATED: &str = "The molecular profile suggests a prominent hypoxic tumor microenvironment. \
     Elevated expression of hypoxia-related genes (HIF1A, CA9, VEGFA) is associated with \
     aggressive tumor behavior and resistance to conventional therapies.";

const HYPOXIA_REDUCED: &str = "Hypoxia-related markers are below the population average, suggesting a relatively \
     normoxic tumor environment, which is generally associated with better therapeutic sensitivity.";

const HYPOXIA_MODERATE: &str = "Hypoxia markers are within the moderate range, consistent with typical tumor microenvironment patterns.";

const GLYCOLYSIS_ELEVATED: &str = "Metabolic analysis indicates upregulated glycolysis. This pattern resembles the Warburg effect, \
     suggesting the tumor is utilizing glycolytic pathways to support rapid proliferation.";

const GLYCOLYSIS_REDUCED: &str = "Glycolytic gene expression is lower than the cohort average, suggesting less reliance on \
     glycolysis for energy metabolism.";

const IMMUNE_REDUCED: &str = "The immune score is notably low. This resembles an 'immune-cold' phenotype, \
     which is often associated with immune evasion and a lack of T-cell infiltration.";

const IMMUNE_ELEVATED: &str = "Immune markers are elevated, suggesting an active immune response or infiltration within the tumor microenvironment.";

fn hypoxia_sentence(band: Band) -> &'static str {
    match band {
        Band::Elevated => HYPOXIA_ELEVATED,
        Band::Reduced => HYPOXIA_REDUCED,
        Band::Moderate => HYPOXIA_MODERATE,
    }
}

fn glycolysis_sentence(band: Band) -> Option<&'static str> {
    match band {
        Band::Elevated => Some(GLYCOLYSIS_ELEVATED),
        Band::Reduced => Some(GLYCOLYSIS_REDUCED),
        Band::Moderate => None,
    }
}

fn immune_sentence(band: Band) -> Option<&'static str> {
    match band {
        Band::Reduced => Some(IMMUNE_REDUCED),
        Band::Elevated => Some(IMMUNE_ELEVATED),
        Band::Moderate => None,
    }
}

/// Build the narrative for a feature row, in hypoxia → glycolysis → immune
/// order, joined with single spaces.
pub fn explain(features: &FeatureVector, scaler: &ScalerStats) -> String {
    let z = scaler.z_scores(features);

    let mut sentences = vec![hypoxia_sentence(band(z[HYPOXIA_SCORE_IDX]))];
    sentences.extend(glycolysis_sentence(band(z[GLYCOLYSIS_SCORE_IDX])));
    sentences.extend(immune_sentence(band(z[IMMUNE_SCORE_IDX])));
    sentences.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{derive, FEATURE_COUNT, FEATURE_NAMES};

    /// Scaler whose statistics put each composite score's z exactly where
    /// the test wants it: mean 0 and scale 1 for the composites, and means
    /// equal to the derived values elsewhere so only the composites matter.
    fn scaler_for(features: &FeatureVector, hypoxia_z: f64, glycolysis_z: f64, immune_z: f64) -> ScalerStats {
        let mut mean = features.values().to_vec();
        let scale = vec![1.0; FEATURE_COUNT];
        mean[HYPOXIA_SCORE_IDX] = features.values()[HYPOXIA_SCORE_IDX] - hypoxia_z;
        mean[GLYCOLYSIS_SCORE_IDX] = features.values()[GLYCOLYSIS_SCORE_IDX] - glycolysis_z;
        mean[IMMUNE_SCORE_IDX] = features.values()[IMMUNE_SCORE_IDX] - immune_z;
        ScalerStats { mean, scale }
    }

    fn features() -> FeatureVector {
        derive(
            &serde_json::from_value(serde_json::json!({
                "HIF1A": 5.0, "CA9": 5.0, "VEGFA": 5.0, "SLC2A1": 5.0, "LDHA": 5.0,
                "HK2": 5.0, "PFKP": 5.0, "PDK1": 5.0, "CD274": 5.0, "CTLA4": 5.0,
                "TGFB1": 5.0,
            }))
            .unwrap(),
        )
    }

    #[test]
    fn all_moderate_emits_only_the_neutral_hypoxia_sentence() {
        let f = features();
        let text = explain(&f, &scaler_for(&f, 0.0, 0.0, 0.0));
        assert_eq!(text, HYPOXIA_MODERATE);
    }

    #[test]
    fn band_boundaries_are_exclusive() {
        // z == 1.0 and z == -1.0 are still the moderate band.
        let f = features();
        assert_eq!(explain(&f, &scaler_for(&f, 1.0, 1.0, -1.0)), HYPOXIA_MODERATE);
        assert_eq!(band(1.0), Band::Moderate);
        assert_eq!(band(-1.0), Band::Moderate);
        assert_eq!(band(1.0001), Band::Elevated);
        assert_eq!(band(-1.0001), Band::Reduced);
    }

    #[test]
    fn sentences_compose_in_fixed_axis_order() {
        let f = features();
        let text = explain(&f, &scaler_for(&f, 1.5, 2.0, -1.5));
        let expected = format!("{HYPOXIA_ELEVATED} {GLYCOLYSIS_ELEVATED} {IMMUNE_REDUCED}");
        assert_eq!(text, expected);
    }

    #[test]
    fn glycolysis_and_immune_stay_silent_in_the_moderate_band() {
        let f = features();
        let text = explain(&f, &scaler_for(&f, -1.5, 0.5, 0.5));
        assert_eq!(text, HYPOXIA_REDUCED);
    }

    #[test]
    fn reduced_glycolysis_and_elevated_immune_have_their_own_sentences() {
        let f = features();
        let text = explain(&f, &scaler_for(&f, 0.0, -2.0, 2.0));
        let expected = format!("{HYPOXIA_MODERATE} {GLYCOLYSIS_REDUCED} {IMMUNE_ELEVATED}");
        assert_eq!(text, expected);
    }

    #[test]
    fn composite_positions_follow_the_published_order() {
        assert_eq!(FEATURE_NAMES[HYPOXIA_SCORE_IDX], "Hypoxia_score");
        assert_eq!(FEATURE_NAMES[GLYCOLYSIS_SCORE_IDX], "Glycolysis_score");
        assert_eq!(FEATURE_NAMES[IMMUNE_SCORE_IDX], "Immune_score");
    }
}
