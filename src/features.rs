//! Feature derivation for the 11-gene expression panel.
//!
//! The fitted pipeline consumes a 17-column row whose order is a published
//! contract: scoring and explanation both index into it, and the model
//! silently produces wrong results if the order drifts. The order lives in
//! [`FEATURE_NAMES`] and nowhere else.

use serde::{Deserialize, Serialize};

pub const FEATURE_COUNT: usize = 17;

/// Column order the pipeline was trained on.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "CTLA4",
    "VEGFA",
    "PFKP",
    "Hypoxia_score",
    "PDK1",
    "HK2",
    "HIF1A",
    "SLC2A1",
    "Immune_score",
    "TGFB1",
    "CA9",
    "LDHA",
    "CD274",
    "Glycolysis_score",
    "Hypoxia_Glycolysis",
    "Hypoxia_Immune",
    "Glycolysis_Immune",
];

/// Positions of the composite scores within [`FEATURE_NAMES`].
///
/// Checked against the name table by a unit test so a reordering of the
/// published list cannot leave these behind.
pub const HYPOXIA_SCORE_IDX: usize = 3;
pub const IMMUNE_SCORE_IDX: usize = 8;
pub const GLYCOLYSIS_SCORE_IDX: usize = 13;

fn default_mode() -> String {
    "detailed".to_string()
}

/// One prediction request: the raw panel plus routing metadata.
///
/// Every measurement must be finite and non-negative; enforcement happens in
/// [`RawExpression::validate`], called by the HTTP layer before any
/// derivation runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawExpression {
    #[serde(default)]
    pub patient_id: Option<String>,
    /// Response mode: `"simple"` suppresses score and explanation in the
    /// response body; any other value behaves as `"detailed"`.
    #[serde(default = "default_mode")]
    pub mode: String,

    #[serde(rename = "HIF1A")]
    pub hif1a: f64,
    #[serde(rename = "CA9")]
    pub ca9: f64,
    #[serde(rename = "VEGFA")]
    pub vegfa: f64,
    #[serde(rename = "SLC2A1")]
    pub slc2a1: f64,
    #[serde(rename = "LDHA")]
    pub ldha: f64,
    #[serde(rename = "HK2")]
    pub hk2: f64,
    #[serde(rename = "PFKP")]
    pub pfkp: f64,
    #[serde(rename = "PDK1")]
    pub pdk1: f64,
    #[serde(rename = "CD274")]
    pub cd274: f64,
    #[serde(rename = "CTLA4")]
    pub ctla4: f64,
    #[serde(rename = "TGFB1")]
    pub tgfb1: f64,
}

impl RawExpression {
    fn measurements(&self) -> [(&'static str, f64); 11] {
        [
            ("HIF1A", self.hif1a),
            ("CA9", self.ca9),
            ("VEGFA", self.vegfa),
            ("SLC2A1", self.slc2a1),
            ("LDHA", self.ldha),
            ("HK2", self.hk2),
            ("PFKP", self.pfkp),
            ("PDK1", self.pdk1),
            ("CD274", self.cd274),
            ("CTLA4", self.ctla4),
            ("TGFB1", self.tgfb1),
        ]
    }

    /// Validate the panel, returning one message per offending field.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        for (gene, value) in self.measurements() {
            if !value.is_finite() {
                errors.push(format!("{gene}: must be a finite number"));
            } else if value < 0.0 {
                errors.push(format!("{gene}: must be non-negative"));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn is_simple(&self) -> bool {
        self.mode == "simple"
    }
}

/// A derived feature row in the published column order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Derive the 17-column feature row from a raw panel.
///
/// Pure and deterministic: identical input yields bit-identical output. The
/// row is assembled by walking [`FEATURE_NAMES`] so the published order is
/// the only place column positions are defined.
pub fn derive(raw: &RawExpression) -> FeatureVector {
    let hypoxia = mean(&[
        raw.hif1a, raw.ca9, raw.vegfa, raw.slc2a1, raw.ldha, raw.hk2, raw.pfkp, raw.pdk1,
    ]);
    let immune = mean(&[raw.cd274, raw.ctla4, raw.tgfb1]);
    let glycolysis = mean(&[raw.slc2a1, raw.hk2, raw.pfkp, raw.pdk1, raw.ldha]);

    let mut values = [0.0; FEATURE_COUNT];
    for (slot, name) in values.iter_mut().zip(FEATURE_NAMES) {
        *slot = match name {
            "HIF1A" => raw.hif1a,
            "CA9" => raw.ca9,
            "VEGFA" => raw.vegfa,
            "SLC2A1" => raw.slc2a1,
            "LDHA" => raw.ldha,
            "HK2" => raw.hk2,
            "PFKP" => raw.pfkp,
            "PDK1" => raw.pdk1,
            "CD274" => raw.cd274,
            "CTLA4" => raw.ctla4,
            "TGFB1" => raw.tgfb1,
            "Hypoxia_score" => hypoxia,
            "Immune_score" => immune,
            "Glycolysis_score" => glycolysis,
            "Hypoxia_Glycolysis" => hypoxia * glycolysis,
            "Hypoxia_Immune" => hypoxia * immune,
            "Glycolysis_Immune" => glycolysis * immune,
            other => unreachable!("unknown feature column {other}"),
        };
    }
    FeatureVector { values }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn panel() -> RawExpression {
        RawExpression {
            patient_id: None,
            mode: default_mode(),
            hif1a: 8.0,
            ca9: 2.0,
            vegfa: 6.0,
            slc2a1: 4.0,
            ldha: 10.0,
            hk2: 3.0,
            pfkp: 5.0,
            pdk1: 2.0,
            cd274: 1.0,
            ctla4: 2.0,
            tgfb1: 6.0,
        }
    }

    #[test]
    fn golden_column_order() {
        // The trained pipeline's column order, written out independently of
        // the constant. Reordering FEATURE_NAMES must fail here.
        let expected = [
            "CTLA4",
            "VEGFA",
            "PFKP",
            "Hypoxia_score",
            "PDK1",
            "HK2",
            "HIF1A",
            "SLC2A1",
            "Immune_score",
            "TGFB1",
            "CA9",
            "LDHA",
            "CD274",
            "Glycolysis_score",
            "Hypoxia_Glycolysis",
            "Hypoxia_Immune",
            "Glycolysis_Immune",
        ];
        assert_eq!(FEATURE_NAMES, expected);
    }

    #[test]
    fn composite_indices_match_name_table() {
        assert_eq!(FEATURE_NAMES[HYPOXIA_SCORE_IDX], "Hypoxia_score");
        assert_eq!(FEATURE_NAMES[IMMUNE_SCORE_IDX], "Immune_score");
        assert_eq!(FEATURE_NAMES[GLYCOLYSIS_SCORE_IDX], "Glycolysis_score");
    }

    #[test]
    fn derived_row_is_positional() {
        let raw = panel();
        let features = derive(&raw);
        let v = features.values();

        // Raw genes land at their trained positions, asserted by index.
        assert_eq!(v[0], raw.ctla4);
        assert_eq!(v[1], raw.vegfa);
        assert_eq!(v[2], raw.pfkp);
        assert_eq!(v[4], raw.pdk1);
        assert_eq!(v[5], raw.hk2);
        assert_eq!(v[6], raw.hif1a);
        assert_eq!(v[7], raw.slc2a1);
        assert_eq!(v[9], raw.tgfb1);
        assert_eq!(v[10], raw.ca9);
        assert_eq!(v[11], raw.ldha);
        assert_eq!(v[12], raw.cd274);
    }

    #[test]
    fn composite_scores_are_panel_means() {
        let features = derive(&panel());
        let v = features.values();

        // Hand-computed from the panel above.
        let hypoxia = (8.0 + 2.0 + 6.0 + 4.0 + 10.0 + 3.0 + 5.0 + 2.0) / 8.0;
        let immune = (1.0 + 2.0 + 6.0) / 3.0;
        let glycolysis = (4.0 + 3.0 + 5.0 + 2.0 + 10.0) / 5.0;

        assert_relative_eq!(v[HYPOXIA_SCORE_IDX], hypoxia);
        assert_relative_eq!(v[IMMUNE_SCORE_IDX], immune);
        assert_relative_eq!(v[GLYCOLYSIS_SCORE_IDX], glycolysis);
        assert_relative_eq!(v[14], hypoxia * glycolysis);
        assert_relative_eq!(v[15], hypoxia * immune);
        assert_relative_eq!(v[16], glycolysis * immune);
    }

    #[test]
    fn derivation_is_deterministic() {
        let raw = panel();
        assert_eq!(derive(&raw), derive(&raw));
    }

    #[test]
    fn validate_accepts_zero_and_rejects_negative() {
        let mut raw = panel();
        raw.ca9 = 0.0;
        assert!(raw.validate().is_ok());

        raw.ca9 = -0.1;
        raw.ldha = f64::NAN;
        let errors = raw.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| e.starts_with("CA9:")));
        assert!(errors.iter().any(|e| e.starts_with("LDHA:")));
    }

    #[test]
    fn mode_defaults_to_detailed() {
        let raw: RawExpression = serde_json::from_value(serde_json::json!({
            "HIF1A": 1.0, "CA9": 1.0, "VEGFA": 1.0, "SLC2A1": 1.0, "LDHA": 1.0,
            "HK2": 1.0, "PFKP": 1.0, "PDK1": 1.0, "CD274": 1.0, "CTLA4": 1.0,
            "TGFB1": 1.0,
        }))
        .unwrap();
        assert_eq!(raw.mode, "detailed");
        assert!(!raw.is_simple());
    }
}
