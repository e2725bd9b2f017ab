/// Risk explanation engine.
///
/// Produces a structured attribution (primary driver plus weighted
/// contributing factors) and a short narrative summary for a source's
/// current risk. The weighting is a fixed prior on driver importance,
/// identical across all sources — it is not derived from the data. With
/// the current constants both factors classify as "medium" impact and
/// rainfall is always the primary driver; that is intentional.
///
/// Pure, no I/O; recomputed on every orchestration pass and never
/// persisted.

use serde::Serialize;

use crate::model::Trend;

/// Fixed prior weights on driver importance.
pub const RAINFALL_WEIGHT: f64 = 0.55;
pub const WATER_LEVEL_WEIGHT: f64 = 0.45;

/// One factor's contribution to the current risk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorContribution {
    pub factor: String,
    pub value: f64,
    pub weight: f64,
    /// "low" | "medium" | "high"
    pub impact: String,
}

/// Full explanation payload attached to dashboard/realtime events.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskExplanation {
    pub risk_score: f64,
    /// "rainfall" | "water_level"
    pub primary_driver: String,
    pub contributors: Vec<FactorContribution>,
    pub trend: Trend,
    pub summary: String,
}

/// Classify a weight into an impact band.
pub fn classify_impact(weight: f64) -> &'static str {
    if weight >= 0.6 {
        "high"
    } else if weight >= 0.3 {
        "medium"
    } else {
        "low"
    }
}

fn explain_factors(rainfall: f64, water_level: f64) -> (&'static str, Vec<FactorContribution>) {
    let factors = vec![
        FactorContribution {
            factor: "rainfall".to_string(),
            value: rainfall,
            weight: RAINFALL_WEIGHT,
            impact: classify_impact(RAINFALL_WEIGHT).to_string(),
        },
        FactorContribution {
            factor: "water_level".to_string(),
            value: water_level,
            weight: WATER_LEVEL_WEIGHT,
            impact: classify_impact(WATER_LEVEL_WEIGHT).to_string(),
        },
    ];

    let primary = if RAINFALL_WEIGHT > WATER_LEVEL_WEIGHT {
        "rainfall"
    } else {
        "water_level"
    };

    (primary, factors)
}

/// Templated natural-language summary with a trend clause.
pub fn generate_summary(risk_score: f64, primary: &str, trend: Trend) -> String {
    let mut summary = format!("Risk is {:.1}%, driven mainly by {}.", risk_score, primary);

    match trend {
        Trend::Rising => summary.push_str(" The situation is worsening over time."),
        Trend::Falling => summary.push_str(" Conditions are improving gradually."),
        Trend::Stable => summary.push_str(" The situation is stable."),
    }

    summary
}

/// Build the full explanation for a source's readings, score, and trend.
pub fn explain_risk(rainfall: f64, water_level: f64, risk_score: f64, trend: Trend) -> RiskExplanation {
    let (primary, contributors) = explain_factors(rainfall, water_level);
    let summary = generate_summary(risk_score, primary, trend);

    RiskExplanation {
        risk_score,
        primary_driver: primary.to_string(),
        contributors,
        trend,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_impact_bands() {
        assert_eq!(classify_impact(0.6), "high");
        assert_eq!(classify_impact(0.55), "medium");
        assert_eq!(classify_impact(0.3), "medium");
        assert_eq!(classify_impact(0.29), "low");
    }

    #[test]
    fn test_both_factors_classify_medium_under_current_weights() {
        let explanation = explain_risk(30.0, 10.0, 100.0, Trend::Stable);
        for contributor in &explanation.contributors {
            assert_eq!(
                contributor.impact, "medium",
                "fixed weights 0.55/0.45 both land in the medium band"
            );
        }
    }

    #[test]
    fn test_rainfall_is_primary_driver() {
        let explanation = explain_risk(30.0, 10.0, 100.0, Trend::Stable);
        assert_eq!(explanation.primary_driver, "rainfall");
        assert_eq!(explanation.contributors[0].factor, "rainfall");
        assert_eq!(explanation.contributors[0].weight, RAINFALL_WEIGHT);
        assert_eq!(explanation.contributors[1].factor, "water_level");
    }

    #[test]
    fn test_summary_template_and_trend_clauses() {
        assert_eq!(
            generate_summary(100.0, "rainfall", Trend::Rising),
            "Risk is 100.0%, driven mainly by rainfall. The situation is worsening over time."
        );
        assert_eq!(
            generate_summary(42.5, "rainfall", Trend::Falling),
            "Risk is 42.5%, driven mainly by rainfall. Conditions are improving gradually."
        );
        assert_eq!(
            generate_summary(0.0, "rainfall", Trend::Stable),
            "Risk is 0.0%, driven mainly by rainfall. The situation is stable."
        );
    }

    #[test]
    fn test_explanation_serializes_with_expected_field_names() {
        let explanation = explain_risk(30.0, 10.0, 100.0, Trend::Rising);
        let json = serde_json::to_value(&explanation).expect("explanation serializes");

        assert_eq!(json["risk_score"], 100.0);
        assert_eq!(json["primary_driver"], "rainfall");
        assert_eq!(json["trend"], "rising");
        assert_eq!(json["contributors"][0]["factor"], "rainfall");
        assert_eq!(json["contributors"][0]["impact"], "medium");
        assert!(json["summary"].as_str().unwrap().contains("worsening"));
    }
}
