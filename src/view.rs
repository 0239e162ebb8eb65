//! Presentation skins over the screening contract.
//!
//! Two cosmetic variants of the same page share one form, one result panel
//! and one handler; nothing here makes decisions about the prediction.

use crate::types::prediction::{PredictionResult, ScreeningOutcome};
use serde::Deserialize;

const SKIN_CARD: &str = include_str!("../assets/skin_card.html");
const SKIN_PLAIN: &str = include_str!("../assets/skin_plain.html");

/// Presentation skin for the screening page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Skin {
    /// Rounded translucent card over a tinted background
    #[default]
    Card,
    /// Unstyled variant of the same page
    Plain,
}

impl Skin {
    fn template(&self) -> &'static str {
        match self {
            Skin::Card => SKIN_CARD,
            Skin::Plain => SKIN_PLAIN,
        }
    }
}

/// Render the empty screening form.
pub fn render_form(skin: Skin) -> String {
    skin.template().replace("{{result}}", "")
}

/// Render the form with the result panel for a classified submission.
pub fn render_result(skin: Skin, result: &PredictionResult) -> String {
    skin.template().replace("{{result}}", &result_panel(result))
}

/// Render the form with an error panel for a failed submission.
pub fn render_error(skin: Skin, message: &str) -> String {
    let panel = format!(
        r#"<div class="result failed">
  <h2>Screening failed</h2>
  <p>{}</p>
</div>"#,
        escape(message)
    );
    skin.template().replace("{{result}}", &panel)
}

fn result_panel(result: &PredictionResult) -> String {
    let (css_class, heading) = match result.outcome {
        ScreeningOutcome::CkdIndicated => ("indicated", result.outcome.message()),
        ScreeningOutcome::NotIndicated => ("clear", result.outcome.message()),
    };

    let confidence = result.confidence();
    let mut detail_rows = String::new();
    for (column, value) in &result.model_row {
        detail_rows.push_str(&format!(
            "      <tr><td>{}</td><td>{}</td></tr>\n",
            escape(column),
            value
        ));
    }

    format!(
        r#"<div class="result {css_class}">
  <h2>{heading}</h2>
  <div class="progress"><div class="progress-fill" style="width: {width:.0}%"></div></div>
  <p>{caption}: <strong>{percent}</strong></p>
  <details>
    <summary>Submitted model input</summary>
    <table>
      <tr><th>Feature</th><th>Value</th></tr>
{detail_rows}    </table>
  </details>
  <p><small>Screening {id} at {timestamp}</small></p>
</div>"#,
        css_class = css_class,
        heading = heading,
        width = confidence * 100.0,
        caption = result.outcome.probability_caption(),
        percent = result.confidence_percent(),
        detail_rows = detail_rows,
        id = escape(&result.screening_id),
        timestamp = result.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}

/// Minimal HTML escaping for text interpolated into panels.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> PredictionResult {
        PredictionResult::new(
            ScreeningOutcome::NotIndicated,
            [0.1266, 0.8734],
            vec![("BMI".to_string(), 25.0), ("Smoking".to_string(), 0.0)],
        )
    }

    #[test]
    fn test_form_has_all_eight_fields() {
        for skin in [Skin::Card, Skin::Plain] {
            let page = render_form(skin);
            for field in [
                "bmi",
                "smoking",
                "alcohol_consumption",
                "physical_activity",
                "diet_quality",
                "family_history_kidney_disease",
                "antidiabetic_medications",
                "fatigue_levels",
            ] {
                assert!(
                    page.contains(&format!("name=\"{}\"", field)),
                    "{:?} skin is missing field {}",
                    skin,
                    field
                );
            }
        }
    }

    #[test]
    fn test_result_panel_shows_confidence_percent() {
        let page = render_result(Skin::Card, &sample_result());

        assert!(page.contains("87.34%"));
        assert!(page.contains("result clear"));
        assert!(page.contains("Chronic kidney disease not indicated"));
    }

    #[test]
    fn test_indicated_result_uses_alert_styling() {
        let result = PredictionResult::new(
            ScreeningOutcome::CkdIndicated,
            [0.91, 0.09],
            Vec::new(),
        );
        let page = render_result(Skin::Plain, &result);

        assert!(page.contains("result indicated"));
        assert!(page.contains("91.00%"));
    }

    #[test]
    fn test_result_panel_reveals_model_row() {
        let page = render_result(Skin::Card, &sample_result());

        assert!(page.contains("<td>BMI</td><td>25</td>"));
        assert!(page.contains("<td>Smoking</td><td>0</td>"));
    }

    #[test]
    fn test_error_panel_escapes_message() {
        let page = render_error(Skin::Plain, "bad <input>");

        assert!(page.contains("bad &lt;input&gt;"));
        assert!(page.contains("result failed"));
    }

    #[test]
    fn test_skin_param_parsing() {
        #[derive(Deserialize)]
        struct Params {
            #[serde(default)]
            skin: Skin,
        }

        let parsed: Params = serde_json::from_str(r#"{"skin": "plain"}"#).unwrap();
        assert_eq!(parsed.skin, Skin::Plain);

        let defaulted: Params = serde_json::from_str("{}").unwrap();
        assert_eq!(defaulted.skin, Skin::Card);
    }
}
