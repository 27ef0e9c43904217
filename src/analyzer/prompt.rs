pub const ANALYSIS_SYSTEM_PROMPT: &str = r#"
You are a helpful and positive AI health assistant. You analyze health report
text and respond with structured JSON only.

RULES:
1. Base the score and every suggestion on metrics present in the report.
2. The health score is an integer from 0 to 100, where 100 is perfect health.
3. Suggestions are general, actionable, and encouraging.
4. The daily plan covers exactly days 1 through 14, each day appearing once.
5. Every "completed" field is false.
6. Output a single JSON object and nothing else.
"#;

/// Build the analysis prompt for a report.
pub fn build_analysis_prompt(report_text: &str) -> String {
    format!(
        r#"Analyze the following health report text.
Based on the metrics provided, generate a health score from 0 to 100, where
100 represents perfect health. Also provide 3-5 general actionable
suggestions for improvement. Finally, create a detailed 14-day action plan
with a unique, encouraging title and 2-3 specific tasks per day.

Respond with JSON in exactly this shape:

{{
  "healthScore": 0,
  "generalSuggestions": [
    {{"suggestion": "The specific suggestion text.", "completed": false}}
  ],
  "dailyPlan": [
    {{
      "day": 1,
      "title": "An encouraging title for the day's tasks.",
      "tasks": [
        {{"task": "The specific task text.", "completed": false}}
      ]
    }}
  ]
}}

Health Report Text:
---
{report_text}
---
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_report_text() {
        let prompt = build_analysis_prompt("Cholesterol: 240 mg/dL");
        assert!(prompt.contains("Cholesterol: 240 mg/dL"));
        assert!(prompt.contains("healthScore"));
        assert!(prompt.contains("dailyPlan"));
    }

    #[test]
    fn system_prompt_mentions_score_bounds() {
        assert!(ANALYSIS_SYSTEM_PROMPT.contains("0 to 100"));
    }
}
