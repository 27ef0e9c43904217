//! Parse and validate the analyzer's JSON response.
//!
//! Models drift: some wrap JSON in markdown fences, some emit bare JSON,
//! some pre-check items they were told not to. Parsing is lenient where an
//! item can be safely skipped (empty texts) and strict where the document
//! contract is at stake (score range, day numbering).

use serde::Deserialize;

use super::{AnalysisError, ReportAnalysis};
use crate::models::{DayPlan, PlanTask, Suggestion};

/// Wire shape of the analyzer response.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnalysis {
    health_score: i64,
    general_suggestions: Vec<RawSuggestion>,
    daily_plan: Vec<RawDay>,
}

#[derive(Deserialize)]
struct RawSuggestion {
    suggestion: String,
}

#[derive(Deserialize)]
struct RawDay {
    day: i64,
    title: String,
    tasks: Vec<RawTask>,
}

#[derive(Deserialize)]
struct RawTask {
    task: String,
}

/// Parse a model response into a validated [`ReportAnalysis`].
pub fn parse_analysis_response(response: &str) -> Result<ReportAnalysis, AnalysisError> {
    let json_str = extract_json_block(response)?;
    let raw: RawAnalysis = serde_json::from_str(&json_str)
        .map_err(|e| AnalysisError::MalformedResponse(e.to_string()))?;

    if !(0..=100).contains(&raw.health_score) {
        return Err(AnalysisError::InvalidScore(raw.health_score));
    }

    let suggestions: Vec<Suggestion> = raw
        .general_suggestions
        .into_iter()
        .map(|s| s.suggestion.trim().to_string())
        .filter(|text| !text.is_empty())
        .map(|text| Suggestion {
            text,
            completed: false,
        })
        .collect();

    let mut seen_days = [false; 15];
    let mut daily_plan = Vec::with_capacity(raw.daily_plan.len());
    for day in raw.daily_plan {
        if !(1..=14).contains(&day.day) {
            return Err(AnalysisError::InvalidPlan(format!(
                "day {} is outside 1-14",
                day.day
            )));
        }
        let day_number = day.day as usize;
        if seen_days[day_number] {
            return Err(AnalysisError::InvalidPlan(format!(
                "day {day_number} appears more than once"
            )));
        }
        seen_days[day_number] = true;

        let tasks: Vec<PlanTask> = day
            .tasks
            .into_iter()
            .map(|t| t.task.trim().to_string())
            .filter(|text| !text.is_empty())
            .map(|text| PlanTask {
                text,
                completed: false,
            })
            .collect();

        daily_plan.push(DayPlan {
            day: day.day as u8,
            title: day.title,
            tasks,
        });
    }

    Ok(ReportAnalysis {
        score: raw.health_score as u8,
        suggestions,
        daily_plan,
    })
}

/// Extract the JSON payload: a ```json fenced block when present,
/// otherwise the response itself trimmed.
fn extract_json_block(response: &str) -> Result<String, AnalysisError> {
    if let Some(fence_start) = response.find("```json") {
        let content_start = fence_start + 7;
        let fence_end = response[content_start..]
            .find("```")
            .ok_or_else(|| AnalysisError::MalformedResponse("Unclosed JSON block".into()))?;
        return Ok(response[content_start..content_start + fence_end]
            .trim()
            .to_string());
    }

    let trimmed = response.trim();
    if trimmed.is_empty() {
        return Err(AnalysisError::MalformedResponse("Empty response".into()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> String {
        r#"{
            "healthScore": 72,
            "generalSuggestions": [
                {"suggestion": "Cut back on sodium", "completed": false},
                {"suggestion": "  ", "completed": false},
                {"suggestion": "Sleep 8 hours", "completed": true}
            ],
            "dailyPlan": [
                {"day": 1, "title": "Kickoff", "tasks": [
                    {"task": "Walk 20 minutes", "completed": true},
                    {"task": "Drink 2L of water", "completed": false}
                ]},
                {"day": 2, "title": "Momentum", "tasks": [
                    {"task": "Stretch for 10 minutes", "completed": false}
                ]}
            ]
        }"#
        .to_string()
    }

    #[test]
    fn parses_bare_json() {
        let analysis = parse_analysis_response(&sample_json()).unwrap();
        assert_eq!(analysis.score, 72);
        assert_eq!(analysis.suggestions.len(), 2); // blank one skipped
        assert_eq!(analysis.daily_plan.len(), 2);
        assert_eq!(analysis.daily_plan[0].tasks.len(), 2);
    }

    #[test]
    fn parses_fenced_json() {
        let response = format!("Here is your analysis:\n```json\n{}\n```\nStay healthy!", sample_json());
        let analysis = parse_analysis_response(&response).unwrap();
        assert_eq!(analysis.score, 72);
    }

    #[test]
    fn completion_flags_are_forced_false() {
        // The model pre-checked a suggestion and a task; both must come back false.
        let analysis = parse_analysis_response(&sample_json()).unwrap();
        assert!(analysis.suggestions.iter().all(|s| !s.completed));
        assert!(analysis
            .daily_plan
            .iter()
            .flat_map(|d| &d.tasks)
            .all(|t| !t.completed));
    }

    #[test]
    fn score_out_of_range_rejected() {
        let response = r#"{"healthScore": 140, "generalSuggestions": [], "dailyPlan": []}"#;
        assert!(matches!(
            parse_analysis_response(response),
            Err(AnalysisError::InvalidScore(140))
        ));
    }

    #[test]
    fn negative_score_rejected() {
        let response = r#"{"healthScore": -5, "generalSuggestions": [], "dailyPlan": []}"#;
        assert!(matches!(
            parse_analysis_response(response),
            Err(AnalysisError::InvalidScore(-5))
        ));
    }

    #[test]
    fn duplicate_day_rejected() {
        let response = r#"{
            "healthScore": 50,
            "generalSuggestions": [],
            "dailyPlan": [
                {"day": 3, "title": "A", "tasks": []},
                {"day": 3, "title": "B", "tasks": []}
            ]
        }"#;
        assert!(matches!(
            parse_analysis_response(response),
            Err(AnalysisError::InvalidPlan(_))
        ));
    }

    #[test]
    fn day_outside_range_rejected() {
        let response = r#"{
            "healthScore": 50,
            "generalSuggestions": [],
            "dailyPlan": [{"day": 15, "title": "Too far", "tasks": []}]
        }"#;
        assert!(matches!(
            parse_analysis_response(response),
            Err(AnalysisError::InvalidPlan(_))
        ));
    }

    #[test]
    fn missing_required_field_rejected() {
        let response = r#"{"generalSuggestions": [], "dailyPlan": []}"#;
        assert!(matches!(
            parse_analysis_response(response),
            Err(AnalysisError::MalformedResponse(_))
        ));
    }

    #[test]
    fn unclosed_fence_rejected() {
        let response = "```json\n{\"healthScore\": 50}";
        assert!(matches!(
            parse_analysis_response(response),
            Err(AnalysisError::MalformedResponse(_))
        ));
    }

    #[test]
    fn empty_response_rejected() {
        assert!(matches!(
            parse_analysis_response("   "),
            Err(AnalysisError::MalformedResponse(_))
        ));
    }
}
