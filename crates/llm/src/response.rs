//! Defensive parsing of model output into typed exam values.
//!
//! The model is known to wrap structured output in prose framing and
//! Markdown code fences, so every call site goes through the same two-step
//! contract: strip the framing, parse to a loose `serde_json::Value`, then
//! validate the shape into a strongly-typed value. Missing required fields
//! fail explicitly — nothing is silently defaulted.

use serde_json::Value;

use examforge_core::{ExamFragment, Question, QuestionType, Section};

/// How much of the raw response to keep in error diagnostics.
const SNIPPET_LIMIT: usize = 400;

#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    #[error("malformed model response: {reason} (raw: {snippet})")]
    Malformed { reason: String, snippet: String },
}

impl ResponseError {
    fn malformed(reason: impl Into<String>, raw: &str) -> Self {
        Self::Malformed {
            reason: reason.into(),
            snippet: snippet_of(raw),
        }
    }
}

/// Truncate raw model output to a bounded diagnostic snippet.
fn snippet_of(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.chars().count() <= SNIPPET_LIMIT {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(SNIPPET_LIMIT).collect();
    format!("{cut}…")
}

/// Strip Markdown code fences and prose framing from a model response.
///
/// Handles ```json blocks, bare ``` blocks, and responses that surround a
/// JSON object with explanation text. Identical inner content yields the
/// same string whether fenced or not.
pub fn clean_json_response(response: &str) -> &str {
    let trimmed = response.trim();

    // Handle ```json ... ``` blocks
    if let Some(start) = trimmed.find("```json") {
        let json_start = start + 7;
        if let Some(end) = trimmed[json_start..].find("```") {
            return trimmed[json_start..json_start + end].trim();
        }
    }

    // Handle ``` ... ``` blocks
    if let Some(start) = trimmed.find("```") {
        let json_start = start + 3;
        // Skip past any language identifier on the same line
        let after_tick = &trimmed[json_start..];
        let content_start = after_tick.find('\n').map_or(0, |n| n + 1);
        if let Some(end) = after_tick[content_start..].find("```") {
            return after_tick[content_start..content_start + end].trim();
        }
    }

    // Fall back to the outermost { ... } span
    if let Some(start) = trimmed.find('{') {
        if let Some(end) = trimmed.rfind('}') {
            if start < end {
                return &trimmed[start..=end];
            }
        }
    }

    trimmed
}

/// Parse cleaned text as a JSON object; the loose half of the contract.
fn parse_object(raw: &str) -> Result<Value, ResponseError> {
    let cleaned = clean_json_response(raw);
    let value: Value = serde_json::from_str(cleaned)
        .map_err(|e| ResponseError::malformed(format!("invalid JSON: {e}"), raw))?;
    if !value.is_object() {
        return Err(ResponseError::malformed("expected a JSON object", raw));
    }
    Ok(value)
}

fn required_str(obj: &Value, key: &str, raw: &str) -> Result<String, ResponseError> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ResponseError::malformed(format!("missing required field '{key}'"), raw))
}

fn string_array(value: &Value, key: &str, raw: &str) -> Result<Vec<String>, ResponseError> {
    let items = value
        .as_array()
        .ok_or_else(|| ResponseError::malformed(format!("'{key}' must be an array"), raw))?;
    items
        .iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| ResponseError::malformed(format!("'{key}' must contain only strings"), raw))
        })
        .collect()
}

// ── Exam fragments ────────────────────────────────────────────

/// Validate a model response into one chunk's `ExamFragment`.
pub fn parse_exam_fragment(raw: &str) -> Result<ExamFragment, ResponseError> {
    let value = parse_object(raw)?;

    let title = required_str(&value, "title", raw)?;
    let sections_value = value
        .get("sections")
        .and_then(Value::as_array)
        .ok_or_else(|| ResponseError::malformed("missing required field 'sections'", raw))?;

    let mut sections = Vec::with_capacity(sections_value.len());
    for section in sections_value {
        sections.push(parse_section(section, raw)?);
    }

    Ok(ExamFragment { title, sections })
}

fn parse_section(section: &Value, raw: &str) -> Result<Section, ResponseError> {
    let title = required_str(section, "title", raw)?;
    let instructions = section
        .get("instructions")
        .and_then(Value::as_str)
        .map(str::to_string);
    let questions_value = section
        .get("questions")
        .and_then(Value::as_array)
        .ok_or_else(|| ResponseError::malformed("section missing 'questions'", raw))?;

    let mut questions = Vec::with_capacity(questions_value.len());
    for question in questions_value {
        questions.push(parse_question(question, raw)?);
    }

    Ok(Section {
        title,
        instructions,
        questions,
    })
}

fn parse_question(question: &Value, raw: &str) -> Result<Question, ResponseError> {
    let text = required_str(question, "text", raw)?;

    let type_str = required_str(question, "type", raw)?;
    let question_type: QuestionType = serde_json::from_value(Value::String(type_str.clone()))
        .map_err(|_| ResponseError::malformed(format!("unknown question type '{type_str}'"), raw))?;

    let points = question
        .get("points")
        .and_then(Value::as_u64)
        .ok_or_else(|| ResponseError::malformed("question missing numeric 'points'", raw))?;
    let points = u32::try_from(points)
        .map_err(|_| ResponseError::malformed(format!("'points' out of range: {points}"), raw))?;

    let answers = match question.get("answers") {
        Some(v) => string_array(v, "answers", raw)?,
        None => Vec::new(),
    };
    let correct_answers = match question.get("correctAnswers") {
        Some(v) => string_array(v, "correctAnswers", raw)?,
        None => Vec::new(),
    };

    if question_type.is_choice() && answers.is_empty() {
        return Err(ResponseError::malformed(
            format!("'{type_str}' question missing 'answers'"),
            raw,
        ));
    }

    // Validation only: points and ordering pass through untouched.
    Ok(Question {
        text,
        question_type,
        points,
        answers,
        correct_answers,
    })
}

// ── Metadata, alias, evaluation ───────────────────────────────

/// Exam metadata produced for the two-step creation flow.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ExamMetadata {
    pub title: String,
    pub description: String,
}

pub fn parse_metadata(raw: &str) -> Result<ExamMetadata, ResponseError> {
    let value = parse_object(raw)?;
    Ok(ExamMetadata {
        title: required_str(&value, "title", raw)?,
        description: required_str(&value, "description", raw)?,
    })
}

/// Parse an `{alias}` response. Required here; the alias call site applies
/// its documented human-facing fallback label itself.
pub fn parse_alias(raw: &str) -> Result<String, ResponseError> {
    let value = parse_object(raw)?;
    required_str(&value, "alias", raw)
}

/// Parsed grading of one open-ended answer.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ParsedEvaluation {
    pub score: u32,
    pub feedback: String,
    pub correct_answer: Option<Value>,
}

pub fn parse_evaluation(raw: &str) -> Result<ParsedEvaluation, ResponseError> {
    let value = parse_object(raw)?;

    let score = value
        .get("score")
        .and_then(Value::as_f64)
        .ok_or_else(|| ResponseError::malformed("missing numeric 'score'", raw))?;
    let feedback = required_str(&value, "feedback", raw)?;

    let correct_answer = value.get("correctAnswer").cloned().filter(|v| {
        v.is_string() || v.as_array().map(|a| a.iter().all(Value::is_string)).unwrap_or(false)
    });

    Ok(ParsedEvaluation {
        score: score.clamp(0.0, 100.0).round() as u32,
        feedback,
        correct_answer,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAGMENT: &str = r#"{
        "title": "exam part 1",
        "sections": [
            {
                "title": "Open Questions",
                "instructions": "Answer in full sentences",
                "questions": [
                    {"text": "Explain photosynthesis.", "type": "open-ended", "points": 30}
                ]
            },
            {
                "title": "Single Choice",
                "questions": [
                    {
                        "text": "Pick one.",
                        "type": "single-choice",
                        "points": 10,
                        "answers": ["a", "b", "c", "d"],
                        "correctAnswers": ["b"]
                    }
                ]
            }
        ]
    }"#;

    #[test]
    fn fenced_and_bare_input_parse_identically() {
        let bare = parse_exam_fragment(FRAGMENT).unwrap();
        let fenced = parse_exam_fragment(&format!("```json\n{FRAGMENT}\n```")).unwrap();
        let plain_fence = parse_exam_fragment(&format!("```\n{FRAGMENT}\n```")).unwrap();
        assert_eq!(serde_json::to_value(&bare).unwrap(), serde_json::to_value(&fenced).unwrap());
        assert_eq!(
            serde_json::to_value(&bare).unwrap(),
            serde_json::to_value(&plain_fence).unwrap()
        );
    }

    #[test]
    fn prose_framing_is_stripped() {
        let wrapped = format!("Here is your exam:\n{FRAGMENT}\nHope it helps!");
        let fragment = parse_exam_fragment(&wrapped).unwrap();
        assert_eq!(fragment.sections.len(), 2);
    }

    #[test]
    fn parsed_fragment_keeps_values_untouched() {
        let fragment = parse_exam_fragment(FRAGMENT).unwrap();
        assert_eq!(fragment.title, "exam part 1");
        let open = &fragment.sections[0].questions[0];
        assert_eq!(open.question_type, QuestionType::OpenEnded);
        assert_eq!(open.points, 30);
        assert!(open.answers.is_empty());
        let single = &fragment.sections[1].questions[0];
        assert_eq!(single.answers.len(), 4);
        assert_eq!(single.correct_answers, vec!["b"]);
        assert_eq!(fragment.sections[1].instructions, None);
    }

    #[test]
    fn missing_sections_is_rejected() {
        let err = parse_exam_fragment(r#"{"title": "no sections here"}"#).unwrap_err();
        let ResponseError::Malformed { reason, .. } = err;
        assert!(reason.contains("sections"), "unexpected reason: {reason}");
    }

    #[test]
    fn points_beyond_u32_are_rejected_not_wrapped() {
        let raw = r#"{"title":"t","sections":[{"title":"s","questions":[
            {"text":"q","type":"open-ended","points":4294967296}]}]}"#;
        let err = parse_exam_fragment(raw).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn missing_question_text_is_rejected() {
        let raw = r#"{"title":"t","sections":[{"title":"s","questions":[{"type":"open-ended","points":30}]}]}"#;
        assert!(parse_exam_fragment(raw).is_err());
    }

    #[test]
    fn choice_question_without_answers_is_rejected() {
        let raw = r#"{"title":"t","sections":[{"title":"s","questions":[
            {"text":"q","type":"single-choice","points":10}]}]}"#;
        assert!(parse_exam_fragment(raw).is_err());
    }

    #[test]
    fn unknown_question_type_is_rejected() {
        let raw = r#"{"title":"t","sections":[{"title":"s","questions":[
            {"text":"q","type":"essay","points":30}]}]}"#;
        let err = parse_exam_fragment(raw).unwrap_err();
        assert!(err.to_string().contains("essay"));
    }

    #[test]
    fn non_json_is_rejected_with_bounded_snippet() {
        let raw = "x".repeat(5_000);
        let ResponseError::Malformed { snippet, .. } = parse_exam_fragment(&raw).unwrap_err();
        assert!(snippet.chars().count() <= SNIPPET_LIMIT + 1);
    }

    #[test]
    fn metadata_requires_both_fields() {
        let ok = parse_metadata(r#"{"title":"Biology 101","description":"Cell basics"}"#).unwrap();
        assert_eq!(ok.title, "Biology 101");
        assert!(parse_metadata(r#"{"title":"Biology 101"}"#).is_err());
    }

    #[test]
    fn alias_requires_alias_field() {
        assert_eq!(parse_alias(r#"{"alias":"Intro Biology"}"#).unwrap(), "Intro Biology");
        assert!(parse_alias(r#"{"title":"not an alias"}"#).is_err());
    }

    #[test]
    fn evaluation_clamps_score_to_percentage() {
        let eval = parse_evaluation(r#"{"score": 150, "feedback": "great"}"#).unwrap();
        assert_eq!(eval.score, 100);
        let eval = parse_evaluation(r#"{"score": -3, "feedback": "poor"}"#).unwrap();
        assert_eq!(eval.score, 0);
    }

    #[test]
    fn evaluation_accepts_string_or_array_correct_answer() {
        let one = parse_evaluation(r#"{"score":100,"feedback":"ok","correctAnswer":"b"}"#).unwrap();
        assert!(one.correct_answer.unwrap().is_string());
        let many =
            parse_evaluation(r#"{"score":66,"feedback":"ok","correctAnswer":["a","c"]}"#).unwrap();
        assert!(many.correct_answer.unwrap().is_array());
    }
}
