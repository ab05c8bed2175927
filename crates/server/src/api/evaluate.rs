//! Answer evaluation: closed-form questions scored locally, open-ended
//! answers graded by the LLM.

use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use examforge_core::{Question, QuestionType};

use crate::state::AppState;

use super::{bad_request, require_generator, ApiError, ErrorResponse};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct EvaluateRequest {
    #[schema(value_type = Object)]
    pub question: Question,
    /// Selected answer: a string, or an array of strings for
    /// multiple-choice questions.
    #[schema(value_type = Object)]
    pub answer: Value,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct EvaluateResponse {
    pub score: u32,
    pub feedback: String,
    #[serde(rename = "correctAnswer", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub correct_answer: Option<Value>,
}

// ── Local scoring ─────────────────────────────────

fn score_single_choice(question: &Question, answer: &Value) -> Result<EvaluateResponse, ApiError> {
    let selected = answer
        .as_str()
        .ok_or_else(|| bad_request("Single-choice answer must be a string"))?;

    let correct = selected == question.correct_answers[0];
    Ok(EvaluateResponse {
        score: if correct { 100 } else { 0 },
        feedback: if correct {
            "Correct answer.".to_string()
        } else {
            "Incorrect answer.".to_string()
        },
        correct_answer: Some(Value::String(question.correct_answers[0].clone())),
    })
}

fn score_multiple_choice(
    question: &Question,
    answer: &Value,
) -> Result<EvaluateResponse, ApiError> {
    let selected: HashSet<&str> = answer
        .as_array()
        .ok_or_else(|| bad_request("Multiple-choice answer must be an array of strings"))?
        .iter()
        .map(|v| {
            v.as_str()
                .ok_or_else(|| bad_request("Multiple-choice answer must be an array of strings"))
        })
        .collect::<Result<_, _>>()?;

    let total = question.correct_answers.len();
    let hits = question
        .correct_answers
        .iter()
        .filter(|c| selected.contains(c.as_str()))
        .count();

    // Proportional: 2 of 3 correct selected scores 66.
    let score = (hits * 100 / total) as u32;
    Ok(EvaluateResponse {
        score,
        feedback: format!("{hits} of {total} correct answers selected."),
        correct_answer: Some(Value::Array(
            question
                .correct_answers
                .iter()
                .map(|c| Value::String(c.clone()))
                .collect(),
        )),
    })
}

// ── POST /api/evaluate ────────────────────────────

/// Evaluate a student's answer to a question
///
/// Single-choice answers score 0 or 100, multiple-choice answers score
/// proportionally to the correct options selected, and open-ended
/// answers are graded by the configured LLM.
#[utoipa::path(
    post,
    path = "/api/evaluate",
    tag = "Evaluation",
    request_body = EvaluateRequest,
    responses(
        (status = 200, description = "Score and feedback", body = EvaluateResponse),
        (status = 400, description = "Missing answer key or malformed answer", body = ErrorResponse),
        (status = 500, description = "LLM evaluation failed", body = ErrorResponse),
        (status = 503, description = "No LLM provider configured", body = ErrorResponse)
    )
)]
pub async fn evaluate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EvaluateRequest>,
) -> Result<Json<EvaluateResponse>, ApiError> {
    let question = &request.question;

    if question.question_type.is_choice() && question.correct_answers.is_empty() {
        return Err(bad_request(
            "Choice questions require correctAnswers for local scoring",
        ));
    }

    let response = match question.question_type {
        QuestionType::SingleChoice => score_single_choice(question, &request.answer)?,
        QuestionType::MultipleChoice => score_multiple_choice(question, &request.answer)?,
        QuestionType::OpenEnded => {
            let generator = require_generator(&state)?;
            let answer = request
                .answer
                .as_str()
                .ok_or_else(|| bad_request("Open-ended answer must be a string"))?;

            let evaluation = generator
                .evaluate_open_answer(&question.text, question.points, answer)
                .await
                .map_err(|e| {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(ErrorResponse::with_details("Answer evaluation failed", e)),
                    )
                })?;

            EvaluateResponse {
                score: evaluation.score,
                feedback: evaluation.feedback,
                correct_answer: evaluation.correct_answer,
            }
        }
    };

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn multiple_choice_question(correct: &[&str]) -> Question {
        Question {
            text: "Pick the primes.".into(),
            question_type: QuestionType::MultipleChoice,
            points: 20,
            answers: vec!["2".into(), "3".into(), "4".into(), "5".into()],
            correct_answers: correct.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn single_choice_question() -> Question {
        Question {
            text: "2+2?".into(),
            question_type: QuestionType::SingleChoice,
            points: 10,
            answers: vec!["3".into(), "4".into(), "5".into(), "6".into()],
            correct_answers: vec!["4".into()],
        }
    }

    #[test]
    fn single_choice_is_all_or_nothing() {
        let q = single_choice_question();
        assert_eq!(score_single_choice(&q, &json!("4")).unwrap().score, 100);
        assert_eq!(score_single_choice(&q, &json!("5")).unwrap().score, 0);
    }

    #[test]
    fn single_choice_rejects_non_string_answer() {
        let q = single_choice_question();
        assert!(score_single_choice(&q, &json!(["4"])).is_err());
    }

    #[test]
    fn multiple_choice_scores_proportionally() {
        let q = multiple_choice_question(&["2", "3", "5"]);
        assert_eq!(
            score_multiple_choice(&q, &json!(["2", "3"])).unwrap().score,
            66
        );
        assert_eq!(
            score_multiple_choice(&q, &json!(["2", "3", "5"])).unwrap().score,
            100
        );
        assert_eq!(score_multiple_choice(&q, &json!([])).unwrap().score, 0);
    }

    #[test]
    fn multiple_choice_ignores_wrong_selections_in_the_hit_count() {
        let q = multiple_choice_question(&["2", "3", "5"]);
        let response = score_multiple_choice(&q, &json!(["2", "4"])).unwrap();
        assert_eq!(response.score, 33);
    }

    #[test]
    fn multiple_choice_reports_the_full_answer_key() {
        let q = multiple_choice_question(&["2", "3"]);
        let response = score_multiple_choice(&q, &json!(["2"])).unwrap();
        assert_eq!(response.correct_answer, Some(json!(["2", "3"])));
    }
}
