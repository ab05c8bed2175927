//! Prompt assembly for the generation, alias, metadata, and grading calls.
//!
//! Every prompt pins down the exact output shape; the parser in
//! `response.rs` is the other half of that contract.

use examforge_core::{GenerationOptions, QuestionType, ANSWERS_PER_CHOICE_QUESTION};

pub fn exam_system_prompt(language: &str) -> String {
    format!(
        "You are an expert at creating exams in {language}. \
         Always return valid JSON that matches the exact structure provided."
    )
}

/// Per-chunk generation prompt: the chunk content, exact counts per enabled
/// question type, fixed point values, and the target JSON shape.
pub fn exam_chunk_prompt(
    chunk_text: &str,
    options: &GenerationOptions,
    chunk_index: usize,
    total_chunks: usize,
    language: &str,
) -> String {
    let per_type = options.questions_per_chunk(total_chunks);
    let part = chunk_index + 1;

    let mut requirements = String::new();
    for question_type in options.enabled_types() {
        let line = match question_type {
            QuestionType::OpenEnded => format!(
                "- {per_type} open-ended questions ({} points each)\n",
                question_type.points()
            ),
            QuestionType::MultipleChoice => format!(
                "- {per_type} multiple-choice questions ({} points each, exactly {} possible answers)\n",
                question_type.points(),
                ANSWERS_PER_CHOICE_QUESTION
            ),
            QuestionType::SingleChoice => format!(
                "- {per_type} single-choice questions ({} points each, exactly {} possible answers)\n",
                question_type.points(),
                ANSWERS_PER_CHOICE_QUESTION
            ),
        };
        requirements.push_str(&line);
    }

    format!(
        r#"Create an exam in {language} based on the following content (part {part} of {total_chunks}):
{chunk_text}

Requirements:
Create exactly:
{requirements}
Return as a JSON object with this exact structure:
{{
  "title": "exam part {part}",
  "sections": [
    {{
      "title": "section title in {language}",
      "instructions": "section instructions in {language}",
      "questions": [
        {{
          "text": "question text here",
          "type": "open-ended",
          "points": 30
        }},
        {{
          "text": "question text here",
          "type": "multiple-choice",
          "points": 20,
          "answers": ["answer1", "answer2", "answer3", "answer4"],
          "correctAnswers": ["answer2", "answer3"]
        }},
        {{
          "text": "question text here",
          "type": "single-choice",
          "points": 10,
          "answers": ["answer1", "answer2", "answer3", "answer4"],
          "correctAnswers": ["answer2"]
        }}
      ]
    }}
  ]
}}
Include one section per requested question type, in the order listed above."#
    )
}

pub fn alias_system_prompt(language: &str) -> String {
    format!(
        "You are an expert at creating short, descriptive {language} titles for exams. \
         Create a title that captures the main subject and level of the exam."
    )
}

pub fn alias_prompt(content: &str, language: &str) -> String {
    format!(
        "Generate a short, descriptive {language} alias (2-5 words) for an exam with the \
         following content: {content}\n\n\
         Return as a JSON object: {{\"alias\": \"the alias\"}}"
    )
}

pub fn metadata_prompt(content: &str, language: &str) -> String {
    format!(
        "Generate a short {language} title (2-5 words) and a one-sentence {language} description \
         for an exam based on the following content:\n{content}\n\n\
         Return as a JSON object: {{\"title\": \"...\", \"description\": \"...\"}}"
    )
}

pub fn evaluation_system_prompt(language: &str) -> String {
    format!(
        r#"You are an expert teacher evaluating exam answers. Follow these strict scoring rules:

1. For open-ended questions:
   - Evaluate based on content, accuracy, and completeness
   - Provide detailed feedback explaining the score
   - Include an example of a complete correct answer

Always provide feedback in {language} only (except for technical terms).
Always include the correct answer(s) in the response.
Return only valid JSON format."#
    )
}

pub fn evaluation_prompt(
    question_text: &str,
    question_type: &str,
    points: u32,
    answer: &str,
    language: &str,
) -> String {
    format!(
        r#"Evaluate the following answer to the given question:
Question: {question_text}
Student answer: {answer}
Question type: {question_type}
Full score for the question: {points} points

Provide:
1. A score (0-100)
2. Feedback in {language} explaining the score
3. The correct answer or answers

Return only a JSON object in this format:
{{
  "score": number,
  "feedback": "feedback in {language}",
  "correctAnswer": "the correct answer" or ["answer 1", "answer 2"] for multiple answers
}}"#
    )
}
