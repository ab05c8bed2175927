//! Exam domain types shared across the generation pipeline.
//!
//! Wire shapes (field names, question type tags) match the JSON the
//! generative model is asked to produce and what the web client consumes.

use serde::{Deserialize, Serialize};

// ── Questions ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionType {
    #[serde(rename = "single-choice")]
    SingleChoice,
    #[serde(rename = "multiple-choice")]
    MultipleChoice,
    #[serde(rename = "open-ended")]
    OpenEnded,
}

impl QuestionType {
    /// Fixed point schedule: single 10, multiple 20, open 30.
    pub fn points(&self) -> u32 {
        match self {
            QuestionType::SingleChoice => 10,
            QuestionType::MultipleChoice => 20,
            QuestionType::OpenEnded => 30,
        }
    }

    pub fn is_choice(&self) -> bool {
        matches!(self, QuestionType::SingleChoice | QuestionType::MultipleChoice)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::SingleChoice => "single-choice",
            QuestionType::MultipleChoice => "multiple-choice",
            QuestionType::OpenEnded => "open-ended",
        }
    }
}

/// Number of answer options choice questions must carry.
pub const ANSWERS_PER_CHOICE_QUESTION: usize = 4;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub points: u32,
    /// Answer options (empty for open-ended questions).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub answers: Vec<String>,
    /// Subset of `answers` marked correct (empty for open-ended questions).
    #[serde(
        rename = "correctAnswers",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub correct_answers: Vec<String>,
}

// ── Sections & exams ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    pub questions: Vec<Question>,
}

/// Parsed output of one chunk's generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamFragment {
    /// Chunk-scoped title ("exam part N"); ignored at merge time.
    pub title: String,
    pub sections: Vec<Section>,
}

/// Final merged exam: all fragments' sections concatenated in chunk order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamDocument {
    pub title: String,
    pub sections: Vec<Section>,
}

impl ExamDocument {
    /// Fixed label given to every merged exam.
    pub const DEFAULT_TITLE: &'static str = "Generated Exam";

    /// Merge fragments by concatenating their sections in the given order.
    /// No deduplication and no renumbering — same-titled sections from
    /// different chunks remain distinct entries.
    pub fn merge(fragments: Vec<ExamFragment>) -> Self {
        Self {
            title: Self::DEFAULT_TITLE.to_string(),
            sections: fragments.into_iter().flat_map(|f| f.sections).collect(),
        }
    }

    pub fn question_count(&self) -> usize {
        self.sections.iter().map(|s| s.questions.len()).sum()
    }
}

// ── Generation options ────────────────────────────────────────

/// Which question kinds to request, as submitted by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptions {
    pub open_questions: bool,
    pub multiple_choice: bool,
    pub single_choice: bool,
    pub questions_per_section: u32,
}

impl GenerationOptions {
    /// Questions requested per chunk per enabled type:
    /// `ceil(questions_per_section / total_chunks)`.
    pub fn questions_per_chunk(&self, total_chunks: usize) -> u32 {
        let total = total_chunks.max(1) as u32;
        self.questions_per_section.div_ceil(total)
    }

    /// Enabled question types in the fixed open/multiple/single order.
    pub fn enabled_types(&self) -> Vec<QuestionType> {
        let mut types = Vec::new();
        if self.open_questions {
            types.push(QuestionType::OpenEnded);
        }
        if self.multiple_choice {
            types.push(QuestionType::MultipleChoice);
        }
        if self.single_choice {
            types.push(QuestionType::SingleChoice);
        }
        types
    }

    pub fn any_enabled(&self) -> bool {
        self.open_questions || self.multiple_choice || self.single_choice
    }
}
