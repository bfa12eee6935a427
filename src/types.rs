use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, RangeInclusive};

pub const QUESTION_PRESETS: [u32; 4] = [10, 25, 50, 100];
pub const FACTOR_RANGE: RangeInclusive<u32> = 1..=10;
pub const DISTRACTOR_RANGE: RangeInclusive<u32> = 1..=100;
pub const CHOICE_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Question {
    pub factor_a: u32,
    pub factor_b: u32,
    pub correct_answer: u32,
}

impl Question {
    pub fn new(factor_a: u32, factor_b: u32) -> Self {
        Self {
            factor_a,
            factor_b,
            correct_answer: factor_a * factor_b,
        }
    }

    pub fn label(&self) -> String {
        format!("{} × {}", self.factor_a, self.factor_b)
    }

    pub fn prompt(&self) -> String {
        format!("{} = ?", self.label())
    }
}

/// Four distinct answers in display order, exactly one of them correct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChoiceSet([u32; CHOICE_COUNT]);

impl ChoiceSet {
    pub(crate) fn from_array(values: [u32; CHOICE_COUNT]) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &u32> {
        self.0.iter()
    }

    pub fn contains(&self, value: u32) -> bool {
        self.0.contains(&value)
    }

    pub fn position_of(&self, value: u32) -> Option<usize> {
        self.0.iter().position(|&v| v == value)
    }

    pub fn len(&self) -> usize {
        CHOICE_COUNT
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Index<usize> for ChoiceSet {
    type Output = u32;

    fn index(&self, idx: usize) -> &u32 {
        &self.0[idx]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mistake {
    pub question_label: String,
    pub correct_answer: u32,
    pub chosen_answer: u32,
}

impl fmt::Display for Mistake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {}   (you answered: {})",
            self.question_label, self.correct_answer, self.chosen_answer
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub correct: bool,
    pub correct_answer: u32,
    pub chosen_answer: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextQuestion {
    Ready(Question),
    SessionComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Running,    // Serving questions
    Complete,   // All questions served, report not built yet
    Finished,   // Report built, read-only until restart
}

/// One quiz attempt. Only the controller in `session` mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub(crate) total_questions: u32,
    pub(crate) current_index: u32,
    pub(crate) score: u32,
    pub(crate) mistakes: Vec<Mistake>,
    pub(crate) started_at: Option<DateTime<Utc>>,
    pub(crate) elapsed_seconds: f64,
    pub(crate) phase: SessionPhase,
    pub(crate) active: Option<Question>,
}

impl Session {
    pub(crate) fn new(total_questions: u32) -> Self {
        Self {
            total_questions,
            current_index: 0,
            score: 0,
            mistakes: Vec::new(),
            started_at: None,
            elapsed_seconds: 0.0,
            phase: SessionPhase::Running,
            active: None,
        }
    }

    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    pub fn current_index(&self) -> u32 {
        self.current_index
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn mistakes(&self) -> &[Mistake] {
        &self.mistakes
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// The question waiting for an answer, if any.
    pub fn active_question(&self) -> Option<&Question> {
        self.active.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub score: u32,
    pub total_questions: u32,
    pub percentage: f64,
    pub elapsed_seconds: f64,
    pub mistakes: Vec<Mistake>,
}

impl SessionReport {
    pub fn formatted_time(&self) -> String {
        format_elapsed(self.elapsed_seconds)
    }
}

/// Renders seconds as `MM:SS`.
pub fn format_elapsed(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppScreen {
    Menu,       // Choosing the number of questions
    Quiz,       // Answering questions
    Summary,    // Showing the end-of-session report
}

/// Feedback for the answer just submitted, shown until `until`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Feedback {
    pub verdict: Verdict,
    pub message: &'static str,
    pub until: DateTime<Utc>,
}

#[derive(Debug)]
pub struct AppState {
    pub screen: AppScreen,
    pub menu_index: usize,
    pub session: Option<Session>,
    pub question: Option<Question>,
    pub choices: Option<ChoiceSet>,
    pub selected_choice: usize,
    pub feedback: Option<Feedback>,
    pub report: Option<SessionReport>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            screen: AppScreen::Menu,
            menu_index: 0,
            session: None,
            question: None,
            choices: None,
            selected_choice: 0,
            feedback: None,
            report: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_computes_product_and_label() {
        let q = Question::new(7, 8);
        assert_eq!(q.correct_answer, 56);
        assert_eq!(q.label(), "7 × 8");
        assert_eq!(q.prompt(), "7 × 8 = ?");
    }

    #[test]
    fn elapsed_is_formatted_as_minutes_and_seconds() {
        assert_eq!(format_elapsed(0.0), "00:00");
        assert_eq!(format_elapsed(59.9), "00:59");
        assert_eq!(format_elapsed(125.4), "02:05");
        assert_eq!(format_elapsed(-3.0), "00:00");
    }

    #[test]
    fn mistake_display_shows_both_answers() {
        let m = Mistake {
            question_label: "3 × 4".to_string(),
            correct_answer: 12,
            chosen_answer: 7,
        };
        assert_eq!(m.to_string(), "3 × 4 = 12   (you answered: 7)");
    }

    #[test]
    fn choice_set_lookup() {
        let set = ChoiceSet::from_array([40, 12, 99, 3]);
        assert!(set.contains(12));
        assert_eq!(set.position_of(99), Some(2));
        assert_eq!(set.position_of(5), None);
        assert_eq!(set[3], 3);
        assert_eq!(set.len(), 4);
    }
}
