use crate::clock::{seconds_between, Clock};
use crate::error::{QuizError, Result};
use crate::types::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

/// Drives quiz sessions. Holds the randomness source and the clock; the
/// session itself is a plain value handed in by the caller.
#[derive(Debug)]
pub struct QuizController<R = StdRng> {
    rng: R,
    clock: Clock,
}

impl QuizController<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy(), Clock::System)
    }

    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed), Clock::System)
    }
}

impl<R: Rng> QuizController<R> {
    pub fn new(rng: R, clock: Clock) -> Self {
        Self { rng, clock }
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    pub fn start(&self, total_questions: u32) -> Result<Session> {
        if total_questions == 0 {
            warn!("Rejected session with zero questions");
            return Err(QuizError::InvalidConfiguration(
                "a session needs at least one question".to_string(),
            ));
        }
        info!(total_questions, "Starting quiz session");
        Ok(Session::new(total_questions))
    }

    pub fn next_question(&mut self, session: &mut Session) -> Result<NextQuestion> {
        if session.phase != SessionPhase::Running {
            return Err(QuizError::InvalidState(format!(
                "no more questions can be served in phase {:?}",
                session.phase
            )));
        }
        if session.active.is_some() {
            return Err(QuizError::InvalidState(
                "the current question has not been answered yet".to_string(),
            ));
        }

        if session.current_index >= session.total_questions {
            session.phase = SessionPhase::Complete;
            info!(
                score = session.score,
                total = session.total_questions,
                "All questions served"
            );
            return Ok(NextQuestion::SessionComplete);
        }

        if session.current_index == 0 {
            session.started_at = Some(self.clock.now());
        }
        session.current_index += 1;

        let question = Question::new(
            self.rng.gen_range(FACTOR_RANGE),
            self.rng.gen_range(FACTOR_RANGE),
        );
        session.active = Some(question);

        debug!(
            index = session.current_index,
            total = session.total_questions,
            factor_a = question.factor_a,
            factor_b = question.factor_b,
            "Generated question"
        );
        Ok(NextQuestion::Ready(question))
    }

    pub fn build_choices(&mut self, question: &Question) -> ChoiceSet {
        let mut answers = Vec::with_capacity(CHOICE_COUNT);
        answers.push(question.correct_answer);

        // Distractors must differ from the correct answer and from each other
        while answers.len() < CHOICE_COUNT {
            let candidate = self.rng.gen_range(DISTRACTOR_RANGE);
            if !answers.contains(&candidate) {
                answers.push(candidate);
            }
        }
        answers.shuffle(&mut self.rng);

        let mut values = [0; CHOICE_COUNT];
        values.copy_from_slice(&answers);
        ChoiceSet::from_array(values)
    }

    pub fn submit_answer(&self, session: &mut Session, chosen_value: u32) -> Result<Verdict> {
        let question = session.active.take().ok_or_else(|| {
            QuizError::InvalidState(format!(
                "no question is waiting for an answer (phase {:?})",
                session.phase
            ))
        })?;

        let correct = chosen_value == question.correct_answer;
        if correct {
            session.score += 1;
        } else {
            session.mistakes.push(Mistake {
                question_label: question.label(),
                correct_answer: question.correct_answer,
                chosen_answer: chosen_value,
            });
        }

        debug!(
            question = %question.label(),
            expected = question.correct_answer,
            chosen = chosen_value,
            correct,
            score = session.score,
            "Answer submitted"
        );

        Ok(Verdict {
            correct,
            correct_answer: question.correct_answer,
            chosen_answer: chosen_value,
        })
    }

    pub fn tick(&self, session: &mut Session) -> f64 {
        if session.phase == SessionPhase::Running {
            if let Some(started_at) = session.started_at {
                session.elapsed_seconds = seconds_between(started_at, self.clock.now());
            }
        }
        session.elapsed_seconds
    }

    pub fn finish(&self, session: &mut Session) -> Result<SessionReport> {
        match session.phase {
            SessionPhase::Complete => {}
            SessionPhase::Finished => {
                return Err(QuizError::InvalidState(
                    "the session has already been finished".to_string(),
                ));
            }
            SessionPhase::Running => {
                return Err(QuizError::InvalidState(format!(
                    "session still in progress ({}/{} questions served)",
                    session.current_index, session.total_questions
                )));
            }
        }

        session.phase = SessionPhase::Finished;
        let report = SessionReport {
            score: session.score,
            total_questions: session.total_questions,
            percentage: 100.0 * session.score as f64 / session.total_questions as f64,
            elapsed_seconds: session.elapsed_seconds,
            mistakes: session.mistakes.clone(),
        };

        info!(
            score = report.score,
            total = report.total_questions,
            percentage = report.percentage,
            elapsed_seconds = report.elapsed_seconds,
            mistakes = report.mistakes.len(),
            "Session finished"
        );
        Ok(report)
    }

    pub fn restart(&self, session: &Session) -> Session {
        info!(total_questions = session.total_questions, "Restarting session");
        Session::new(session.total_questions)
    }
}
