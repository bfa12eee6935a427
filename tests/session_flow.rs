use chrono::{Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::collections::VecDeque;
use times_table_quiz::clock::Clock;
use times_table_quiz::types::SessionPhase;
use times_table_quiz::{Mistake, NextQuestion, Question, QuizController, QuizError, Session};

fn controller(seed: u64) -> QuizController {
    let start = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    QuizController::new(StdRng::seed_from_u64(seed), Clock::fixed(start))
}

fn complete(ctl: &mut QuizController, session: &mut Session) {
    assert_eq!(
        ctl.next_question(session).unwrap(),
        NextQuestion::SessionComplete
    );
}

/// Replays fixed `next_u32` values so the drawn factors are known up front.
struct ScriptedRng(VecDeque<u32>);

impl ScriptedRng {
    fn factors(factors: &[u32]) -> Self {
        Self(
            factors
                .iter()
                .map(|&f| (((u64::from(f - 1) << 32) + 9) / 10) as u32)
                .collect(),
        )
    }
}

impl RngCore for ScriptedRng {
    fn next_u32(&mut self) -> u32 {
        self.0.pop_front().expect("scripted values exhausted")
    }

    fn next_u64(&mut self) -> u64 {
        u64::from(self.next_u32())
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for byte in dest.iter_mut() {
            *byte = self.next_u32() as u8;
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

fn serve(ctl: &mut QuizController, session: &mut Session) -> Question {
    match ctl.next_question(session).unwrap() {
        NextQuestion::Ready(q) => q,
        NextQuestion::SessionComplete => panic!("session ended early"),
    }
}

#[test]
fn presentation_style_walkthrough() {
    let mut ctl = controller(2024);
    let mut session = ctl.start(4).unwrap();
    let mut expected_mistakes = Vec::new();

    for i in 0..4 {
        let question = serve(&mut ctl, &mut session);
        let choices = ctl.build_choices(&question);
        assert!(choices.contains(question.correct_answer));

        // Every other answer picks a distractor
        let chosen = if i % 2 == 0 {
            question.correct_answer
        } else {
            *choices
                .iter()
                .find(|&&v| v != question.correct_answer)
                .unwrap()
        };
        let verdict = ctl.submit_answer(&mut session, chosen).unwrap();
        assert_eq!(verdict.correct, i % 2 == 0);
        if !verdict.correct {
            expected_mistakes.push((question.label(), question.correct_answer, chosen));
        }

        ctl.clock_mut().advance(Duration::seconds(3));
        ctl.tick(&mut session);
        assert!(session.score() <= session.current_index());
        assert!(session.current_index() <= session.total_questions());
    }

    assert_eq!(
        ctl.next_question(&mut session).unwrap(),
        NextQuestion::SessionComplete
    );
    assert_eq!(session.phase(), SessionPhase::Complete);

    let report = ctl.finish(&mut session).unwrap();
    assert_eq!(report.score, 2);
    assert_eq!(report.total_questions, 4);
    assert_eq!(report.percentage, 50.0);
    assert_eq!(report.elapsed_seconds, 12.0);
    assert_eq!(report.formatted_time(), "00:12");

    let recorded: Vec<_> = report
        .mistakes
        .iter()
        .map(|m| (m.question_label.clone(), m.correct_answer, m.chosen_answer))
        .collect();
    assert_eq!(recorded, expected_mistakes);
}

#[test]
fn first_question_answered_seven_instead_of_twelve() {
    let start = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let mut ctl = QuizController::new(ScriptedRng::factors(&[2, 6]), Clock::fixed(start));
    let mut session = ctl.start(4).unwrap();

    let question = match ctl.next_question(&mut session).unwrap() {
        NextQuestion::Ready(q) => q,
        NextQuestion::SessionComplete => panic!("session ended early"),
    };
    assert_eq!(question.correct_answer, 12);

    let verdict = ctl.submit_answer(&mut session, 7).unwrap();
    assert!(!verdict.correct);
    assert_eq!(session.score(), 0);
    assert_eq!(session.current_index(), 1);
    assert_eq!(
        session.mistakes(),
        &[Mistake {
            question_label: "2 × 6".to_string(),
            correct_answer: 12,
            chosen_answer: 7,
        }]
    );
}

#[test]
fn single_question_session_is_terminal() {
    let mut ctl = controller(1);
    let mut session = ctl.start(1).unwrap();
    let q = serve(&mut ctl, &mut session);
    ctl.submit_answer(&mut session, q.correct_answer).unwrap();

    assert_eq!(
        ctl.next_question(&mut session).unwrap(),
        NextQuestion::SessionComplete
    );
    assert!(matches!(
        ctl.next_question(&mut session),
        Err(QuizError::InvalidState(_))
    ));
    assert!(matches!(
        ctl.submit_answer(&mut session, q.correct_answer),
        Err(QuizError::InvalidState(_))
    ));
}

#[test]
fn restart_then_perfect_run() {
    let mut ctl = controller(77);
    let mut session = ctl.start(3).unwrap();
    let q = serve(&mut ctl, &mut session);
    ctl.submit_answer(&mut session, q.correct_answer + 100).unwrap();

    let mut session = ctl.restart(&session);
    assert_eq!(session.current_index(), 0);
    assert!(session.mistakes().is_empty());
    assert!(session.started_at().is_none());

    for _ in 0..3 {
        let q = serve(&mut ctl, &mut session);
        ctl.submit_answer(&mut session, q.correct_answer).unwrap();
    }
    complete(&mut ctl, &mut session);
    let report = ctl.finish(&mut session).unwrap();
    assert_eq!(report.percentage, 100.0);
    assert!(report.mistakes.is_empty());
}

#[test]
fn zero_questions_is_rejected() {
    let ctl = controller(0);
    assert!(matches!(
        ctl.start(0),
        Err(QuizError::InvalidConfiguration(_))
    ));
}

#[test]
fn report_serializes_to_json() {
    let mut ctl = controller(5);
    let mut session = ctl.start(1).unwrap();
    let q = serve(&mut ctl, &mut session);
    ctl.submit_answer(&mut session, 0).unwrap();
    complete(&mut ctl, &mut session);
    let report = ctl.finish(&mut session).unwrap();

    let json: serde_json::Value = serde_json::to_value(&report).unwrap();
    assert_eq!(json["score"], 0);
    assert_eq!(json["total_questions"], 1);
    assert_eq!(json["mistakes"][0]["question_label"], q.label());
    assert_eq!(json["mistakes"][0]["chosen_answer"], 0);
}
