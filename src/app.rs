use crate::config::FEEDBACK_DELAY_MS;
use crate::error::Result;
use crate::messages::{congratulation, pick_feedback};
use crate::session::QuizController;
use crate::types::*;
use chrono::Duration;
use ratatui::layout::Alignment;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use tracing::{debug, info};

pub struct App {
    pub state: AppState,
    pub should_quit: bool,
    controller: QuizController,
}

impl App {
    pub fn new(controller: QuizController) -> Self {
        Self {
            state: AppState::default(),
            should_quit: false,
            controller,
        }
    }

    pub fn controller_mut(&mut self) -> &mut QuizController {
        &mut self.controller
    }

    pub fn start_quiz(&mut self, total_questions: u32) -> Result<()> {
        let session = self.controller.start(total_questions)?;
        self.state = AppState {
            screen: AppScreen::Quiz,
            menu_index: self.state.menu_index,
            session: Some(session),
            ..AppState::default()
        };
        self.advance()
    }

    pub fn select_previous(&mut self) {
        match self.state.screen {
            AppScreen::Menu => {
                self.state.menu_index =
                    (self.state.menu_index + QUESTION_PRESETS.len() - 1) % QUESTION_PRESETS.len();
            }
            AppScreen::Quiz => {
                self.state.selected_choice =
                    (self.state.selected_choice + CHOICE_COUNT - 1) % CHOICE_COUNT;
            }
            AppScreen::Summary => {}
        }
    }

    pub fn select_next(&mut self) {
        match self.state.screen {
            AppScreen::Menu => {
                self.state.menu_index = (self.state.menu_index + 1) % QUESTION_PRESETS.len();
            }
            AppScreen::Quiz => {
                self.state.selected_choice = (self.state.selected_choice + 1) % CHOICE_COUNT;
            }
            AppScreen::Summary => {}
        }
    }

    pub fn handle_enter(&mut self) -> Result<()> {
        match self.state.screen {
            AppScreen::Menu => self.start_quiz(QUESTION_PRESETS[self.state.menu_index]),
            AppScreen::Quiz => self.choose(self.state.selected_choice),
            AppScreen::Summary => self.restart(),
        }
    }

    /// Digit keys pick a menu entry or an answer directly (1-based).
    pub fn handle_digit(&mut self, digit: usize) -> Result<()> {
        if digit == 0 {
            return Ok(());
        }
        let idx = digit - 1;
        match self.state.screen {
            AppScreen::Menu if idx < QUESTION_PRESETS.len() => {
                self.state.menu_index = idx;
                self.start_quiz(QUESTION_PRESETS[idx])
            }
            AppScreen::Quiz if idx < CHOICE_COUNT => {
                self.state.selected_choice = idx;
                self.choose(idx)
            }
            _ => Ok(()),
        }
    }

    pub fn handle_char(&mut self, c: char) -> Result<()> {
        match (self.state.screen, c) {
            (_, 'q') => {
                self.should_quit = true;
                Ok(())
            }
            (AppScreen::Summary, 'r') => self.restart(),
            (AppScreen::Summary, 'm') => {
                self.return_to_menu();
                Ok(())
            }
            (_, c) => match c.to_digit(10) {
                Some(d) => self.handle_digit(d as usize),
                None => Ok(()),
            },
        }
    }

    fn choose(&mut self, idx: usize) -> Result<()> {
        // Locked while feedback is on screen
        if self.state.feedback.is_some() {
            return Ok(());
        }
        let (Some(session), Some(choices)) = (self.state.session.as_mut(), self.state.choices)
        else {
            return Ok(());
        };

        let verdict = self.controller.submit_answer(session, choices[idx])?;
        let message = pick_feedback(self.controller.rng_mut(), verdict.correct);
        let until = self.controller.clock().now() + Duration::milliseconds(FEEDBACK_DELAY_MS);
        self.state.feedback = Some(Feedback {
            verdict,
            message,
            until,
        });
        Ok(())
    }

    /// Periodic timer callback: updates elapsed time and moves on once
    /// the feedback delay has passed.
    pub fn on_tick(&mut self) -> Result<()> {
        if self.state.screen != AppScreen::Quiz {
            return Ok(());
        }
        if let Some(session) = self.state.session.as_mut() {
            self.controller.tick(session);
        }
        let expired = self
            .state
            .feedback
            .map(|fb| self.controller.clock().now() >= fb.until)
            .unwrap_or(false);
        if expired {
            self.advance()?;
        }
        Ok(())
    }

    fn advance(&mut self) -> Result<()> {
        let Some(session) = self.state.session.as_mut() else {
            return Ok(());
        };
        self.state.feedback = None;

        match self.controller.next_question(session)? {
            NextQuestion::Ready(question) => {
                let choices = self.controller.build_choices(&question);
                debug!(question = %question.label(), choices = ?choices.as_slice(), "Showing question");
                self.state.question = Some(question);
                self.state.choices = Some(choices);
                self.state.selected_choice = 0;
            }
            NextQuestion::SessionComplete => {
                let report = self.controller.finish(session)?;
                let json = serde_json::to_string(&report)?;
                info!(report = %json, "Quiz report");
                self.state.question = None;
                self.state.choices = None;
                self.state.report = Some(report);
                self.state.screen = AppScreen::Summary;
            }
        }
        Ok(())
    }

    pub fn restart(&mut self) -> Result<()> {
        let Some(session) = self.state.session.as_ref() else {
            return Ok(());
        };
        let fresh = self.controller.restart(session);
        self.state = AppState {
            screen: AppScreen::Quiz,
            menu_index: self.state.menu_index,
            session: Some(fresh),
            ..AppState::default()
        };
        self.advance()
    }

    pub fn return_to_menu(&mut self) {
        info!("Returning to menu");
        self.state = AppState {
            menu_index: self.state.menu_index,
            ..AppState::default()
        };
    }

    pub fn render(&self, f: &mut Frame) {
        match self.state.screen {
            AppScreen::Menu => self.render_menu(f),
            AppScreen::Quiz => self.render_quiz(f),
            AppScreen::Summary => self.render_summary(f),
        }
    }

    fn render_menu(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(20),  // Title
                Constraint::Percentage(70),  // Question count presets
                Constraint::Percentage(10),  // Help
            ])
            .split(f.area());

        let title = Paragraph::new(vec![
            Line::from(Span::styled(
                "Times Table Quiz",
                Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
            )),
            Line::from("Choose the number of questions:"),
        ])
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
        f.render_widget(title, chunks[0]);

        let options: Vec<Line> = QUESTION_PRESETS
            .iter()
            .enumerate()
            .map(|(i, n)| {
                let text = format!("{}. {} questions", i + 1, n);
                if i == self.state.menu_index {
                    Line::from(Span::styled(
                        format!("> {} <", text),
                        Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD),
                    ))
                } else {
                    Line::from(Span::raw(text))
                }
            })
            .collect();
        let menu = Paragraph::new(options)
            .block(Block::default().title("Start").borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(menu, chunks[1]);

        self.render_help(f, chunks[2], "↑/↓ or 1-4 to choose | Enter to start | Esc to quit");
    }

    fn render_quiz(&self, f: &mut Frame) {
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(10),  // Timer
                Constraint::Percentage(20),  // Question
                Constraint::Percentage(45),  // Answer grid
                Constraint::Percentage(10),  // Feedback
                Constraint::Percentage(10),  // Score
                Constraint::Percentage(5),   // Help
            ])
            .split(f.area());

        let Some(session) = self.state.session.as_ref() else {
            return;
        };

        let timer = Paragraph::new(format!("Time: {}", format_elapsed(session.elapsed_seconds())))
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD));
        f.render_widget(timer, main_chunks[0]);

        self.render_question(f, main_chunks[1], session);
        self.render_choices(f, main_chunks[2]);
        self.render_feedback(f, main_chunks[3]);

        let score = Paragraph::new(format!("Score: {}", session.score()))
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::LightRed));
        f.render_widget(score, main_chunks[4]);

        self.render_help(f, main_chunks[5], "Arrows or 1-4 to pick | Enter to answer | Esc to quit");
    }

    fn render_question(&self, f: &mut Frame, area: Rect, session: &Session) {
        let prompt = self
            .state
            .question
            .map(|q| q.prompt())
            .unwrap_or_else(|| "Loading...".to_string());

        let paragraph = Paragraph::new(vec![
            Line::from(format!(
                "Question {}/{}",
                session.current_index(),
                session.total_questions()
            )),
            Line::from(""),
            Line::from(Span::styled(prompt, Style::default().fg(Color::Cyan))),
        ])
        .block(Block::default().title("Question").borders(Borders::ALL))
        .alignment(Alignment::Center)
        .style(Style::default().add_modifier(Modifier::BOLD));
        f.render_widget(paragraph, area);
    }

    fn render_choices(&self, f: &mut Frame, area: Rect) {
        let Some(choices) = self.state.choices else {
            return;
        };

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        for (row_idx, row) in rows.iter().enumerate() {
            let cells = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(*row);

            for (col_idx, cell) in cells.iter().enumerate() {
                let idx = row_idx * 2 + col_idx;
                let style = self.choice_style(idx, choices[idx]);
                let button = Paragraph::new(Line::from(format!("{}", choices[idx])))
                    .block(
                        Block::default()
                            .title(format!("{}", idx + 1))
                            .borders(Borders::ALL),
                    )
                    .alignment(Alignment::Center)
                    .style(style);
                f.render_widget(button, *cell);
            }
        }
    }

    fn choice_style(&self, idx: usize, value: u32) -> Style {
        match self.state.feedback {
            Some(fb) if value == fb.verdict.correct_answer => {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            }
            Some(fb) if value == fb.verdict.chosen_answer => {
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
            }
            None if idx == self.state.selected_choice => Style::default()
                .fg(Color::Black)
                .bg(Color::LightRed)
                .add_modifier(Modifier::BOLD),
            _ => Style::default().fg(Color::LightRed),
        }
    }

    fn render_feedback(&self, f: &mut Frame, area: Rect) {
        let line = match self.state.feedback {
            Some(fb) => {
                let color = if fb.verdict.correct { Color::Green } else { Color::Red };
                Line::from(Span::styled(
                    fb.message,
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ))
            }
            None => Line::from(""),
        };
        let paragraph = Paragraph::new(line)
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(paragraph, area);
    }

    fn render_summary(&self, f: &mut Frame) {
        let Some(report) = self.state.report.as_ref() else {
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(30),  // Result
                Constraint::Percentage(60),  // Mistakes
                Constraint::Percentage(10),  // Help
            ])
            .split(f.area());

        let result = Paragraph::new(vec![
            Line::from(Span::styled(
                congratulation(report.percentage),
                Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(format!(
                "Your score: {} of {} ({:.2}%)",
                report.score, report.total_questions, report.percentage
            )),
            Line::from(format!("Total time: {}", report.formatted_time())),
        ])
        .block(Block::default().title("Results").borders(Borders::ALL))
        .alignment(Alignment::Center);
        f.render_widget(result, chunks[0]);

        let mut lines = Vec::new();
        if report.mistakes.is_empty() {
            lines.push(Line::from(Span::styled(
                "No mistakes!",
                Style::default().fg(Color::Green),
            )));
        } else {
            lines.extend(
                report
                    .mistakes
                    .iter()
                    .map(|m| Line::from(Span::raw(m.to_string()))),
            );
        }
        let mistakes = Paragraph::new(lines)
            .block(
                Block::default()
                    .title("Keep practicing")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Red)),
            )
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(mistakes, chunks[1]);

        self.render_help(f, chunks[2], "r to play again | m for menu | Esc to quit");
    }

    fn render_help(&self, f: &mut Frame, area: Rect, text: &str) {
        let help = Paragraph::new(Line::from(vec![Span::raw(text.to_string())]))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(help, area);
    }
}
