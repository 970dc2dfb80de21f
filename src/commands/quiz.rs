use anyhow::Result;
use colored::Colorize;
use inquire::Select;

use crate::api::ApiClient;
use crate::config::{Config, Profile};
use crate::session::{Advance, AnswerOutcome, ChoiceMark, PanelSource, QuizRound, QuizSummary, SessionError, StudyPanel};
use crate::ui;

use super::{chat, require_profile, study};

/// CLI entry: pick a chat session and jump straight into an MCQ quiz over
/// its flashcards (the "view all" origin, so the quiz takes the screen).
pub async fn run(chat_id: Option<i64>) -> Result<()> {
    let config = Config::load()?;
    let Some(profile) = require_profile(&config) else {
        return Ok(());
    };
    let client = ApiClient::new(&config.backend_url(), Some(profile.user_id));

    let chat_id = match chat_id {
        Some(id) => id,
        None => match chat::pick_or_create_chat(&client, profile.user_id).await? {
            Some(chat) => chat.id,
            None => return Ok(()),
        },
    };

    let spinner = ui::spinner("Loading flashcards...");
    let cards = client.chat_flashcards(profile.user_id, chat_id, true).await;
    spinner.finish_and_clear();

    match cards {
        Ok(cards) => study::run_panel(&client, &profile, cards, PanelSource::ViewAll, true).await,
        Err(e) => {
            println!("{} {}", "Flashcards unavailable:".red(), e);
            Ok(())
        }
    }
}

/// Generate a quiz over the panel's distinct flashcards and walk it one
/// question at a time. Returns when the quiz finishes or the user exits;
/// the panel is untouched either way.
pub(crate) async fn run_round(
    client: &ApiClient,
    profile: &Profile,
    panel: &StudyPanel,
) -> Result<()> {
    let ids = panel.distinct_card_ids();
    if ids.is_empty() {
        println!("{}", "No flashcards available for quiz.".dimmed());
        return Ok(());
    }

    let spinner = ui::spinner("Creating MCQ quiz...");
    let started = QuizRound::start(client, profile.user_id, "MCQ Quiz", &ids).await;
    spinner.finish_and_clear();

    let mut round = match started {
        Ok(round) => round,
        Err(e) => {
            println!("{} {}", "Quiz generation failed:".red().bold(), e);
            return Ok(());
        }
    };

    print_quiz_header(&round, panel.source());

    'quiz: while !round.finished() {
        let question = match round.current() {
            Ok(question) => question.clone(),
            Err(_) => break,
        };

        render_question(&round);

        if !question.answered() {
            let mut options: Vec<String> = question
                .choices
                .iter()
                .map(|c| format!("{}. {}", c.label, c.text))
                .collect();
            options.push("🚪  Exit quiz".to_string());

            let selection = Select::new("Your answer:", options).prompt();
            let selection = match selection {
                Ok(s) => s,
                Err(inquire::InquireError::OperationCanceled)
                | Err(inquire::InquireError::OperationInterrupted) => break 'quiz,
                Err(e) => return Err(e.into()),
            };

            if selection.contains("Exit quiz") {
                break 'quiz;
            }

            let Some(choice) = question
                .choices
                .iter()
                .find(|c| selection == format!("{}. {}", c.label, c.text))
            else {
                continue;
            };

            let spinner = ui::spinner("Checking answer...");
            let outcome = round.answer(client, &choice.text).await;
            spinner.finish_and_clear();

            match outcome {
                Ok(AnswerOutcome::Recorded { .. }) => {
                    // Redraw with the correct/wrong marks applied.
                    render_question(&round);
                }
                Ok(AnswerOutcome::Ignored) => {}
                Err(SessionError::AnswerSubmit(message)) => {
                    // The question stays unanswered; the next lap retries it.
                    println!("  {} {}", "✗".red().bold(), message);
                    continue 'quiz;
                }
                Err(e) => {
                    println!("  {} {}", "✗".red().bold(), e);
                    continue 'quiz;
                }
            }
        }

        // Post-answer menu: advance, ask for an explanation, or bail out.
        loop {
            let is_last = round.cursor() + 1 == round.len();
            let next_label = if is_last {
                "🏁  Finish quiz"
            } else {
                "→   Next question"
            };
            let options = vec![next_label, "💡  Explain this question", "🚪  Exit quiz"];

            let selection = Select::new("Continue:", options).prompt();
            let selection = match selection {
                Ok(s) => s,
                Err(inquire::InquireError::OperationCanceled)
                | Err(inquire::InquireError::OperationInterrupted) => break 'quiz,
                Err(e) => return Err(e.into()),
            };

            match selection {
                s if s.contains("Explain") => {
                    explain_question(client, profile, &round).await;
                }
                s if s.contains("Exit quiz") => break 'quiz,
                _ => {
                    match round.advance() {
                        Advance::Next | Advance::Finished => break,
                        Advance::NotAnswered => {}
                    }
                }
            }
        }
    }

    if round.finished() {
        print_quiz_summary(round.title(), round.summary());
    } else {
        println!("{}", "Quiz exited.".dimmed());
    }

    Ok(())
}

async fn explain_question(client: &ApiClient, profile: &Profile, round: &QuizRound) {
    let Ok(question) = round.current() else {
        return;
    };

    let spinner = ui::spinner("Asking the tutor...");
    let result = client.question_explanation(profile.user_id, question.id).await;
    spinner.finish_and_clear();

    match result {
        Ok(explanation) => {
            println!();
            ui::render_markdown(&explanation.explanation);
            println!();
        }
        Err(e) => println!("  {} {}", "Explanation unavailable:".red(), e),
    }
}

fn print_quiz_header(round: &QuizRound, source: PanelSource) {
    if source == PanelSource::ViewAll {
        // Focused mode: the quiz owns the screen until it ends.
        println!();
        println!(
            "    {}",
            "╭──────────────────────────────────────────────────────╮".magenta()
        );
        println!(
            "    {}           {}           {}",
            "│".magenta(),
            "🎯 MCQ QUIZ 🎯".bold().white(),
            "│".magenta()
        );
        println!(
            "    {}     {}     {}",
            "│".magenta(),
            "One pass, no rewinds - answer and move on".dimmed(),
            "│".magenta()
        );
        println!(
            "    {}",
            "╰──────────────────────────────────────────────────────╯".magenta()
        );
        println!();
    }

    println!(
        "{} Quiz ready: {} questions.",
        "✦".magenta(),
        round.len().to_string().cyan()
    );
}

fn render_question(round: &QuizRound) {
    let Ok(question) = round.current() else {
        return;
    };

    println!();
    println!(
        "{} [{}/{}]",
        "Question".bold().cyan(),
        round.cursor() + 1,
        round.len()
    );
    println!("  {}", question.prompt);
    println!();

    if question.answered() {
        for choice in &question.choices {
            match question.mark(choice) {
                ChoiceMark::Correct => println!(
                    "    {} {}) {}",
                    "✓".green().bold(),
                    choice.label,
                    choice.text.green()
                ),
                ChoiceMark::Wrong => println!(
                    "    {} {}) {}",
                    "✗".red().bold(),
                    choice.label,
                    choice.text.red()
                ),
                ChoiceMark::Neutral => {
                    println!("      {}) {}", choice.label, choice.text.dimmed())
                }
            }
        }
        println!();
        match question.is_correct {
            Some(true) => println!("  {} Correct!", "✓".green().bold()),
            _ => println!(
                "  {} Incorrect. Correct answer: {}",
                "✗".red().bold(),
                question.correct_answer
            ),
        }
    } else {
        for choice in &question.choices {
            println!("      {}) {}", choice.label, choice.text);
        }
    }

    println!("{}", "─".repeat(50).dimmed());
}

fn print_quiz_summary(title: &str, summary: QuizSummary) {
    println!();
    println!(
        "    {}",
        "╭──────────────────────────────────────────────────────╮".green()
    );
    println!(
        "    {}             {}             {}",
        "│".green(),
        "🎯 QUIZ RESULTS 🎯".bold().white(),
        "│".green()
    );
    println!(
        "    {}  {:<52}{}",
        "│".green(),
        title,
        "│".green()
    );
    println!(
        "    {}  Score: {} / {} ({}%)                                  {}",
        "│".green(),
        summary.correct.to_string().cyan(),
        summary.total,
        summary.percent,
        "│".green()
    );
    println!(
        "    {}",
        "╰──────────────────────────────────────────────────────╯".green()
    );
    println!();
}
