use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;

use crate::analytics::{self, ScoreBand, SignalThresholds, SignalTone};
use crate::api::ApiClient;
use crate::api::types::{FlashcardStats, QuizResult};
use crate::config::Config;
use crate::ui;

use super::require_profile;

pub async fn run() -> Result<()> {
    let config = Config::load()?;
    let Some(profile) = require_profile(&config) else {
        return Ok(());
    };
    let client = ApiClient::new(&config.backend_url(), Some(profile.user_id));

    println!();
    println!(
        "    {}",
        "╭──────────────────────────────────────────────────────╮".blue()
    );
    println!(
        "    {}          {}          {}",
        "│".blue(),
        "📈 LEARNING ANALYTICS 📈".bold().white(),
        "│".blue()
    );
    println!(
        "    {}      {}      {}",
        "│".blue(),
        "Quiz trend, history, and flashcard mastery".dimmed(),
        "│".blue()
    );
    println!(
        "    {}",
        "╰──────────────────────────────────────────────────────╯".blue()
    );
    println!();

    let spinner = ui::spinner("Loading analytics...");
    let stats = client.learning_stats(profile.user_id).await;
    spinner.finish_and_clear();

    let stats = match stats {
        Ok(stats) => stats,
        Err(e) => {
            println!("{} {}", "Analytics unavailable:".red().bold(), e);
            return Ok(());
        }
    };

    let signal = analytics::compute_learning_signal(
        &stats.overview,
        &stats.quizzes,
        &stats.flashcards,
        &SignalThresholds::default(),
    );

    let title = match signal.tone {
        SignalTone::Good => signal.title.green().bold(),
        SignalTone::Risk => signal.title.red().bold(),
        SignalTone::Cold => signal.title.blue().bold(),
        SignalTone::MidRising | SignalTone::MidFlat => signal.title.yellow().bold(),
    };
    println!("  {}", title);
    println!("  {}\n", signal.hint.dimmed());

    let total_quizzes = stats
        .overview
        .total_quizzes
        .max(stats.quizzes.len() as i64);
    println!("{}", "Overview".bold());
    println!("{}", "─".repeat(50).dimmed());
    println!("  Total quizzes:       {}", total_quizzes.to_string().cyan());
    println!(
        "  Average score:       {}",
        fmt_pct(stats.overview.avg_quiz_score).cyan()
    );
    println!(
        "  Last score:          {}",
        fmt_pct(stats.overview.last_quiz_score).cyan()
    );
    println!(
        "  Last 10 questions:   {}",
        fmt_pct(stats.overview.accuracy_last_10_questions).cyan()
    );
    println!();

    print_trend(&stats.quizzes);
    print_history(&stats.quizzes);
    print_mastery(&stats.flashcards);

    Ok(())
}

fn fmt_pct(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => format!("{}%", v.round() as i64),
        None => "-".to_string(),
    }
}

fn fmt_date(value: &DateTime<Utc>) -> String {
    value.format("%b %d").to_string()
}

fn truncate_text(value: &str, max_len: usize) -> String {
    let text = value.trim();
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_len.saturating_sub(3)).collect();
    format!("{cut}...")
}

fn score_bar(score: f64) -> String {
    let width = ((score / 100.0) * 30.0).round().max(1.0) as usize;
    let bar = "█".repeat(width);
    match analytics::score_band(score) {
        ScoreBand::High => bar.green().to_string(),
        ScoreBand::Mid => bar.yellow().to_string(),
        ScoreBand::Low => bar.red().to_string(),
    }
}

fn score_pill(score: f64) -> String {
    let text = format!("{}%", score.round() as i64);
    match analytics::score_band(score) {
        ScoreBand::High => text.green().to_string(),
        ScoreBand::Mid => text.yellow().to_string(),
        ScoreBand::Low => text.red().to_string(),
    }
}

/// Score bars for the most recent quizzes, oldest first.
fn print_trend(quizzes: &[QuizResult]) {
    println!("{}", "Score trend".bold());
    println!("{}", "─".repeat(50).dimmed());

    if quizzes.is_empty() {
        println!("  {}\n", "No quiz scores yet.".dimmed());
        return;
    }

    let start = quizzes.len().saturating_sub(12);
    let recent = &quizzes[start..];

    for (i, quiz) in recent.iter().enumerate() {
        let score = analytics::clamp_score(quiz.score_percent);
        println!(
            "  {:>2} {} {} {}",
            i + 1,
            score_bar(score),
            score_pill(score),
            format!("({})", fmt_date(&quiz.created_at)).dimmed()
        );
    }

    let first = &recent[0];
    let last = &recent[recent.len() - 1];
    println!(
        "  {}\n",
        format!(
            "From {} to {} | {} quizzes",
            fmt_date(&first.created_at),
            fmt_date(&last.created_at),
            recent.len()
        )
        .dimmed()
    );
}

/// The last few quizzes, newest first.
fn print_history(quizzes: &[QuizResult]) {
    println!("{}", "Recent quizzes".bold());
    println!("{}", "─".repeat(50).dimmed());

    if quizzes.is_empty() {
        println!("  {}\n", "No quizzes completed yet.".dimmed());
        return;
    }

    for quiz in quizzes.iter().rev().take(8) {
        let score = analytics::clamp_score(quiz.score_percent);
        let title = quiz
            .title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Quiz #{}", quiz.quiz_id));
        println!(
            "  {:<44} {} {}",
            truncate_text(&title, 42),
            score_pill(score),
            format!("({})", fmt_date(&quiz.created_at)).dimmed()
        );
    }
    println!();
}

/// Flashcard mastery, ranked by attempts.
fn print_mastery(flashcards: &[FlashcardStats]) {
    println!("{}", "Flashcard mastery".bold());
    println!("{}", "─".repeat(50).dimmed());

    if flashcards.is_empty() {
        println!("  {}\n", "No flashcard attempts yet.".dimmed());
        return;
    }

    let mastery = analytics::mastery_summary(flashcards);
    println!(
        "  {}",
        format!(
            "{}/{} practiced flashcards are at mastery level (>=80%).",
            mastery.mastered, mastery.attempted
        )
        .dimmed()
    );
    println!();

    let mut ranked: Vec<&FlashcardStats> = flashcards.iter().collect();
    ranked.sort_by(|a, b| b.total_attempts.cmp(&a.total_attempts));

    for card in ranked.iter().take(8) {
        let accuracy = match card.accuracy.filter(|a| a.is_finite()) {
            Some(acc) if card.total_attempts > 0 => {
                score_pill(analytics::clamp_score(acc))
            }
            _ => "No data".dimmed().to_string(),
        };
        println!("  {:<56} {}", truncate_text(&card.question, 54), accuracy);
        println!(
            "    {}",
            format!(
                "{} attempts - {} correct",
                card.total_attempts, card.correct_attempts
            )
            .dimmed()
        );
    }
    println!();
}
