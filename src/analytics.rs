//! Client-side learning analytics: the coarse learning-signal classifier and
//! the aggregates the stats screen derives from the three stats endpoints.

use crate::api::types::{FlashcardStats, QuizResult, StatsOverview};

/// A flashcard counts as mastered after this many attempts at this accuracy.
const MASTERY_MIN_ATTEMPTS: i64 = 2;
const MASTERY_ACCURACY: f64 = 80.0;

/// Product-tuned cutoffs for the signal classifier. These are knobs, not
/// invariants; everything reads them through this struct.
#[derive(Debug, Clone, Copy)]
pub struct SignalThresholds {
    /// Below this many recorded quizzes the signal is always `Cold`.
    pub min_quizzes: i64,
    /// Recent-10 accuracy at or above this reads as strong retention.
    pub strong_accuracy: f64,
    /// Trend delta at or above this reads as strong improvement.
    pub strong_trend: f64,
    /// Trend delta at or above this reads as steady progress.
    pub rising_trend: f64,
    /// Trend delta at or below this reads as regression.
    pub risk_trend: f64,
    /// Recent-10 accuracy below this reads as regression.
    pub risk_accuracy: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            min_quizzes: 2,
            strong_accuracy: 85.0,
            strong_trend: 10.0,
            rising_trend: 3.0,
            risk_trend: -6.0,
            risk_accuracy: 55.0,
        }
    }
}

/// Mutually exclusive signal tones, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalTone {
    Cold,
    Good,
    MidRising,
    Risk,
    MidFlat,
}

#[derive(Debug, Clone)]
pub struct LearningSignal {
    pub tone: SignalTone,
    pub title: &'static str,
    pub hint: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterySummary {
    pub mastered: usize,
    pub attempted: usize,
}

/// Banding for score bars and pills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    High,
    Mid,
    Low,
}

pub fn score_band(score: f64) -> ScoreBand {
    if score >= 80.0 {
        ScoreBand::High
    } else if score >= 60.0 {
        ScoreBand::Mid
    } else {
        ScoreBand::Low
    }
}

pub fn clamp_score(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

fn avg(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Average of the last `min(3, n)` scores minus the average of the first
/// `min(3, n)` scores, each score clamped to [0, 100].
pub fn trend_delta(quizzes: &[QuizResult]) -> f64 {
    let scores: Vec<f64> = quizzes.iter().map(|q| clamp_score(q.score_percent)).collect();
    let window = scores.len().min(3);
    let first = avg(&scores[..window]).unwrap_or(0.0);
    let last = avg(&scores[scores.len() - window..]).unwrap_or(0.0);
    last - first
}

pub fn mastery_summary(flashcards: &[FlashcardStats]) -> MasterySummary {
    let attempted = flashcards.iter().filter(|fc| fc.total_attempts > 0).count();
    let mastered = flashcards
        .iter()
        .filter(|fc| {
            fc.total_attempts >= MASTERY_MIN_ATTEMPTS
                && fc.accuracy.is_some_and(|acc| acc >= MASTERY_ACCURACY)
        })
        .count();

    MasterySummary { mastered, attempted }
}

/// Classify the learning trend. Rules are checked in a fixed order and the
/// first match wins: cold, good, mid-rising, risk, mid-flat.
pub fn compute_learning_signal(
    overview: &StatsOverview,
    quizzes: &[QuizResult],
    flashcards: &[FlashcardStats],
    thresholds: &SignalThresholds,
) -> LearningSignal {
    let total_quizzes = overview.total_quizzes.max(quizzes.len() as i64);
    let delta = trend_delta(quizzes);
    let recent_accuracy = overview
        .accuracy_last_10_questions
        .filter(|acc| acc.is_finite());

    let mastery = mastery_summary(flashcards);
    let mastery_hint = if mastery.attempted > 0 {
        format!(
            "{}/{} practiced flashcards look mastered.",
            mastery.mastered, mastery.attempted
        )
    } else {
        "Keep answering quizzes to build flashcard mastery data.".to_string()
    };

    if total_quizzes < thresholds.min_quizzes {
        return LearningSignal {
            tone: SignalTone::Cold,
            title: "Collecting baseline",
            hint: "Run at least two quizzes to estimate learning trend.".to_string(),
        };
    }

    if recent_accuracy.is_some_and(|acc| acc >= thresholds.strong_accuracy)
        || delta >= thresholds.strong_trend
    {
        return LearningSignal {
            tone: SignalTone::Good,
            title: "Strong improvement",
            hint: format!("Recent retention is high. {mastery_hint}"),
        };
    }

    if delta >= thresholds.rising_trend {
        return LearningSignal {
            tone: SignalTone::MidRising,
            title: "Steady progress",
            hint: "Scores are improving. Continue mixed-topic quizzes to stabilize recall."
                .to_string(),
        };
    }

    if delta <= thresholds.risk_trend
        || recent_accuracy.is_some_and(|acc| acc < thresholds.risk_accuracy)
    {
        return LearningSignal {
            tone: SignalTone::Risk,
            title: "Needs reinforcement",
            hint: "Performance is dropping. Revisit low-accuracy flashcards before new quizzes."
                .to_string(),
        };
    }

    LearningSignal {
        tone: SignalTone::MidFlat,
        title: "Stable but flat",
        hint: "Learning is stable. Increase challenge to push score growth.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn quiz(score: f64) -> QuizResult {
        QuizResult {
            quiz_id: 1,
            title: None,
            score_percent: score,
            created_at: Utc::now(),
        }
    }

    fn quizzes(scores: &[f64]) -> Vec<QuizResult> {
        scores.iter().copied().map(quiz).collect()
    }

    fn overview(total: i64, recent: Option<f64>) -> StatsOverview {
        StatsOverview {
            total_flashcards: 0,
            total_quizzes: total,
            avg_quiz_score: None,
            last_quiz_score: None,
            accuracy_last_10_questions: recent,
        }
    }

    fn card_stats(attempts: i64, correct: i64) -> FlashcardStats {
        FlashcardStats {
            flashcard_id: 1,
            question: "Q".to_string(),
            answer: "A".to_string(),
            total_attempts: attempts,
            correct_attempts: correct,
            last_attempt_at: None,
            accuracy: if attempts > 0 {
                Some(correct as f64 / attempts as f64 * 100.0)
            } else {
                None
            },
        }
    }

    #[test]
    fn fewer_than_two_quizzes_is_cold_even_with_high_accuracy() {
        let signal = compute_learning_signal(
            &overview(1, Some(95.0)),
            &quizzes(&[95.0]),
            &[],
            &SignalThresholds::default(),
        );
        assert_eq!(signal.tone, SignalTone::Cold);
    }

    #[test]
    fn strong_recent_accuracy_wins_before_rising_trend() {
        let signal = compute_learning_signal(
            &overview(5, Some(90.0)),
            &quizzes(&[70.0, 70.0, 70.0, 75.0, 75.0]),
            &[],
            &SignalThresholds::default(),
        );
        assert_eq!(signal.tone, SignalTone::Good);
    }

    #[test]
    fn strong_trend_alone_is_good() {
        // First window averages 50, last window averages 80: delta 30.
        let signal = compute_learning_signal(
            &overview(6, None),
            &quizzes(&[50.0, 50.0, 50.0, 80.0, 80.0, 80.0]),
            &[],
            &SignalThresholds::default(),
        );
        assert_eq!(signal.tone, SignalTone::Good);
    }

    #[test]
    fn small_positive_trend_is_mid_rising() {
        // First window ~63.3, last window ~67.3: delta 4.
        let signal = compute_learning_signal(
            &overview(4, Some(70.0)),
            &quizzes(&[60.0, 60.0, 70.0, 72.0]),
            &[],
            &SignalThresholds::default(),
        );
        assert_eq!(signal.tone, SignalTone::MidRising);
    }

    #[test]
    fn dropping_trend_is_risk() {
        let signal = compute_learning_signal(
            &overview(4, Some(70.0)),
            &quizzes(&[80.0, 80.0, 70.0, 60.0]),
            &[],
            &SignalThresholds::default(),
        );
        assert_eq!(signal.tone, SignalTone::Risk);
    }

    #[test]
    fn low_recent_accuracy_is_risk_when_trend_is_flat() {
        let signal = compute_learning_signal(
            &overview(4, Some(40.0)),
            &quizzes(&[60.0, 60.0, 60.0, 60.0]),
            &[],
            &SignalThresholds::default(),
        );
        assert_eq!(signal.tone, SignalTone::Risk);
    }

    #[test]
    fn flat_and_unremarkable_is_mid_flat() {
        let signal = compute_learning_signal(
            &overview(4, Some(70.0)),
            &quizzes(&[65.0, 66.0, 65.0, 66.0]),
            &[],
            &SignalThresholds::default(),
        );
        assert_eq!(signal.tone, SignalTone::MidFlat);
    }

    #[test]
    fn clamp_score_bounds_and_rejects_non_finite() {
        assert_eq!(clamp_score(150.0), 100.0);
        assert_eq!(clamp_score(-20.0), 0.0);
        assert_eq!(clamp_score(f64::NAN), 0.0);
    }

    #[test]
    fn trend_clamps_out_of_range_scores() {
        // -20s clamp to 0, 150s clamp to 100.
        let delta = trend_delta(&quizzes(&[-20.0, -20.0, -20.0, 150.0, 150.0, 150.0]));
        assert_eq!(delta, 100.0);
    }

    #[test]
    fn trend_of_empty_history_is_zero() {
        assert_eq!(trend_delta(&[]), 0.0);
    }

    #[test]
    fn mastery_requires_attempts_and_accuracy() {
        let cards = vec![
            card_stats(0, 0), // never attempted
            card_stats(1, 1), // accurate but only one attempt
            card_stats(4, 4), // mastered
            card_stats(4, 1), // practiced, low accuracy
        ];
        let summary = mastery_summary(&cards);
        assert_eq!(summary.attempted, 3);
        assert_eq!(summary.mastered, 1);
    }

    #[test]
    fn good_signal_reports_mastery_in_hint() {
        let cards = vec![card_stats(3, 3), card_stats(2, 0)];
        let signal = compute_learning_signal(
            &overview(5, Some(90.0)),
            &quizzes(&[80.0, 85.0, 90.0]),
            &cards,
            &SignalThresholds::default(),
        );
        assert_eq!(signal.tone, SignalTone::Good);
        assert!(signal.hint.contains("1/2"));
    }

    #[test]
    fn score_bands_split_at_eighty_and_sixty() {
        assert_eq!(score_band(92.0), ScoreBand::High);
        assert_eq!(score_band(80.0), ScoreBand::High);
        assert_eq!(score_band(61.5), ScoreBand::Mid);
        assert_eq!(score_band(12.0), ScoreBand::Low);
    }
}
