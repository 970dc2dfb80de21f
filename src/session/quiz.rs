use crate::api::TutorBackend;
use crate::api::types::{QuizDetail, QuizQuestion};

use super::error::SessionError;

const FALLBACK_LABELS: [&str; 4] = ["A", "B", "C", "D"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McqChoice {
    pub label: String,
    pub text: String,
}

/// One normalized multiple-choice question. `(submitted, is_correct)` start
/// unset and, once set, stay set for the rest of the attempt.
#[derive(Debug, Clone)]
pub struct McqQuestion {
    pub id: i64,
    pub prompt: String,
    pub choices: Vec<McqChoice>,
    pub correct_answer: String,
    pub submitted: Option<String>,
    pub is_correct: Option<bool>,
}

/// How one choice should be drawn after the question is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceMark {
    Correct,
    Wrong,
    Neutral,
}

impl McqQuestion {
    pub fn answered(&self) -> bool {
        self.submitted.is_some()
    }

    /// Marking tie-break for a redrawn answered question: correct text wins,
    /// the user's differing pick is wrong, everything else neutral. When the
    /// submitted text equals the correct text only the correct mark applies.
    pub fn mark(&self, choice: &McqChoice) -> ChoiceMark {
        let Some(submitted) = &self.submitted else {
            return ChoiceMark::Neutral;
        };

        if choice.text.trim() == self.correct_answer.trim() {
            ChoiceMark::Correct
        } else if choice.text.trim() == submitted.trim() {
            ChoiceMark::Wrong
        } else {
            ChoiceMark::Neutral
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizSummary {
    pub correct: usize,
    pub total: usize,
    /// `round(correct / total * 100)`, 0 for an empty quiz.
    pub percent: u32,
}

/// Outcome of an `answer` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Question already answered or a submission was in flight; nothing
    /// changed.
    Ignored,
    Recorded { correct: bool },
}

/// Outcome of an `advance` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the next question.
    Next,
    /// Walked past the last question; the round is now in its summary state.
    Finished,
    /// Current question is still unanswered; nothing changed.
    NotAnswered,
}

/// One quiz attempt: the generated questions, a forward-only cursor, and the
/// running score. Owned by the command loop that drives it; dropping the
/// round discards the attempt, which is also what keeps a late response from
/// ever touching a closed session.
#[derive(Debug)]
pub struct QuizRound {
    quiz_id: i64,
    title: String,
    questions: Vec<McqQuestion>,
    cursor: usize,
    answered: usize,
    correct: usize,
    busy: bool,
    finished: bool,
}

impl QuizRound {
    /// Request quiz generation for a set of flashcard ids and build the
    /// round from the response. Duplicate ids collapse, first-seen order
    /// kept. Any failure here leaves no round behind — a retry with the same
    /// ids starts clean.
    pub async fn start(
        backend: &dyn TutorBackend,
        user_id: i64,
        title: &str,
        flashcard_ids: &[i64],
    ) -> Result<Self, SessionError> {
        let ids = dedup_ids(flashcard_ids);
        if ids.is_empty() {
            return Err(SessionError::EmptyQuiz);
        }

        let detail = backend.generate_mcq_quiz(user_id, title, &ids).await?;
        Self::from_detail(detail)
    }

    /// Build a round from an already-fetched quiz, normalizing the question
    /// list. Fails with `EmptyQuiz` when nothing usable remains.
    pub fn from_detail(detail: QuizDetail) -> Result<Self, SessionError> {
        let questions = normalize_questions(detail.questions);
        if questions.is_empty() {
            return Err(SessionError::EmptyQuiz);
        }

        let answered = questions.iter().filter(|q| q.answered()).count();
        let correct = questions
            .iter()
            .filter(|q| q.is_correct == Some(true))
            .count();

        Ok(Self {
            quiz_id: detail.quiz.id,
            title: detail
                .quiz
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "MCQ Quiz".to_string()),
            questions,
            cursor: 0,
            answered,
            correct,
            busy: false,
            finished: false,
        })
    }

    pub fn quiz_id(&self) -> i64 {
        self.quiz_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn finished(&self) -> bool {
        self.finished
    }

    pub fn answered_count(&self) -> usize {
        self.answered
    }

    pub fn correct_count(&self) -> usize {
        self.correct
    }

    pub fn current(&self) -> Result<&McqQuestion, SessionError> {
        if self.finished {
            return Err(SessionError::NoActiveQuiz);
        }
        self.questions
            .get(self.cursor)
            .ok_or(SessionError::NoActiveQuiz)
    }

    /// Submit the selected choice text for the current question. Calls while
    /// a submission is in flight, or against an already-answered question,
    /// change nothing. A failed submission leaves the question unanswered so
    /// the user can retry.
    pub async fn answer(
        &mut self,
        backend: &dyn TutorBackend,
        choice_text: &str,
    ) -> Result<AnswerOutcome, SessionError> {
        let question_id = {
            let question = self.current()?;
            if self.busy || question.answered() {
                return Ok(AnswerOutcome::Ignored);
            }
            question.id
        };

        self.busy = true;
        let result = backend
            .submit_answer(self.quiz_id, question_id, choice_text)
            .await;
        self.busy = false;

        let record = match result {
            Ok(record) => record,
            Err(err) => return Err(SessionError::AnswerSubmit(err.to_string())),
        };

        // The response is keyed to the question we asked about; apply it
        // only there, never to whatever the cursor points at by now.
        let Some(question) = self.questions.iter_mut().find(|q| q.id == question_id) else {
            return Ok(AnswerOutcome::Ignored);
        };

        let submitted = record
            .user_answer
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| choice_text.to_string());
        let is_correct = record.is_correct.unwrap_or(false);

        question.submitted = Some(submitted);
        question.is_correct = Some(is_correct);
        self.answered += 1;
        if is_correct {
            self.correct += 1;
        }

        Ok(AnswerOutcome::Recorded {
            correct: is_correct,
        })
    }

    /// Move past the current question once it is answered. There is no
    /// rewind: leaving the quiz is the only way back.
    pub fn advance(&mut self) -> Advance {
        if self.finished {
            return Advance::Finished;
        }

        let answered = self
            .questions
            .get(self.cursor)
            .is_some_and(McqQuestion::answered);
        if !answered {
            return Advance::NotAnswered;
        }

        if self.cursor + 1 >= self.questions.len() {
            self.finished = true;
            Advance::Finished
        } else {
            self.cursor += 1;
            Advance::Next
        }
    }

    pub fn summary(&self) -> QuizSummary {
        let total = self.questions.len();
        let percent = if total > 0 {
            ((self.correct as f64 / total as f64) * 100.0).round() as u32
        } else {
            0
        };

        QuizSummary {
            correct: self.correct,
            total,
            percent,
        }
    }
}

/// Collapse duplicates, keeping first-seen order.
pub fn dedup_ids(ids: &[i64]) -> Vec<i64> {
    let mut seen = std::collections::HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Normalize backend questions: trim option text, substitute positional
/// labels where missing, drop malformed options, then drop any question left
/// without options.
pub fn normalize_questions(records: Vec<QuizQuestion>) -> Vec<McqQuestion> {
    let mut normalized = Vec::with_capacity(records.len());

    for record in records {
        let raw_options = record
            .mcq_options
            .map(|mcq| mcq.options)
            .unwrap_or_default();

        let choices: Vec<McqChoice> = raw_options
            .into_iter()
            .enumerate()
            .map(|(idx, option)| {
                let label = if option.label.trim().is_empty() {
                    FALLBACK_LABELS.get(idx).copied().unwrap_or("").to_string()
                } else {
                    option.label.trim().to_string()
                };
                McqChoice {
                    label,
                    text: option.text.trim().to_string(),
                }
            })
            .filter(|choice| !choice.label.is_empty() && !choice.text.is_empty())
            .collect();

        if choices.is_empty() {
            continue;
        }

        normalized.push(McqQuestion {
            id: record.id,
            prompt: record.question_text,
            choices,
            correct_answer: record.correct_answer,
            submitted: record.user_answer,
            is_correct: record.is_correct,
        });
    }

    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::api::types::{
        Flashcard, LearningStats, McqOption, McqOptions, Quiz, QuizDetail, QuizQuestion,
    };
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;

    fn quiz_header(id: i64) -> Quiz {
        Quiz {
            id,
            user_id: 1,
            title: Some("MCQ Quiz".to_string()),
            total_questions: 0,
            correct_answers: 0,
            score_percent: 0.0,
            created_at: Utc::now(),
        }
    }

    fn question(id: i64, prompt: &str, correct: &str, options: &[(&str, &str)]) -> QuizQuestion {
        QuizQuestion {
            id,
            quiz_id: 7,
            flashcard_id: id,
            question_text: prompt.to_string(),
            correct_answer: correct.to_string(),
            user_answer: None,
            is_correct: None,
            order_index: id,
            mcq_options: Some(McqOptions {
                options: options
                    .iter()
                    .map(|(label, text)| McqOption {
                        label: label.to_string(),
                        text: text.to_string(),
                    })
                    .collect(),
                correct_label: None,
            }),
        }
    }

    fn four_options(correct: &str) -> Vec<(&'static str, String)> {
        vec![
            ("A", correct.to_string()),
            ("B", "wrong one".to_string()),
            ("C", "wrong two".to_string()),
            ("D", "wrong three".to_string()),
        ]
    }

    fn detail_with_questions(count: i64) -> QuizDetail {
        let questions = (1..=count)
            .map(|id| {
                let opts = four_options(&format!("answer {id}"));
                let opts: Vec<(&str, &str)> =
                    opts.iter().map(|(l, t)| (*l, t.as_str())).collect();
                question(id, &format!("prompt {id}"), &format!("answer {id}"), &opts)
            })
            .collect();

        QuizDetail {
            quiz: quiz_header(7),
            questions,
        }
    }

    /// Scripted backend: correctness is exact match against the question's
    /// correct answer; every call is recorded.
    struct MockBackend {
        detail: Mutex<Option<QuizDetail>>,
        fail_generate: bool,
        fail_submit: bool,
        generate_calls: Mutex<Vec<Vec<i64>>>,
        submit_calls: Mutex<Vec<(i64, i64, String)>>,
        answers: Mutex<Vec<(i64, String)>>, // question id -> correct answer
    }

    impl MockBackend {
        fn with_detail(detail: QuizDetail) -> Self {
            let answers = detail
                .questions
                .iter()
                .map(|q| (q.id, q.correct_answer.clone()))
                .collect();
            Self {
                detail: Mutex::new(Some(detail)),
                fail_generate: false,
                fail_submit: false,
                generate_calls: Mutex::new(Vec::new()),
                submit_calls: Mutex::new(Vec::new()),
                answers: Mutex::new(answers),
            }
        }

        fn failing_generate() -> Self {
            Self {
                detail: Mutex::new(None),
                fail_generate: true,
                fail_submit: false,
                generate_calls: Mutex::new(Vec::new()),
                submit_calls: Mutex::new(Vec::new()),
                answers: Mutex::new(Vec::new()),
            }
        }

        fn failing_submit(detail: QuizDetail) -> Self {
            let mut backend = Self::with_detail(detail);
            backend.fail_submit = true;
            backend
        }
    }

    #[async_trait]
    impl TutorBackend for MockBackend {
        async fn chat_flashcards(
            &self,
            _user_id: i64,
            _chat_session_id: i64,
            _only_active: bool,
        ) -> Result<Vec<Flashcard>, ApiError> {
            Ok(Vec::new())
        }

        async fn generate_mcq_quiz(
            &self,
            _user_id: i64,
            _title: &str,
            flashcard_ids: &[i64],
        ) -> Result<QuizDetail, ApiError> {
            self.generate_calls
                .lock()
                .unwrap()
                .push(flashcard_ids.to_vec());

            if self.fail_generate {
                return Err(ApiError::Unreachable {
                    base: "http://127.0.0.1:8000".to_string(),
                });
            }

            self.detail
                .lock()
                .unwrap()
                .take()
                .ok_or_else(|| ApiError::Decode("no scripted quiz".to_string()))
        }

        async fn submit_answer(
            &self,
            quiz_id: i64,
            question_id: i64,
            user_answer: &str,
        ) -> Result<QuizQuestion, ApiError> {
            self.submit_calls
                .lock()
                .unwrap()
                .push((quiz_id, question_id, user_answer.to_string()));

            if self.fail_submit {
                return Err(ApiError::from_status(500, None, "submit exploded"));
            }

            let correct_answer = self
                .answers
                .lock()
                .unwrap()
                .iter()
                .find(|(id, _)| *id == question_id)
                .map(|(_, answer)| answer.clone())
                .unwrap_or_default();
            let is_correct = user_answer == correct_answer;

            Ok(QuizQuestion {
                id: question_id,
                quiz_id,
                flashcard_id: question_id,
                question_text: String::new(),
                correct_answer,
                user_answer: Some(user_answer.to_string()),
                is_correct: Some(is_correct),
                order_index: 0,
                mcq_options: None,
            })
        }

        async fn learning_stats(&self, _user_id: i64) -> Result<LearningStats, ApiError> {
            Ok(LearningStats::default())
        }
    }

    #[test]
    fn dedup_keeps_first_seen_order() {
        assert_eq!(dedup_ids(&[3, 1, 3, 2, 1]), vec![3, 1, 2]);
        assert!(dedup_ids(&[]).is_empty());
    }

    #[tokio::test]
    async fn start_sends_deduplicated_ids() {
        let backend = MockBackend::with_detail(detail_with_questions(3));
        let round = QuizRound::start(&backend, 1, "MCQ Quiz", &[3, 1, 3, 2, 1])
            .await
            .unwrap();

        assert_eq!(round.len(), 3);
        let calls = backend.generate_calls.lock().unwrap();
        assert_eq!(calls.as_slice(), &[vec![3, 1, 2]]);
    }

    #[tokio::test]
    async fn start_with_no_ids_never_hits_the_backend() {
        let backend = MockBackend::with_detail(detail_with_questions(1));
        let err = QuizRound::start(&backend, 1, "MCQ Quiz", &[]).await.unwrap_err();

        assert!(matches!(err, SessionError::EmptyQuiz));
        assert!(backend.generate_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_generation_rolls_back_and_retry_is_clean() {
        let failing = MockBackend::failing_generate();
        let err = QuizRound::start(&failing, 1, "MCQ Quiz", &[1, 2])
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Backend(_)));

        // Same ids against a healthy backend start from scratch.
        let healthy = MockBackend::with_detail(detail_with_questions(2));
        let round = QuizRound::start(&healthy, 1, "MCQ Quiz", &[1, 2])
            .await
            .unwrap();
        assert_eq!(round.cursor(), 0);
        assert_eq!(round.answered_count(), 0);
        assert_eq!(round.correct_count(), 0);
    }

    #[tokio::test]
    async fn answer_is_at_most_once_per_question() {
        let backend = MockBackend::with_detail(detail_with_questions(2));
        let mut round = QuizRound::start(&backend, 1, "MCQ Quiz", &[1, 2])
            .await
            .unwrap();

        let first = round.answer(&backend, "answer 1").await.unwrap();
        assert_eq!(first, AnswerOutcome::Recorded { correct: true });
        assert_eq!(round.answered_count(), 1);
        assert_eq!(round.correct_count(), 1);

        let second = round.answer(&backend, "wrong one").await.unwrap();
        assert_eq!(second, AnswerOutcome::Ignored);
        assert_eq!(round.answered_count(), 1);
        assert_eq!(round.correct_count(), 1);
        assert_eq!(backend.submit_calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_submission_leaves_question_answerable() {
        let backend = MockBackend::failing_submit(detail_with_questions(1));
        let mut round = QuizRound::start(&backend, 1, "MCQ Quiz", &[1])
            .await
            .unwrap();

        let err = round.answer(&backend, "answer 1").await.unwrap_err();
        assert!(matches!(err, SessionError::AnswerSubmit(_)));
        assert!(!round.current().unwrap().answered());
        assert_eq!(round.answered_count(), 0);
        assert_eq!(round.advance(), Advance::NotAnswered);
    }

    #[tokio::test]
    async fn three_of_five_scores_sixty_percent() {
        let backend = MockBackend::with_detail(detail_with_questions(5));
        let mut round = QuizRound::start(&backend, 1, "MCQ Quiz", &[1, 2, 3, 4, 5])
            .await
            .unwrap();

        for n in 1..=5 {
            let text = if n <= 3 {
                format!("answer {n}")
            } else {
                "wrong one".to_string()
            };
            round.answer(&backend, &text).await.unwrap();
            let advance = round.advance();
            if n < 5 {
                assert_eq!(advance, Advance::Next);
            } else {
                assert_eq!(advance, Advance::Finished);
            }
        }

        assert!(round.finished());
        let summary = round.summary();
        assert_eq!(summary.correct, 3);
        assert_eq!(summary.total, 5);
        assert_eq!(summary.percent, 60);
    }

    #[tokio::test]
    async fn advance_requires_an_answer() {
        let backend = MockBackend::with_detail(detail_with_questions(2));
        let mut round = QuizRound::start(&backend, 1, "MCQ Quiz", &[1, 2])
            .await
            .unwrap();

        assert_eq!(round.advance(), Advance::NotAnswered);
        assert_eq!(round.cursor(), 0);
    }

    #[test]
    fn marking_never_double_marks_a_correct_pick() {
        let question = McqQuestion {
            id: 1,
            prompt: "prompt".to_string(),
            choices: vec![
                McqChoice {
                    label: "A".to_string(),
                    text: "right".to_string(),
                },
                McqChoice {
                    label: "B".to_string(),
                    text: "other".to_string(),
                },
            ],
            correct_answer: "right".to_string(),
            submitted: Some("right".to_string()),
            is_correct: Some(true),
        };

        let marks: Vec<ChoiceMark> = question.choices.iter().map(|c| question.mark(c)).collect();
        let correct = marks.iter().filter(|m| **m == ChoiceMark::Correct).count();
        let wrong = marks.iter().filter(|m| **m == ChoiceMark::Wrong).count();
        assert_eq!(correct, 1);
        assert_eq!(wrong, 0);
    }

    #[test]
    fn marking_flags_a_wrong_pick() {
        let question = McqQuestion {
            id: 1,
            prompt: "prompt".to_string(),
            choices: vec![
                McqChoice {
                    label: "A".to_string(),
                    text: "right".to_string(),
                },
                McqChoice {
                    label: "B".to_string(),
                    text: "other".to_string(),
                },
                McqChoice {
                    label: "C".to_string(),
                    text: "bystander".to_string(),
                },
            ],
            correct_answer: "right".to_string(),
            submitted: Some("other".to_string()),
            is_correct: Some(false),
        };

        assert_eq!(question.mark(&question.choices[0]), ChoiceMark::Correct);
        assert_eq!(question.mark(&question.choices[1]), ChoiceMark::Wrong);
        assert_eq!(question.mark(&question.choices[2]), ChoiceMark::Neutral);
    }

    #[test]
    fn unanswered_question_marks_nothing() {
        let question = McqQuestion {
            id: 1,
            prompt: "prompt".to_string(),
            choices: vec![McqChoice {
                label: "A".to_string(),
                text: "right".to_string(),
            }],
            correct_answer: "right".to_string(),
            submitted: None,
            is_correct: None,
        };

        assert_eq!(question.mark(&question.choices[0]), ChoiceMark::Neutral);
    }

    #[test]
    fn normalization_drops_malformed_options_and_empty_questions() {
        let records = vec![
            // Options with empty text vanish; missing labels get positional ones.
            QuizQuestion {
                id: 1,
                quiz_id: 7,
                flashcard_id: 1,
                question_text: "keep me".to_string(),
                correct_answer: "yes".to_string(),
                user_answer: None,
                is_correct: None,
                order_index: 0,
                mcq_options: Some(McqOptions {
                    options: vec![
                        McqOption {
                            label: String::new(),
                            text: " yes ".to_string(),
                        },
                        McqOption {
                            label: "B".to_string(),
                            text: "   ".to_string(),
                        },
                    ],
                    correct_label: None,
                }),
            },
            // No options at all: the question is dropped.
            QuizQuestion {
                id: 2,
                quiz_id: 7,
                flashcard_id: 2,
                question_text: "drop me".to_string(),
                correct_answer: "no".to_string(),
                user_answer: None,
                is_correct: None,
                order_index: 1,
                mcq_options: None,
            },
        ];

        let normalized = normalize_questions(records);
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized[0].prompt, "keep me");
        assert_eq!(
            normalized[0].choices,
            vec![McqChoice {
                label: "A".to_string(),
                text: "yes".to_string(),
            }]
        );
    }

    #[test]
    fn all_questions_unusable_is_an_empty_quiz() {
        let detail = QuizDetail {
            quiz: quiz_header(7),
            questions: vec![QuizQuestion {
                id: 1,
                quiz_id: 7,
                flashcard_id: 1,
                question_text: "no options".to_string(),
                correct_answer: "x".to_string(),
                user_answer: None,
                is_correct: None,
                order_index: 0,
                mcq_options: Some(McqOptions::default()),
            }],
        };

        assert!(matches!(
            QuizRound::from_detail(detail),
            Err(SessionError::EmptyQuiz)
        ));
    }

    #[test]
    fn empty_quiz_summary_is_zero_percent() {
        // from_detail refuses empty quizzes, so exercise summary directly.
        let round = QuizRound {
            quiz_id: 7,
            title: "MCQ Quiz".to_string(),
            questions: Vec::new(),
            cursor: 0,
            answered: 0,
            correct: 0,
            busy: false,
            finished: true,
        };
        assert_eq!(round.summary().percent, 0);
    }
}
