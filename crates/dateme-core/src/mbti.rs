//! MBTI personality inference.
//!
//! Twenty fixed Likert statements, five per dichotomy, each leaning toward
//! one pole. An answer shifts its pole by `score - 3` and the opposite pole
//! by the negation. After all twenty, each dichotomy picks the pole with the
//! greater-or-equal accumulator; ties go to the first-listed pole (E, S, T, J).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::QuizError;
use crate::model::Subject;

/// One side of a dichotomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pole {
    E,
    I,
    S,
    N,
    T,
    F,
    J,
    P,
}

impl Pole {
    pub const ALL: [Pole; 8] = [
        Pole::E,
        Pole::I,
        Pole::S,
        Pole::N,
        Pole::T,
        Pole::F,
        Pole::J,
        Pole::P,
    ];

    pub fn opposite(self) -> Pole {
        match self {
            Pole::E => Pole::I,
            Pole::I => Pole::E,
            Pole::S => Pole::N,
            Pole::N => Pole::S,
            Pole::T => Pole::F,
            Pole::F => Pole::T,
            Pole::J => Pole::P,
            Pole::P => Pole::J,
        }
    }

    pub fn dichotomy(self) -> Dichotomy {
        match self {
            Pole::E | Pole::I => Dichotomy::EnergyFocus,
            Pole::S | Pole::N => Dichotomy::Perception,
            Pole::T | Pole::F => Dichotomy::Judgment,
            Pole::J | Pole::P => Dichotomy::Lifestyle,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Pole::E => 'E',
            Pole::I => 'I',
            Pole::S => 'S',
            Pole::N => 'N',
            Pole::T => 'T',
            Pole::F => 'F',
            Pole::J => 'J',
            Pole::P => 'P',
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// The four opposing trait pairs, in code order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dichotomy {
    /// E / I
    EnergyFocus,
    /// S / N
    Perception,
    /// T / F
    Judgment,
    /// J / P
    Lifestyle,
}

impl Dichotomy {
    pub const ALL: [Dichotomy; 4] = [
        Dichotomy::EnergyFocus,
        Dichotomy::Perception,
        Dichotomy::Judgment,
        Dichotomy::Lifestyle,
    ];

    /// `(first, second)`; the first pole wins ties.
    pub fn poles(self) -> (Pole, Pole) {
        match self {
            Dichotomy::EnergyFocus => (Pole::E, Pole::I),
            Dichotomy::Perception => (Pole::S, Pole::N),
            Dichotomy::Judgment => (Pole::T, Pole::F),
            Dichotomy::Lifestyle => (Pole::J, Pole::P),
        }
    }
}

/// Agreement strength, 1 (Strongly Disagree) through 5 (Strongly Agree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Likert(u8);

impl Likert {
    pub const STRONGLY_DISAGREE: Likert = Likert(1);
    pub const DISAGREE: Likert = Likert(2);
    pub const NEUTRAL: Likert = Likert(3);
    pub const AGREE: Likert = Likert(4);
    pub const STRONGLY_AGREE: Likert = Likert(5);

    pub const ALL: [Likert; 5] = [
        Likert::STRONGLY_DISAGREE,
        Likert::DISAGREE,
        Likert::NEUTRAL,
        Likert::AGREE,
        Likert::STRONGLY_AGREE,
    ];

    pub fn new(score: i64) -> Result<Self, QuizError> {
        if (1..=5).contains(&score) {
            Ok(Likert(score as u8))
        } else {
            Err(QuizError::InvalidScore(score))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Centred on neutral: -2..=2.
    pub fn delta(self) -> i32 {
        i32::from(self.0) - 3
    }

    pub fn label(self) -> &'static str {
        match self.0 {
            1 => "Strongly Disagree",
            2 => "Disagree",
            3 => "Neutral",
            4 => "Agree",
            _ => "Strongly Agree",
        }
    }
}

impl TryFrom<u8> for Likert {
    type Error = QuizError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Likert::new(i64::from(value))
    }
}

impl From<Likert> for u8 {
    fn from(value: Likert) -> Self {
        value.0
    }
}

impl FromStr for Likert {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let score = s
            .parse::<i64>()
            .map_err(|_| QuizError::InvalidAnswer(s.to_string()))?;
        Likert::new(score)
    }
}

/// A questionnaire statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Statement {
    pub id: u32,
    pub text: &'static str,
    /// The pole that agreement counts toward.
    pub pole: Pole,
}

const fn stmt(id: u32, text: &'static str, pole: Pole) -> Statement {
    Statement { id, text, pole }
}

/// The fixed questionnaire, in the order it is asked.
pub const STATEMENTS: [Statement; 20] = [
    stmt(1, "I feel energized after spending time in large social gatherings.", Pole::E),
    stmt(2, "I prefer to think things through alone before discussing them with others.", Pole::I),
    stmt(3, "I often initiate conversations with new people.", Pole::E),
    stmt(4, "I enjoy quiet evenings at home more than going out.", Pole::I),
    stmt(5, "I am comfortable being the center of attention.", Pole::E),
    stmt(6, "I pay close attention to practical details and facts.", Pole::S),
    stmt(7, "I am often drawn to abstract concepts and future possibilities.", Pole::N),
    stmt(8, "I rely on my past experiences and proven methods to solve problems.", Pole::S),
    stmt(9, "I enjoy imagining how things could be, rather than focusing on how they are.", Pole::N),
    stmt(10, "I prefer clear, step-by-step instructions over general guidelines.", Pole::S),
    stmt(11, "When making a decision, I prioritize logic and objective analysis.", Pole::T),
    stmt(12, "I consider the emotional impact of my decisions on others.", Pole::F),
    stmt(13, "I tend to be direct and honest, even if it might upset someone.", Pole::T),
    stmt(14, "I strive for harmony and prefer to avoid conflict.", Pole::F),
    stmt(15, "I am generally seen as fair and consistent in my judgments.", Pole::T),
    stmt(16, "I like to have a clear plan and stick to it.", Pole::J),
    stmt(17, "I prefer to keep my options open and be spontaneous.", Pole::P),
    stmt(18, "I feel more comfortable when things are settled and decided.", Pole::J),
    stmt(19, "I enjoy adapting to new situations rather than following a strict schedule.", Pole::P),
    stmt(20, "I tend to finish tasks well before deadlines.", Pole::J),
];

/// Per-pole accumulators for one quiz pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DichotomyScores([i32; 8]);

impl DichotomyScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, pole: Pole) -> i32 {
        self.0[pole.index()]
    }

    /// Credit `pole` with the answer's delta and debit its opposite.
    pub fn apply(&mut self, pole: Pole, score: Likert) {
        let delta = score.delta();
        self.0[pole.index()] += delta;
        self.0[pole.opposite().index()] -= delta;
    }

    /// Undo a previous [`apply`](Self::apply) with the same arguments.
    pub fn revert(&mut self, pole: Pole, score: Likert) {
        let delta = score.delta();
        self.0[pole.index()] -= delta;
        self.0[pole.opposite().index()] += delta;
    }

    pub fn winner(&self, dichotomy: Dichotomy) -> Pole {
        let (first, second) = dichotomy.poles();
        if self.get(first) >= self.get(second) {
            first
        } else {
            second
        }
    }

    pub fn code(&self) -> PersonalityCode {
        PersonalityCode([
            self.winner(Dichotomy::EnergyFocus),
            self.winner(Dichotomy::Perception),
            self.winner(Dichotomy::Judgment),
            self.winner(Dichotomy::Lifestyle),
        ])
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&v| v == 0)
    }
}

/// Score a complete pass over [`STATEMENTS`], answers given in order.
pub fn score_answers(answers: &[Likert]) -> Result<PersonalityCode, QuizError> {
    if answers.len() != STATEMENTS.len() {
        return Err(QuizError::Incomplete {
            answered: answers.len(),
            expected: STATEMENTS.len(),
        });
    }
    let mut scores = DichotomyScores::new();
    for (statement, &answer) in STATEMENTS.iter().zip(answers) {
        scores.apply(statement.pole, answer);
    }
    Ok(scores.code())
}

/// A four-letter personality type such as `INFJ`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PersonalityCode([Pole; 4]);

impl PersonalityCode {
    /// Every valid code, in the order the settings list shows them.
    pub fn all() -> Vec<PersonalityCode> {
        [
            "ISTJ", "ISFJ", "INFJ", "INTJ", "ISTP", "ISFP", "INFP", "INTP", "ESTP", "ESFP",
            "ENFP", "ENTP", "ESTJ", "ESFJ", "ENFJ", "ENTJ",
        ]
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect()
    }

    pub fn poles(&self) -> [Pole; 4] {
        self.0
    }

    pub fn description(&self) -> &'static str {
        match self.to_string().as_str() {
            "ISTJ" => "Practical, factual, and responsible. Loyal and organized.",
            "ISFJ" => "Warm, conscientious, and dedicated. Supportive and reliable.",
            "INFJ" => "Insightful, empathetic, and visionary. Idealistic and compassionate.",
            "INTJ" => "Strategic, independent, and logical. Masterminds.",
            "ISTP" => "Observant, analytical, and adaptable. Action-oriented problem-solvers.",
            "ISFP" => "Artistic, gentle, and spontaneous. Appreciative of beauty.",
            "INFP" => "Creative, idealistic, and values-driven. Seek harmony and meaning.",
            "INTP" => "Analytical, innovative, and curious. Logical and independent thinkers.",
            "ESTP" => "Energetic, realistic, and spontaneous. Live in the moment.",
            "ESFP" => "Outgoing, friendly, and enthusiastic. Enjoy life and people.",
            "ENFP" => "Creative, enthusiastic, and charismatic. Inspire others.",
            "ENTP" => "Inventive, stimulating, and quick-witted. Enjoy intellectual challenges.",
            "ESTJ" => "Organized, decisive, and traditional. Efficient and dependable.",
            "ESFJ" => "Caring, social, and cooperative. Value harmony and connection.",
            "ENFJ" => "Charismatic, inspiring, and empathetic. Natural leaders.",
            "ENTJ" => "Decisive, strategic, and assertive. Visionary leaders.",
            _ => "A unique and valuable personality!",
        }
    }
}

impl fmt::Display for PersonalityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for pole in self.0 {
            write!(f, "{}", pole.letter())?;
        }
        Ok(())
    }
}

impl FromStr for PersonalityCode {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        let letters: Vec<char> = upper.chars().collect();
        if letters.len() != 4 {
            return Err(QuizError::InvalidCode(s.to_string()));
        }
        let mut poles = [Pole::E; 4];
        for (slot, (letter, dichotomy)) in letters.iter().zip(Dichotomy::ALL).enumerate() {
            let (first, second) = dichotomy.poles();
            poles[slot] = if *letter == first.letter() {
                first
            } else if *letter == second.letter() {
                second
            } else {
                return Err(QuizError::InvalidCode(s.to_string()));
            };
        }
        Ok(PersonalityCode(poles))
    }
}

impl Serialize for PersonalityCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PersonalityCode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// What happened after answering a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizStep {
    /// Move on to the statement at `index`.
    Next { index: usize },
    Complete(PersonalityCode),
}

/// An in-progress questionnaire for one subject.
///
/// Answers are kept until the pass completes so that stepping back can
/// undo the previous contribution.
#[derive(Debug, Clone)]
pub struct Quiz {
    subject: Subject,
    answers: Vec<Likert>,
    scores: DichotomyScores,
    result: Option<PersonalityCode>,
}

impl Quiz {
    pub fn new(subject: Subject) -> Self {
        Self {
            subject,
            answers: Vec::with_capacity(STATEMENTS.len()),
            scores: DichotomyScores::new(),
            result: None,
        }
    }

    pub fn subject(&self) -> Subject {
        self.subject
    }

    /// Zero-based index of the statement being asked.
    pub fn current_index(&self) -> usize {
        self.answers.len().min(STATEMENTS.len() - 1)
    }

    pub fn current_statement(&self) -> &'static Statement {
        &STATEMENTS[self.current_index()]
    }

    pub fn total(&self) -> usize {
        STATEMENTS.len()
    }

    /// Progress through the questionnaire, counting the current statement.
    pub fn progress_percent(&self) -> f64 {
        (self.current_index() + 1) as f64 / STATEMENTS.len() as f64 * 100.0
    }

    pub fn scores(&self) -> &DichotomyScores {
        &self.scores
    }

    pub fn result(&self) -> Option<PersonalityCode> {
        self.result
    }

    pub fn is_finished(&self) -> bool {
        self.result.is_some()
    }

    pub fn answer(&mut self, score: Likert) -> Result<QuizStep, QuizError> {
        if self.is_finished() {
            return Err(QuizError::AlreadyFinished);
        }
        let statement = &STATEMENTS[self.answers.len()];
        self.scores.apply(statement.pole, score);
        self.answers.push(score);

        if self.answers.len() == STATEMENTS.len() {
            let code = self.scores.code();
            tracing::debug!(subject = %self.subject, %code, "quiz complete");
            self.result = Some(code);
            Ok(QuizStep::Complete(code))
        } else {
            Ok(QuizStep::Next {
                index: self.answers.len(),
            })
        }
    }

    /// Step back one statement, undoing its answer.
    ///
    /// Returns `false` when already at the first statement or when the quiz
    /// is finished (use [`retake`](Self::retake) then).
    pub fn go_back(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }
        let Some(previous) = self.answers.pop() else {
            return false;
        };
        let statement = &STATEMENTS[self.answers.len()];
        self.scores.revert(statement.pole, previous);
        true
    }

    /// Reset to the first statement with zeroed accumulators.
    pub fn retake(&mut self) {
        self.answers.clear();
        self.scores = DichotomyScores::new();
        self.result = None;
    }
}
