//! The `dateme quiz` command.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use uuid::Uuid;

use dateme_core::error::{user_notice, QuizError};
use dateme_core::mbti::{Likert, PersonalityCode, Quiz, QuizStep, STATEMENTS};
use dateme_core::model::Subject;

pub async fn execute(
    config_path: Option<PathBuf>,
    subject: Subject,
    conversation: Option<Uuid>,
    answers: Option<String>,
) -> Result<()> {
    let code = match answers {
        Some(csv) => Some(score_csv(subject, &csv)?),
        None => {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            run_interactive(subject, stdin.lock(), stdout.lock())?
        }
    };

    let Some(code) = code else {
        println!("Quiz cancelled.");
        return Ok(());
    };

    println!("{}", format_result(subject, code));

    if let Some(id) = conversation {
        let config = super::load(config_path.as_deref())?;
        let mut session = super::open_conversation(&config, id).await?;
        if let Err(e) = session.apply_quiz_result(subject, code).await {
            eprintln!("{}", user_notice(&e));
            return Err(e);
        }
        println!("Saved to conversation {id}.");
    }
    Ok(())
}

/// Score a full pass given as comma-separated Likert values.
pub(crate) fn score_csv(subject: Subject, csv: &str) -> Result<PersonalityCode> {
    let scores = csv
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.parse::<Likert>())
        .collect::<Result<Vec<_>, _>>()?;

    if scores.len() != STATEMENTS.len() {
        return Err(QuizError::Incomplete {
            answered: scores.len(),
            expected: STATEMENTS.len(),
        }
        .into());
    }

    let mut quiz = Quiz::new(subject);
    for score in scores {
        if let QuizStep::Complete(code) = quiz.answer(score)? {
            return Ok(code);
        }
    }
    Err(QuizError::Incomplete {
        answered: STATEMENTS.len(),
        expected: STATEMENTS.len(),
    }
    .into())
}

/// Ask each statement on `output` and read answers from `input`.
///
/// Returns `None` when the user quits or input runs out before a result is
/// accepted.
pub(crate) fn run_interactive<R: BufRead, W: Write>(
    subject: Subject,
    mut input: R,
    mut output: W,
) -> Result<Option<PersonalityCode>> {
    let mut quiz = Quiz::new(subject);
    let whom = match subject {
        Subject::User => "yourself",
        Subject::Partner => "your partner",
    };
    writeln!(
        output,
        "Answer each statement about {whom}: 1 = Strongly Disagree ... 5 = Strongly Agree."
    )?;
    writeln!(output, "Type b to go back, q to quit.")?;

    loop {
        if let Some(code) = quiz.result() {
            writeln!(output, "{}", format_result(subject, code))?;
            write!(output, "Press Enter to accept or r to retake: ")?;
            output.flush()?;
            let Some(line) = read_line(&mut input)? else {
                return Ok(Some(code));
            };
            match line.as_str() {
                "r" | "R" => {
                    quiz.retake();
                    continue;
                }
                "q" | "Q" => return Ok(None),
                _ => return Ok(Some(code)),
            }
        }

        let statement = quiz.current_statement();
        write!(
            output,
            "[{}/{} {:.0}%] {} ",
            quiz.current_index() + 1,
            quiz.total(),
            quiz.progress_percent(),
            statement.text
        )?;
        output.flush()?;

        let Some(line) = read_line(&mut input)? else {
            return Ok(None);
        };
        match line.as_str() {
            "q" | "Q" => return Ok(None),
            "b" | "B" => {
                if !quiz.go_back() {
                    writeln!(output, "Already at the first statement.")?;
                }
            }
            other => match other.parse::<Likert>() {
                Ok(score) => {
                    quiz.answer(score)?;
                }
                Err(_) => writeln!(output, "Please answer 1-5, b or q.")?,
            },
        }
    }
}

fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn format_result(subject: Subject, code: PersonalityCode) -> String {
    let owner = match subject {
        Subject::User => "Your",
        Subject::Partner => "Your partner's",
    };
    format!("{owner} personality type: {code}\n{}", code.description())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csv(score: u8) -> String {
        vec![score.to_string(); 20].join(",")
    }

    #[test]
    fn csv_scores_full_pass() {
        assert_eq!(score_csv(Subject::User, &csv(1)).unwrap().to_string(), "INFP");
        assert_eq!(score_csv(Subject::User, &csv(3)).unwrap().to_string(), "ESTJ");
    }

    #[test]
    fn csv_rejects_short_and_invalid() {
        let err = score_csv(Subject::User, "1,2,3").unwrap_err();
        assert_eq!(
            err.downcast_ref::<QuizError>(),
            Some(&QuizError::Incomplete {
                answered: 3,
                expected: 20
            })
        );

        let mut bad = vec!["3"; 19];
        bad.push("6");
        let err = score_csv(Subject::User, &bad.join(",")).unwrap_err();
        assert_eq!(
            err.downcast_ref::<QuizError>(),
            Some(&QuizError::InvalidScore(6))
        );
    }

    #[test]
    fn interactive_with_back_and_accept() {
        // First answer is undone with `b`, junk input is re-asked.
        let mut script = String::from("5\nb\nmaybe\n");
        script.push_str(&"1\n".repeat(20));
        script.push('\n');

        let mut out = Vec::new();
        let code = run_interactive(Subject::Partner, script.as_bytes(), &mut out).unwrap();
        assert_eq!(code.unwrap().to_string(), "INFP");

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("your partner"));
        assert!(out.contains("Please answer 1-5"));
        assert!(out.contains("Your partner's personality type: INFP"));
    }

    #[test]
    fn interactive_retake_then_accept() {
        let mut script = "1\n".repeat(20);
        script.push_str("r\n");
        script.push_str(&"3\n".repeat(20));
        script.push('\n');

        let code = run_interactive(Subject::User, script.as_bytes(), Vec::new()).unwrap();
        assert_eq!(code.unwrap().to_string(), "ESTJ");
    }

    #[test]
    fn interactive_quit_returns_none() {
        let code = run_interactive(Subject::User, "4\n2\nq\n".as_bytes(), Vec::new()).unwrap();
        assert!(code.is_none());

        let code = run_interactive(Subject::User, "".as_bytes(), Vec::new()).unwrap();
        assert!(code.is_none());
    }
}
