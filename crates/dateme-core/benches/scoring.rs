use criterion::{black_box, criterion_group, criterion_main, Criterion};

use dateme_core::mbti::{score_answers, Likert, Quiz, STATEMENTS};
use dateme_core::model::{Subject, UserPreferences};
use dateme_core::prompt::system_prompt_for;

fn mixed_answers() -> Vec<Likert> {
    (0..STATEMENTS.len())
        .map(|i| Likert::ALL[i % Likert::ALL.len()])
        .collect()
}

fn bench_score_answers(c: &mut Criterion) {
    let mut group = c.benchmark_group("score_answers");

    group.bench_function("neutral", |b| {
        let answers = vec![Likert::NEUTRAL; STATEMENTS.len()];
        b.iter(|| score_answers(black_box(&answers)))
    });

    group.bench_function("mixed", |b| {
        let answers = mixed_answers();
        b.iter(|| score_answers(black_box(&answers)))
    });

    group.finish();
}

fn bench_quiz_pass(c: &mut Criterion) {
    let answers = mixed_answers();
    c.bench_function("quiz_full_pass", |b| {
        b.iter(|| {
            let mut quiz = Quiz::new(Subject::User);
            for &answer in &answers {
                let _ = quiz.answer(black_box(answer));
            }
            quiz.result()
        })
    });
}

fn bench_prompt(c: &mut Criterion) {
    let prefs = UserPreferences {
        mbti_type: "INFJ".parse().ok(),
        partner_mbti_type: "ESTP".parse().ok(),
        ..Default::default()
    };
    c.bench_function("system_prompt_for", |b| {
        b.iter(|| system_prompt_for(black_box(&prefs)))
    });
}

criterion_group!(benches, bench_score_answers, bench_quiz_pass, bench_prompt);
criterion_main!(benches);
