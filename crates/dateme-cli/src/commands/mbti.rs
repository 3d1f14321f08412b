//! The `dateme mbti` command.

use std::path::PathBuf;

use anyhow::Result;
use uuid::Uuid;

use dateme_core::error::user_notice;
use dateme_core::mbti::PersonalityCode;
use dateme_core::model::Subject;

pub async fn execute(
    config_path: Option<PathBuf>,
    conversation: Uuid,
    subject: Subject,
    code: Option<PersonalityCode>,
) -> Result<()> {
    let config = super::load(config_path.as_deref())?;
    let mut session = super::open_conversation(&config, conversation).await?;

    if let Err(e) = session.set_mbti(subject, code).await {
        eprintln!("{}", user_notice(&e));
        return Err(e);
    }

    match code {
        Some(code) => println!("{subject} MBTI type set to {code}: {}", code.description()),
        None => println!("{subject} MBTI type cleared"),
    }
    Ok(())
}
