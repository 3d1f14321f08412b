//! The `dateme prompt` command.

use anyhow::Result;

use dateme_core::prompt::{build_system_prompt, Profile};

pub fn execute(mood: String, profile: Profile) -> Result<()> {
    println!("{}", build_system_prompt(&mood, Some(&profile)));
    Ok(())
}
