//! The `dateme init` command.

use anyhow::Result;

use dateme_core::config::SAMPLE_CONFIG;

pub fn execute() -> Result<()> {
    if std::path::Path::new("dateme.toml").exists() {
        println!("dateme.toml already exists, skipping.");
        return Ok(());
    }
    std::fs::write("dateme.toml", SAMPLE_CONFIG)?;
    println!("Created dateme.toml");

    println!("\nNext steps:");
    println!("  1. Export OPENAI_API_KEY, SUPABASE_ANON_KEY and SUPABASE_ACCESS_TOKEN");
    println!("  2. Set supabase.url in dateme.toml");
    println!("  3. Run: dateme quiz");
    println!("  4. Run: dateme chat");

    Ok(())
}
