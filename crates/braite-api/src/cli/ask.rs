//! One-shot question from the terminal.

use anyhow::Result;
use console::style;

use braite_types::chat::ChatQuery;
use braite_types::config::AppConfig;

use crate::state::build_pipeline;

/// Run one pipeline turn and print the answer with its sources.
pub async fn ask(config: &AppConfig, query: String, session: String, json: bool) -> Result<()> {
    let query = ChatQuery::new(query, session)?;
    let pipeline = build_pipeline(config).await?;
    let answer = pipeline.generate(&query).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&answer)?);
        return Ok(());
    }

    println!();
    println!("  {}", answer.answer);
    if !answer.sources.is_empty() {
        println!();
        println!("  {}", style("Sumber Referensi:").bold());
        for source in &answer.sources {
            println!("  {} {}", style("•").dim(), style(source).cyan());
        }
    }
    println!();
    Ok(())
}
