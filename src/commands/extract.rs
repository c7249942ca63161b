use anyhow::{Context, Result};
use std::path::PathBuf;

use lyricseek::models::PayloadKind;
use lyricseek::parser::LyricsExtractor;

/// Run the extractor on a local markup (or `--plain` mirror text) file
pub async fn extract(file: PathBuf, plain: bool) -> Result<()> {
    let content = tokio::fs::read_to_string(&file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let kind = if plain {
        PayloadKind::MirrorText
    } else {
        PayloadKind::Markup
    };

    let extraction = LyricsExtractor::new().extract(&content, kind);

    match extraction.locator {
        Some(tier) => eprintln!(
            "Located by {} (confidence {:.1})",
            tier.as_str(),
            tier.confidence()
        ),
        None if extraction.text.is_sentinel() => eprintln!("Nothing extracted"),
        None => eprintln!("Plain text extraction"),
    }

    println!("{}", extraction.text);
    Ok(())
}
