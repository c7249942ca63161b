use anyhow::{Context, Result};

use lyricseek::config::Config;
use lyricseek::error::LyricseekErrorTrait;
use lyricseek::metrics;
use lyricseek::models::ResultRecord;
use lyricseek::pipeline::LyricsPipeline;

pub async fn search(config: &Config, query: String, json: bool, show_metrics: bool) -> Result<()> {
    if let Err(e) = metrics::init_metrics() {
        tracing::warn!(error = %e, "Metrics initialization failed");
    }

    let pipeline = LyricsPipeline::from_config(config).context("Failed to set up pipeline")?;

    let outcome = pipeline.resolve(&query).await;
    if show_metrics {
        if let Some(text) = metrics::report() {
            eprintln!("{text}");
        }
    }

    let records = match outcome {
        Ok(records) => records,
        Err(e) if e.is_empty_result() => {
            if json {
                println!("[]");
            } else {
                println!("No matching songs found for \"{query}\".");
            }
            return Ok(());
        }
        Err(e) => {
            let desc = e.localized_desc();
            return Err(anyhow::Error::new(e).context(desc));
        }
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&records).context("Failed to serialize results")?
        );
        return Ok(());
    }

    println!("Results for \"{query}\"");
    println!("================================");
    for record in &records {
        print_record(record);
    }

    let found = records.iter().filter(|r| r.has_lyrics()).count();
    println!("{found}/{} songs with lyrics", records.len());

    Ok(())
}

fn print_record(record: &ResultRecord) {
    println!("\n{}. {} by {}", record.rank, record.title, record.artist);
    if let Some(id) = &record.video_id {
        println!("   Video: https://www.youtube.com/watch?v={id}");
    }
    println!();
    for line in record.lyrics_text.lines() {
        println!("   {line}");
    }
    println!();
}
