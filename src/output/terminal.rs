// Colored terminal output for analysis runs.
//
// This module handles all terminal-specific formatting: colors, tables,
// alignment. The main.rs subcommands delegate here.

use colored::Colorize;

use super::summary::BatchSummary;
use super::truncate_chars;
use crate::features::extractor::CORE_FEATURES;
use crate::pipeline::{AnalysisRun, FeatureTable};
use crate::scoring::Classification;
use crate::topics::KeywordSummary;

/// Display the batch summary block.
pub fn display_summary(summary: &BatchSummary) {
    println!("\n{}", "=== Batch Summary ===".bold());
    println!(
        "  Comments: {} total, {} analyzed, {} skipped",
        summary.total, summary.analyzed, summary.skipped
    );
    println!(
        "  Unique texts: {}  |  Near-duplicates: {}",
        summary.unique_texts, summary.duplicates
    );
    println!(
        "  Average length: {:.1} chars  |  Very short (<10): {}  |  Long (>100): {}",
        summary.average_length, summary.short_comments, summary.long_comments
    );
    println!();

    if summary.high > 0 {
        println!(
            "  {} {} high suspicion comments",
            "!!".red().bold(),
            summary.high
        );
    }
    if summary.medium > 0 {
        println!(
            "  {} {} medium suspicion comments",
            "!".yellow(),
            summary.medium
        );
    }
    println!("  {} {} normal comments", "-".green(), summary.normal);

    for degraded in &summary.degraded_detectors {
        println!("  {} {}", "degraded".dimmed(), degraded.dimmed());
    }
}

/// Display the suspicious comments, highest score first, up to `limit`.
pub fn display_suspicious(run: &AnalysisRun, limit: usize) {
    let mut suspicious: Vec<_> = run
        .records
        .iter()
        .filter(|r| r.bot_classification.is_suspicious())
        .collect();

    if suspicious.is_empty() {
        println!("\nNo suspicious comments in this batch.");
        return;
    }

    // Stable sort keeps input order within a score
    suspicious.sort_by(|a, b| b.bot_score.cmp(&a.bot_score));

    println!(
        "\n{}",
        format!("=== Suspicious Comments ({}) ===", suspicious.len()).bold()
    );
    println!();
    println!(
        "  {:<18} {:<9} {:<18} {:>5}  {:<3} {:<3}  {}",
        "Class".dimmed(),
        "Platform".dimmed(),
        "Author".dimmed(),
        "Sim".dimmed(),
        "IF".dimmed(),
        "DB".dimmed(),
        "Text".dimmed(),
    );
    println!("  {}", "-".repeat(100).dimmed());

    for record in suspicious.iter().take(limit) {
        println!(
            "  {:<18} {:<9} {:<18} {:>5.2}  {:<3} {:<3}  {}",
            colorize_classification(record.bot_classification),
            record.comment.platform.as_str(),
            truncate_chars(&record.comment.author_id, 15),
            record.max_similarity,
            mark(record.verdict.flagged_by_isolation),
            mark(record.verdict.flagged_by_clustering),
            truncate_chars(&record.comment.text.replace('\n', " "), 50),
        );
    }

    if suspicious.len() > limit {
        println!(
            "  {}",
            format!("... and {} more (use --output for the full list)", suspicious.len() - limit)
                .dimmed()
        );
    }
}

/// Display the batch keywords and co-occurring themes.
pub fn display_keywords(summary: &KeywordSummary) {
    println!(
        "\n{}",
        format!("=== Batch Keywords ({} comments) ===", summary.comment_count).bold()
    );

    for theme in &summary.themes {
        println!(
            "  {:<40} {:>5.1}%",
            theme.label.bold(),
            theme.weight * 100.0
        );
        println!("    {}", theme.keywords.join(", ").dimmed());
    }

    println!();
    for keyword in &summary.keywords {
        println!(
            "  {:<24} {:>7.3}  in {} comments",
            keyword.term, keyword.score, keyword.comment_count
        );
    }
}

/// Display raw feature vectors as a table.
pub fn display_features(table: &FeatureTable) {
    print!("  {:<16}", "comment_id".dimmed());
    for column in &table.columns {
        print!(" {:>8}", truncate_chars(column, 8).dimmed());
    }
    println!();

    let include_engagement = table.columns.len() > CORE_FEATURES.len();
    for row in &table.rows {
        print!("  {:<16}", truncate_chars(&row.comment_id, 13));
        for value in row.features.to_row(include_engagement) {
            print!(" {:>8.2}", value);
        }
        println!();
    }

    for skip in &table.skipped {
        println!(
            "  {} record {} ({}): {}",
            "skipped".yellow(),
            skip.index,
            skip.comment_id,
            skip.reason
        );
    }
}

fn mark(flag: bool) -> colored::ColoredString {
    if flag {
        "x".red()
    } else {
        ".".dimmed()
    }
}

fn colorize_classification(classification: Classification) -> colored::ColoredString {
    let label = classification.as_str();
    match classification {
        Classification::HighSuspicion => label.red().bold(),
        Classification::MediumSuspicion => label.yellow(),
        Classification::Normal => label.green(),
    }
}
