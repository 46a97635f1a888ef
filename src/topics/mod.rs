// Topic summary — batch keywords and co-occurring talking points.

pub mod keywords;

pub use keywords::{Keyword, KeywordSummarizer, KeywordSummary, KeywordTheme};
