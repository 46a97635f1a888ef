// Batch keyword summary — what the comment section is talking about.
//
// Uses the `keyword_extraction` crate over the batch, one comment per
// document, so words every commenter uses get downweighted and words a
// subset keeps repeating get boosted. A coordinated campaign tends to show
// up here as a tight group of talking points that co-occur far more than
// organic replies would.
//
// Stop words cover English and Spanish, the two languages the scraped
// comment sections are mostly written in.

use std::collections::HashSet;

use anyhow::Result;
use keyword_extraction::tf_idf::{TfIdf, TfIdfParams};
use serde::{Deserialize, Serialize};
use stop_words::{get, LANGUAGE};
use tracing::info;

/// A ranked keyword and how many comments mention it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub term: String,
    pub score: f64,
    pub comment_count: usize,
}

/// Keywords that tend to appear in the same comments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordTheme {
    pub label: String,
    pub keywords: Vec<String>,
    /// Share of the total keyword score, normalized across themes.
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordSummary {
    pub keywords: Vec<Keyword>,
    pub themes: Vec<KeywordTheme>,
    pub comment_count: usize,
}

pub struct KeywordSummarizer {
    pub top_n_keywords: usize,
    pub max_themes: usize,
}

impl Default for KeywordSummarizer {
    fn default() -> Self {
        Self {
            top_n_keywords: 20,
            max_themes: 5,
        }
    }
}

impl KeywordSummarizer {
    pub fn summarize(&self, texts: &[String]) -> Result<KeywordSummary> {
        if texts.is_empty() {
            anyhow::bail!("No comments to summarize");
        }

        let mut stop_words: Vec<String> = get(LANGUAGE::English);
        stop_words.extend(get(LANGUAGE::Spanish));

        let params = TfIdfParams::UnprocessedDocuments(texts, &stop_words, None);
        let tfidf = TfIdf::new(params);
        let ranked: Vec<(String, f32)> = tfidf.get_ranked_word_scores(self.top_n_keywords);

        if ranked.is_empty() {
            anyhow::bail!(
                "TF-IDF produced no keywords from {} comments (too short or all stop words)",
                texts.len()
            );
        }

        let words: Vec<HashSet<String>> = texts.iter().map(|t| word_set(t)).collect();
        let mentions: Vec<Vec<usize>> = ranked
            .iter()
            .map(|(term, _)| {
                words
                    .iter()
                    .enumerate()
                    .filter(|(_, set)| set.contains(term.as_str()))
                    .map(|(i, _)| i)
                    .collect()
            })
            .collect();

        let keywords: Vec<Keyword> = ranked
            .iter()
            .zip(&mentions)
            .map(|((term, score), docs)| Keyword {
                term: term.clone(),
                score: *score as f64,
                comment_count: docs.len(),
            })
            .collect();

        info!(
            keywords = keywords.len(),
            top_keyword = %keywords[0].term,
            "Extracted batch keywords"
        );

        Ok(KeywordSummary {
            themes: group_themes(&keywords, &mentions, words.len(), self.max_themes),
            keywords,
            comment_count: texts.len(),
        })
    }
}

/// Lowercased whole words of a comment, so "mayor" doesn't match "mayoral".
fn word_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Greedy co-occurrence grouping: seed a theme with the best unassigned
/// keyword and pull in up to five keywords that share comments with it.
fn group_themes(
    keywords: &[Keyword],
    mentions: &[Vec<usize>],
    comment_count: usize,
    max_themes: usize,
) -> Vec<KeywordTheme> {
    let n = keywords.len();

    let mut by_comment: Vec<Vec<usize>> = vec![Vec::new(); comment_count];
    for (k, docs) in mentions.iter().enumerate() {
        for &doc in docs {
            by_comment[doc].push(k);
        }
    }

    let mut cooccurrence = vec![vec![0u32; n]; n];
    for present in &by_comment {
        for &i in present {
            for &j in present {
                if i != j {
                    cooccurrence[i][j] += 1;
                }
            }
        }
    }

    let total_score: f64 = keywords.iter().map(|k| k.score).sum();
    let mut assigned = vec![false; n];
    let mut themes = Vec::new();

    for seed in 0..n {
        if themes.len() >= max_themes {
            break;
        }
        if assigned[seed] {
            continue;
        }
        assigned[seed] = true;

        let mut candidates: Vec<(usize, u32)> = (0..n)
            .filter(|&i| !assigned[i] && cooccurrence[seed][i] > 0)
            .map(|i| (i, cooccurrence[seed][i]))
            .collect();
        candidates.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let mut members = vec![seed];
        for (idx, _) in candidates.into_iter().take(5) {
            assigned[idx] = true;
            members.push(idx);
        }

        let theme_score: f64 = members.iter().map(|&i| keywords[i].score).sum();
        let terms: Vec<String> = members.iter().map(|&i| keywords[i].term.clone()).collect();

        themes.push(KeywordTheme {
            label: terms.iter().take(3).cloned().collect::<Vec<_>>().join(" / "),
            keywords: terms,
            weight: if total_score > 0.0 {
                theme_score / total_score
            } else {
                0.0
            },
        });
    }

    let weight_sum: f64 = themes.iter().map(|t| t.weight).sum();
    if weight_sum > 0.0 {
        for theme in &mut themes {
            theme.weight /= weight_sum;
        }
    }
    themes.sort_by(|a, b| b.weight.total_cmp(&a.weight));

    themes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts() -> Vec<String> {
        [
            "Vote Garcia for mayor the only honest candidate",
            "Garcia for mayor and honest leadership at last",
            "Honest Garcia is the mayor we need",
            "Great song, the chorus is stuck in my head",
            "Me encanta esta canción, el coro es increíble",
            "Who else is watching this at midnight",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    #[test]
    fn test_summary_finds_repeated_talking_point() {
        let summarizer = KeywordSummarizer {
            top_n_keywords: 100,
            max_themes: 5,
        };
        let summary = summarizer.summarize(&texts()).unwrap();
        assert_eq!(summary.comment_count, 6);
        let garcia = summary.keywords.iter().find(|k| k.term == "garcia");
        assert!(garcia.is_some(), "keywords: {:?}", summary.keywords);
        assert_eq!(garcia.unwrap().comment_count, 3);
    }

    #[test]
    fn test_stop_words_excluded() {
        let summary = KeywordSummarizer::default().summarize(&texts()).unwrap();
        for stop in ["the", "is", "el", "es"] {
            assert!(summary.keywords.iter().all(|k| k.term != stop), "{stop} was kept");
        }
    }

    #[test]
    fn test_theme_weights_sum_to_one() {
        let summary = KeywordSummarizer::default().summarize(&texts()).unwrap();
        assert!(!summary.themes.is_empty());
        assert!(summary.themes.len() <= 5);
        let sum: f64 = summary.themes.iter().map(|t| t.weight).sum();
        assert!((sum - 1.0).abs() < 0.01, "weights sum to {sum}");
    }

    #[test]
    fn test_comment_count_matches_whole_words() {
        let texts: Vec<String> = [
            "my garden looks lovely",
            "gardening tips please",
            "gardening on weekends",
            "new garden bench",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let summarizer = KeywordSummarizer {
            top_n_keywords: 100,
            max_themes: 5,
        };
        let summary = summarizer.summarize(&texts).unwrap();
        let garden = summary.keywords.iter().find(|k| k.term == "garden");
        assert!(garden.is_some(), "keywords: {:?}", summary.keywords);
        assert_eq!(garden.unwrap().comment_count, 2);
    }

    #[test]
    fn test_word_set_splits_on_punctuation() {
        let words = word_set("Garcia, for MAYOR!!");
        assert!(words.contains("garcia"));
        assert!(words.contains("mayor"));
        assert!(!words.contains("garcia,"));
    }

    #[test]
    fn test_empty_batch_fails() {
        assert!(KeywordSummarizer::default().summarize(&[]).is_err());
    }
}
