// TF-IDF vectorization of a comment batch.
//
// Each comment is one document. Terms that appear across the whole batch get
// downweighted; terms distinctive to a few comments get boosted. Copy-pasted
// campaign text shares its distinctive terms, so it ends up with near-1.0
// cosine similarity even when the copies differ in punctuation or casing.
//
// Vectors are stored sparse and sorted by term id, and the vocabulary is
// sorted alphabetically. Nothing depends on hash map iteration order, which
// keeps the floating point results bit-for-bit reproducible.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex_lite::Regex;

fn url_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:https?://|www\.)\S+").expect("valid URL pattern"))
}

fn mention_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@[A-Za-z0-9_.]+").expect("valid mention pattern"))
}

/// Lowercase and strip URLs and @mentions.
///
/// Campaign copies often differ only in the account they tag or a tracking
/// link, neither of which says anything about the text itself.
pub fn normalize(text: &str) -> String {
    let lower = text.to_lowercase();
    let no_urls = url_pattern().replace_all(&lower, " ");
    mention_pattern().replace_all(&no_urls, " ").into_owned()
}

/// Split normalized text into word tokens: maximal runs of alphanumeric
/// characters (Unicode-aware), at least two characters long.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_string)
        .collect()
}

/// Word n-grams for n in 1..=ngram_max, joined with single spaces.
pub fn terms(tokens: &[String], ngram_max: usize) -> Vec<String> {
    let mut out = Vec::new();
    for n in 1..=ngram_max.max(1) {
        if tokens.len() < n {
            break;
        }
        for window in tokens.windows(n) {
            out.push(window.join(" "));
        }
    }
    out
}

/// An L2-normalized sparse vector, entries sorted by term id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    pub entries: Vec<(usize, f64)>,
}

impl SparseVector {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dot product by merging the two sorted entry lists. For normalized
    /// vectors this is the cosine similarity.
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (ti, wi) = self.entries[i];
            let (tj, wj) = other.entries[j];
            match ti.cmp(&tj) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += wi * wj;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

/// A fitted TF-IDF model over one batch.
#[derive(Debug, Clone)]
pub struct TfIdfModel {
    /// Terms in sorted order; a term's id is its position here.
    pub vocabulary: Vec<String>,
    /// Smoothed inverse document frequency per term id.
    pub idf: Vec<f64>,
    /// One vector per input document, in input order.
    pub vectors: Vec<SparseVector>,
}

/// Fit TF-IDF on `texts` and return the vectors for the same texts.
///
/// Weighting is raw term count times `ln((1 + N) / (1 + df)) + 1`, then L2
/// normalization. A document with no usable tokens gets an empty vector.
pub fn fit_transform(texts: &[&str], ngram_max: usize) -> TfIdfModel {
    let n_docs = texts.len();

    let doc_terms: Vec<BTreeMap<String, usize>> = texts
        .iter()
        .map(|text| {
            let tokens = tokenize(&normalize(text));
            let mut counts = BTreeMap::new();
            for term in terms(&tokens, ngram_max) {
                *counts.entry(term).or_insert(0) += 1;
            }
            counts
        })
        .collect();

    let mut document_frequency: BTreeMap<&str, usize> = BTreeMap::new();
    for counts in &doc_terms {
        for term in counts.keys() {
            *document_frequency.entry(term.as_str()).or_insert(0) += 1;
        }
    }

    let vocabulary: Vec<String> = document_frequency.keys().map(|t| t.to_string()).collect();
    let term_ids: BTreeMap<&str, usize> = vocabulary
        .iter()
        .enumerate()
        .map(|(id, t)| (t.as_str(), id))
        .collect();
    let idf: Vec<f64> = document_frequency
        .values()
        .map(|&df| ((1.0 + n_docs as f64) / (1.0 + df as f64)).ln() + 1.0)
        .collect();

    let vectors = doc_terms
        .iter()
        .map(|counts| {
            // BTreeMap iteration is alphabetical, which matches term id order.
            let mut entries: Vec<(usize, f64)> = counts
                .iter()
                .map(|(term, &tf)| {
                    let id = term_ids[term.as_str()];
                    (id, tf as f64 * idf[id])
                })
                .collect();
            let norm = entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
            if norm > 0.0 {
                for (_, w) in &mut entries {
                    *w /= norm;
                }
            }
            SparseVector { entries }
        })
        .collect();

    TfIdfModel {
        vocabulary,
        idf,
        vectors,
    }
}
