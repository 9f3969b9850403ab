//! TF-IDF vectorization and cosine similarity over short event texts.
//!
//! Shared primitive behind both near-duplicate title detection and category
//! assignment. The two call sites use different vectorizer configurations
//! (bigrams vs. stop-word-filtered unigrams); both are kept distinct here
//! because the tuned thresholds depend on them.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());

/// Common English function words excluded by the categorization vectorizer.
const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "cannot", "could", "did", "do", "does", "doing", "down", "during", "each",
    "few", "for", "from", "further", "had", "has", "have", "having", "he", "her", "here",
    "hers", "herself", "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it",
    "its", "itself", "me", "more", "most", "my", "myself", "no", "nor", "not", "of", "off",
    "on", "once", "only", "or", "other", "ought", "our", "ours", "ourselves", "out", "over",
    "own", "same", "she", "should", "so", "some", "such", "than", "that", "the", "their",
    "theirs", "them", "themselves", "then", "there", "these", "they", "this", "those",
    "through", "to", "too", "under", "until", "up", "us", "very", "was", "we", "were", "what",
    "when", "where", "which", "while", "who", "whom", "why", "will", "with", "would", "you",
    "your", "yours", "yourself", "yourselves",
];

/// Lowercase, strip all non-word/non-space characters, collapse whitespace.
pub fn preprocess(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = NON_WORD.replace_all(&lowered, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// How text is turned into terms before TF-IDF weighting.
#[derive(Debug, Clone)]
pub struct VectorizerConfig {
    max_ngram: usize,
    stop_words: &'static [&'static str],
}

impl VectorizerConfig {
    /// Unigrams and bigrams, no stop words. Used for title deduplication,
    /// where word order carries most of the signal.
    pub fn title_dedup() -> Self {
        Self {
            max_ngram: 2,
            stop_words: &[],
        }
    }

    /// Unigrams with English stop words removed. Used for comparing event
    /// text against category prototypes.
    pub fn categorization() -> Self {
        Self {
            max_ngram: 1,
            stop_words: ENGLISH_STOP_WORDS,
        }
    }
}

/// Cosine similarity of `query` against each document in `corpus`, in 0..1.
///
/// The vectorizer is fitted over the corpus plus the query. Degenerate
/// inputs (empty query, corpus that yields no terms) produce an all-zero
/// score vector rather than an error.
pub fn similarity(query: &str, corpus: &[String], config: &VectorizerConfig) -> Vec<f64> {
    let query_terms = tokenize(&preprocess(query), config);
    let corpus_terms: Vec<Vec<String>> = corpus
        .iter()
        .map(|doc| tokenize(&preprocess(doc), config))
        .collect();

    if query_terms.is_empty() || corpus_terms.iter().all(|terms| terms.is_empty()) {
        return vec![0.0; corpus.len()];
    }

    // Smoothed document frequencies over the fitted set.
    let n_docs = corpus_terms.len() + 1;
    let mut df: HashMap<&str, usize> = HashMap::new();
    for doc in corpus_terms.iter().chain(std::iter::once(&query_terms)) {
        let unique: HashSet<&str> = doc.iter().map(String::as_str).collect();
        for term in unique {
            *df.entry(term).or_insert(0) += 1;
        }
    }

    let query_vector = weigh(&query_terms, &df, n_docs);
    corpus_terms
        .iter()
        .map(|terms| dot(&query_vector, &weigh(terms, &df, n_docs)))
        .collect()
}

/// Split preprocessed text into terms. Only runs of two or more word
/// characters count as tokens; stop words are dropped before bigrams form.
fn tokenize(text: &str, config: &VectorizerConfig) -> Vec<String> {
    let unigrams: Vec<&str> = text
        .split_whitespace()
        .filter(|token| token.chars().count() >= 2)
        .filter(|token| !config.stop_words.contains(token))
        .collect();

    let mut terms: Vec<String> = unigrams.iter().map(|t| t.to_string()).collect();
    if config.max_ngram >= 2 {
        for pair in unigrams.windows(2) {
            terms.push(format!("{} {}", pair[0], pair[1]));
        }
    }
    terms
}

/// L2-normalized tf-idf weights for one document.
fn weigh<'a>(
    terms: &'a [String],
    df: &HashMap<&str, usize>,
    n_docs: usize,
) -> HashMap<&'a str, f64> {
    let mut weights: HashMap<&str, f64> = HashMap::new();
    for term in terms {
        *weights.entry(term.as_str()).or_insert(0.0) += 1.0;
    }
    for (term, weight) in weights.iter_mut() {
        let doc_freq = df.get(*term).copied().unwrap_or(0) as f64;
        let idf = ((1.0 + n_docs as f64) / (1.0 + doc_freq)).ln() + 1.0;
        *weight *= idf;
    }
    let norm = weights.values().map(|w| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        for weight in weights.values_mut() {
            *weight /= norm;
        }
    }
    weights
}

fn dot(a: &HashMap<&str, f64>, b: &HashMap<&str, f64>) -> f64 {
    a.iter()
        .filter_map(|(term, wa)| b.get(term).map(|wb| wa * wb))
        .sum()
}
