//! Tokenization: text → ordered word counts.
//!
//! This is the single tokenization step of the pipeline. The layout stage
//! sizes words from the resulting [`WordCounts`] and the reporter reads raw
//! counts from the *same* value, so the words drawn and the words counted can
//! never disagree.
//!
//! ## Rule
//!
//! 1. Tokens match the Unicode regex `\w[\w']*`.
//! 2. A trailing `'s` is stripped (case-insensitive).
//! 3. Purely numeric tokens are dropped unless `include_numbers`.
//! 4. Tokens shorter than `min_word_length` characters are dropped.
//! 5. Stop words are dropped (compared lowercase).
//! 6. Case is folded: counts are summed per lowercase key and the word is
//!    displayed in its most common casing (first seen wins ties).
//! 7. With `normalize_plurals`, `xs` is merged into `x` when `x` also occurs
//!    and the key does not end in `ss`.
//!
//! The result is ordered by count descending, ties alphabetically.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

static RE_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w[\w']*").unwrap());

/// Common English words that carry no meaning in a word cloud.
pub const ENGLISH_STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "aren't", "as", "at", "be", "because", "been", "before", "being", "below", "between",
    "both", "but", "by", "can", "can't", "cannot", "com", "could", "couldn't", "did", "didn't",
    "do", "does", "doesn't", "doing", "don't", "down", "during", "each", "else", "ever", "few",
    "for", "from", "further", "get", "had", "hadn't", "has", "hasn't", "have", "haven't",
    "having", "he", "he'd", "he'll", "he's", "hence", "her", "here", "here's", "hers", "herself",
    "him", "himself", "his", "how", "how's", "however", "http", "i", "i'd", "i'll", "i'm", "i've",
    "if", "in", "into", "is", "isn't", "it", "it's", "its", "itself", "just", "k", "let's",
    "like", "me", "more", "most", "mustn't", "my", "myself", "no", "nor", "not", "of", "off",
    "on", "once", "only", "or", "other", "otherwise", "ought", "our", "ours", "ourselves", "out",
    "over", "own", "r", "same", "shall", "shan't", "she", "she'd", "she'll", "she's", "should",
    "shouldn't", "since", "so", "some", "such", "than", "that", "that's", "the", "their",
    "theirs", "them", "themselves", "then", "there", "there's", "therefore", "these", "they",
    "they'd", "they'll", "they're", "they've", "this", "those", "through", "to", "too", "under",
    "until", "up", "very", "was", "wasn't", "we", "we'd", "we'll", "we're", "we've", "were",
    "weren't", "what", "what's", "when", "when's", "where", "where's", "which", "while", "who",
    "who's", "whom", "why", "why's", "with", "won't", "would", "wouldn't", "www", "you", "you'd",
    "you'll", "you're", "you've", "your", "yours", "yourself", "yourselves",
];

/// Knobs for the tokenization rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizerOptions {
    /// Filter [`ENGLISH_STOPWORDS`]. Default: true.
    pub use_default_stopwords: bool,
    /// Additional stop words (any case).
    pub extra_stopwords: Vec<String>,
    /// Merge simple plurals into their singular. Default: true.
    pub normalize_plurals: bool,
    /// Keep purely numeric tokens. Default: false.
    pub include_numbers: bool,
    /// Minimum token length in characters. Default: 0.
    pub min_word_length: usize,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        Self {
            use_default_stopwords: true,
            extra_stopwords: Vec::new(),
            normalize_plurals: true,
            include_numbers: false,
            min_word_length: 0,
        }
    }
}

/// Ordered per-word raw counts produced by [`Tokenizer::process_text`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordCounts {
    entries: Vec<(String, u32)>,
    index: HashMap<String, usize>,
}

impl WordCounts {
    fn from_entries(mut entries: Vec<(String, u32)>) -> Self {
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, (w, _))| (w.clone(), i))
            .collect();
        Self { entries, index }
    }

    /// Raw count of `word` (display form), if it was counted.
    pub fn get(&self, word: &str) -> Option<u32> {
        self.index.get(word).map(|&i| self.entries[i].1)
    }

    /// Words in rank order (count descending, ties alphabetical).
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().map(|(w, c)| (w.as_str(), *c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, c)| *c as u64).sum()
    }

    /// The `max_words` top words with counts divided by the top count.
    ///
    /// The first entry is always `1.0`; an empty result means there is
    /// nothing to draw.
    pub fn normalized(&self, max_words: usize) -> Vec<(String, f64)> {
        let Some(&(_, top)) = self.entries.first() else {
            return Vec::new();
        };
        let top = top.max(1) as f64;
        self.entries
            .iter()
            .take(max_words)
            .map(|(w, c)| (w.clone(), *c as f64 / top))
            .collect()
    }
}

/// Applies the tokenization rule. Build once per run from the config.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    options: TokenizerOptions,
    stopwords: HashSet<String>,
}

impl Tokenizer {
    pub fn new(options: TokenizerOptions) -> Self {
        let mut stopwords: HashSet<String> = HashSet::new();
        if options.use_default_stopwords {
            stopwords.extend(ENGLISH_STOPWORDS.iter().map(|s| s.to_string()));
        }
        stopwords.extend(options.extra_stopwords.iter().map(|s| s.to_lowercase()));
        Self { options, stopwords }
    }

    /// Split `text` into tokens, filter them and count per word.
    pub fn process_text(&self, text: &str) -> WordCounts {
        let tokens: Vec<&str> = RE_WORD
            .find_iter(text)
            .map(|m| strip_possessive(m.as_str()))
            .filter(|w| !w.is_empty())
            .filter(|w| self.options.include_numbers || !w.chars().all(char::is_numeric))
            .filter(|w| w.chars().count() >= self.options.min_word_length)
            .filter(|w| !self.stopwords.contains(&w.to_lowercase()))
            .collect();

        let counts = fold_tokens(&tokens, self.options.normalize_plurals);
        debug!(
            "Tokenized {} tokens into {} distinct words",
            tokens.len(),
            counts.len()
        );
        counts
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(TokenizerOptions::default())
    }
}

fn strip_possessive(word: &str) -> &str {
    let n = word.len();
    if n >= 2 && word.is_char_boundary(n - 2) && word[n - 2..].eq_ignore_ascii_case("'s") {
        &word[..n - 2]
    } else {
        word
    }
}

/// Case variants seen for one lowercase key, in first-seen order.
struct CaseGroup {
    key: String,
    forms: Vec<(String, u32)>,
    merged: bool,
}

impl CaseGroup {
    fn add(&mut self, form: &str, count: u32) {
        match self.forms.iter_mut().find(|(f, _)| f == form) {
            Some((_, c)) => *c += count,
            None => self.forms.push((form.to_string(), count)),
        }
    }

    /// Most common casing; the earliest form wins a tie.
    fn display_form(&self) -> &str {
        let mut best = &self.forms[0];
        for form in &self.forms[1..] {
            if form.1 > best.1 {
                best = form;
            }
        }
        &best.0
    }
}

fn fold_tokens(tokens: &[&str], normalize_plurals: bool) -> WordCounts {
    let mut groups: Vec<CaseGroup> = Vec::new();
    let mut by_key: HashMap<String, usize> = HashMap::new();

    for token in tokens {
        let key = token.to_lowercase();
        let idx = *by_key.entry(key.clone()).or_insert_with(|| {
            groups.push(CaseGroup {
                key,
                forms: Vec::new(),
                merged: false,
            });
            groups.len() - 1
        });
        groups[idx].add(token, 1);
    }

    if normalize_plurals {
        for i in 0..groups.len() {
            let key = groups[i].key.clone();
            if !key.ends_with('s') || key.ends_with("ss") {
                continue;
            }
            let singular = &key[..key.len() - 1];
            let Some(&j) = by_key.get(singular) else {
                continue;
            };
            if groups[j].merged {
                continue;
            }
            let plural_forms = std::mem::take(&mut groups[i].forms);
            for (form, count) in plural_forms {
                let mut chars = form.chars();
                chars.next_back();
                groups[j].add(chars.as_str(), count);
            }
            groups[i].merged = true;
        }
    }

    let entries = groups
        .iter()
        .filter(|g| !g.merged && !g.forms.is_empty())
        .map(|g| {
            let total: u32 = g.forms.iter().map(|(_, c)| c).sum();
            (g.display_form().to_string(), total)
        })
        .collect();

    WordCounts::from_entries(entries)
}
