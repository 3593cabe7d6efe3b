//! Keyword relevance scoring: TF-IDF cosine similarity with a substring
//! fallback for degenerate input.

use std::collections::HashMap;

/// Cosine similarity above this counts as relevant. Deliberately low to
/// favour recall when a short keyword is scored against a long page.
const RELEVANCE_THRESHOLD: f64 = 0.01;

/// Fixed low-confidence score reported when the substring fallback matches.
const FALLBACK_SCORE: f64 = 0.1;

/// Outcome of scoring one page against the keyword.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Relevance {
    pub relevant: bool,
    /// Cosine similarity in `[0, 1]`, or the fixed fallback score.
    pub score: f64,
}

impl Relevance {
    fn none() -> Self {
        Self {
            relevant: false,
            score: 0.0,
        }
    }
}

/// Scores page content against a keyword.
///
/// Builds TF-IDF vectors over the two-document corpus `{content, keyword}`
/// and computes their cosine similarity. When vectorisation degenerates
/// (either document empty after tokenization), falls back to
/// case-insensitive substring containment.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelevanceScorer;

impl RelevanceScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(&self, content: &str, keyword: &str) -> Relevance {
        if keyword.trim().is_empty() {
            return Relevance::none();
        }

        match cosine_similarity(content, keyword) {
            Some(score) => Relevance {
                relevant: score > RELEVANCE_THRESHOLD,
                score,
            },
            None => {
                // Degenerate vocabulary: substring match at low confidence.
                if !content.is_empty()
                    && content.to_lowercase().contains(&keyword.trim().to_lowercase())
                {
                    Relevance {
                        relevant: true,
                        score: FALLBACK_SCORE,
                    }
                } else {
                    Relevance::none()
                }
            }
        }
    }
}

/// TF-IDF cosine similarity over the two-document corpus `{a, b}`.
///
/// Smoothed IDF (`ln((1 + n) / (1 + df)) + 1`) and L2-normalised vectors,
/// so the result lands in `[0, 1]`. Returns `None` when either document
/// has no tokens.
fn cosine_similarity(a: &str, b: &str) -> Option<f64> {
    let docs = [tokenize(a), tokenize(b)];
    if docs[0].is_empty() || docs[1].is_empty() {
        return None;
    }

    // Document frequency per term across the two-document corpus.
    let mut df: HashMap<&str, usize> = HashMap::new();
    for doc in &docs {
        let mut seen: Vec<&str> = doc.keys().map(String::as_str).collect();
        seen.sort_unstable();
        seen.dedup();
        for term in seen {
            *df.entry(term).or_insert(0) += 1;
        }
    }

    let n_docs = docs.len() as f64;
    let idf = |term: &str| {
        let doc_freq = df.get(term).copied().unwrap_or(0) as f64;
        ((1.0 + n_docs) / (1.0 + doc_freq)).ln() + 1.0
    };

    let weigh = |doc: &HashMap<String, usize>| -> HashMap<String, f64> {
        let mut vec: HashMap<String, f64> = doc
            .iter()
            .map(|(term, &count)| (term.clone(), count as f64 * idf(term)))
            .collect();
        let norm = vec.values().map(|w| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for w in vec.values_mut() {
                *w /= norm;
            }
        }
        vec
    };

    let va = weigh(&docs[0]);
    let vb = weigh(&docs[1]);

    let dot: f64 = va
        .iter()
        .filter_map(|(term, wa)| vb.get(term).map(|wb| wa * wb))
        .sum();

    Some(dot.clamp(0.0, 1.0))
}

/// Lowercased alphanumeric tokens of length >= 2, with term counts.
fn tokenize(text: &str) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for token in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 2)
    {
        *counts.entry(token.to_lowercase()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_text_scores_one() {
        let scorer = RelevanceScorer::new();
        let rel = scorer.evaluate("exam", "exam");
        assert!(rel.relevant);
        assert!((rel.score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn shared_term_in_longer_page_is_relevant() {
        let scorer = RelevanceScorer::new();
        let rel = scorer.evaluate(
            "the entrance exam schedule for new students is published here",
            "exam",
        );
        assert!(rel.relevant);
        assert!(rel.score > RELEVANCE_THRESHOLD);
        assert!(rel.score < 1.0);
    }

    #[test]
    fn disjoint_vocabulary_is_not_relevant() {
        let scorer = RelevanceScorer::new();
        let rel = scorer.evaluate("lorem ipsum dolor sit amet", "exam");
        assert!(!rel.relevant);
        assert_eq!(rel.score, 0.0);
    }

    #[test]
    fn empty_keyword_short_circuits() {
        let scorer = RelevanceScorer::new();
        assert_eq!(scorer.evaluate("anything at all", ""), Relevance::none());
        assert_eq!(scorer.evaluate("anything at all", "   \t"), Relevance::none());
    }

    #[test]
    fn empty_content_is_not_relevant() {
        let scorer = RelevanceScorer::new();
        let rel = scorer.evaluate("", "exam");
        assert!(!rel.relevant);
        assert_eq!(rel.score, 0.0);
    }

    #[test]
    fn degenerate_keyword_falls_back_to_substring() {
        // Single-character tokens never survive tokenization, so the
        // vector path degenerates and the substring fallback decides.
        let scorer = RelevanceScorer::new();
        let rel = scorer.evaluate("grade A result", "a");
        assert!(rel.relevant);
        assert_eq!(rel.score, FALLBACK_SCORE);

        let rel = scorer.evaluate("no match here", "z");
        assert!(!rel.relevant);
        assert_eq!(rel.score, 0.0);
    }

    #[test]
    fn fallback_is_case_insensitive() {
        let scorer = RelevanceScorer::new();
        let rel = scorer.evaluate("Grade A result", "a");
        assert!(rel.relevant);
    }

    #[test]
    fn score_is_bounded() {
        let scorer = RelevanceScorer::new();
        for (content, keyword) in [
            ("exam exam exam exam", "exam"),
            ("a mix of exam words and other words", "exam words"),
            ("completely different text", "unrelated keyword"),
        ] {
            let rel = scorer.evaluate(content, keyword);
            assert!((0.0..=1.0).contains(&rel.score), "score {}", rel.score);
        }
    }

    #[test]
    fn higher_overlap_scores_higher() {
        let scorer = RelevanceScorer::new();
        let close = scorer.evaluate("exam registration", "exam registration").score;
        let far = scorer
            .evaluate("exam registration opens monday for all faculties", "exam")
            .score;
        assert!(close > far);
    }
}
