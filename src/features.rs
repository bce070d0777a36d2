use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static INTERROGATIVE_OPENER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?im)^\s*(who|what|when|where|why|how|which|is|are|do|does|did|can|could|would|should|ever wondered)\b",
    )
    .expect("interrogative pattern is valid")
});

static NUMBER_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)\d").expect("number pattern is valid"));

static LIST_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?:\d[.)]\s|[-•→]\s)").expect("list pattern is valid")
});

static HASHTAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"#\w+").expect("hashtag pattern is valid"));

static CASHTAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$[A-Za-z][A-Za-z0-9]{0,5}\b").expect("cashtag pattern is valid"));

static URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:https?://|www\.)\S+").expect("url pattern is valid"));

pub const BOLD_CLAIM_MARKERS: [&str; 7] = [
    "unpopular opinion",
    "hot take",
    "nobody",
    "everyone",
    "most people",
    "the truth",
    "controversial",
];

pub fn has_question(text: &str) -> bool {
    text.contains('?') || INTERROGATIVE_OPENER.is_match(text)
}

pub fn has_number(text: &str) -> bool {
    NUMBER_TOKEN.is_match(text)
}

pub fn has_bold_claim(text: &str) -> bool {
    let lowercase = text.to_lowercase();
    BOLD_CLAIM_MARKERS
        .iter()
        .any(|marker| lowercase.contains(marker))
}

pub fn has_list(text: &str) -> bool {
    LIST_LINE.is_match(text)
}

pub fn has_emoji(text: &str) -> bool {
    text.chars().any(is_emoji)
}

pub fn emoji_count(text: &str) -> usize {
    text.chars().filter(|ch| is_emoji(*ch)).count()
}

pub fn hashtag_count(text: &str) -> usize {
    HASHTAG.find_iter(text).count()
}

pub fn cashtag_count(text: &str) -> usize {
    CASHTAG.find_iter(text).count()
}

pub fn url_count(text: &str) -> usize {
    URL.find_iter(text).count()
}

fn is_emoji(ch: char) -> bool {
    matches!(
        ch as u32,
        0x1F000..=0x1F0FF
            | 0x1F100..=0x1F1FF
            | 0x1F300..=0x1F5FF
            | 0x1F600..=0x1F64F
            | 0x1F680..=0x1F6FF
            | 0x1F900..=0x1F9FF
            | 0x1FA70..=0x1FAFF
            | 0x231A..=0x231B
            | 0x23E9..=0x23FA
            | 0x2600..=0x26FF
            | 0x2700..=0x27BF
            | 0x2B00..=0x2BFF
    )
}

/// Textual features tracked by the effectiveness estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Questions,
    Numbers,
    BoldClaims,
    Lists,
    Emojis,
}

impl Feature {
    pub fn name(self) -> &'static str {
        match self {
            Feature::Questions => "questions",
            Feature::Numbers => "numbers",
            Feature::BoldClaims => "bold_claims",
            Feature::Lists => "lists",
            Feature::Emojis => "emojis",
        }
    }

    pub fn detect(self, text: &str) -> bool {
        TRACKED_FEATURES
            .iter()
            .find(|(feature, _)| *feature == self)
            .map(|(_, detector)| detector(text))
            .unwrap_or(false)
    }
}

pub type Detector = fn(&str) -> bool;

pub const TRACKED_FEATURES: [(Feature, Detector); 5] = [
    (Feature::Questions, has_question),
    (Feature::Numbers, has_number),
    (Feature::BoldClaims, has_bold_claim),
    (Feature::Lists, has_list),
    (Feature::Emojis, has_emoji),
];

#[derive(Debug, Clone)]
pub struct TextSignals {
    pub char_count: usize,
    pub first_line: String,
    pub line_breaks: usize,
    pub word_count: usize,
    pub sentence_count: usize,
    pub avg_words_per_sentence: f64,
    pub avg_word_len: f64,
    pub hashtags: usize,
    pub cashtags: usize,
    pub emojis: usize,
    pub urls: usize,
    pub has_question: bool,
    pub has_number: bool,
    pub has_bold_claim: bool,
    pub has_list: bool,
    pub addresses_reader: bool,
    pub reply_prompt: bool,
}

pub fn extract_text_signals(text: &str) -> TextSignals {
    let lowercase = text.to_lowercase();

    let mut word_total = 0usize;
    let mut word_count = 0usize;
    for word in text.split_whitespace() {
        let len = word.chars().filter(|c| c.is_alphabetic()).count();
        if len > 0 {
            word_total += len;
            word_count += 1;
        }
    }

    let avg_word_len = if word_count == 0 {
        0.0
    } else {
        word_total as f64 / word_count as f64
    };

    let sentences: Vec<usize> = text
        .split(|c: char| matches!(c, '.' | '!' | '?' | '\n'))
        .map(|sentence| sentence.split_whitespace().count())
        .filter(|words| *words > 0)
        .collect();
    let sentence_count = sentences.len();
    let avg_words_per_sentence = if sentence_count == 0 {
        0.0
    } else {
        sentences.iter().sum::<usize>() as f64 / sentence_count as f64
    };

    let addresses_reader = lowercase
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .any(|word| matches!(word, "you" | "your" | "you're" | "you've" | "yours"));

    let reply_prompt = [
        "thoughts",
        "what do you think",
        "agree",
        "disagree",
        "reply",
        "comment",
        "let me know",
        "tell me",
        "drop your",
    ]
    .iter()
    .any(|phrase| lowercase.contains(phrase));

    TextSignals {
        char_count: text.chars().count(),
        first_line: first_line(text).to_string(),
        line_breaks: text.matches('\n').count(),
        word_count,
        sentence_count,
        avg_words_per_sentence,
        avg_word_len,
        hashtags: hashtag_count(text),
        cashtags: cashtag_count(text),
        emojis: emoji_count(text),
        urls: url_count(text),
        has_question: has_question(text),
        has_number: has_number(text),
        has_bold_claim: has_bold_claim(text),
        has_list: has_list(text),
        addresses_reader,
        reply_prompt,
    }
}

pub fn first_line(text: &str) -> &str {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
}

pub fn last_line(text: &str) -> &str {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .unwrap_or("")
}

pub fn non_empty_line_count(text: &str) -> usize {
    text.lines().filter(|line| !line.trim().is_empty()).count()
}
