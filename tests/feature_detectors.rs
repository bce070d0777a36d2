use engagement_patterns::features::{
    cashtag_count, emoji_count, extract_text_signals, first_line, has_bold_claim, has_emoji, has_list,
    has_number, has_question, hashtag_count, last_line, Feature, TRACKED_FEATURES,
};

#[test]
fn question_detects_mark_and_interrogative_openers() {
    assert!(has_question("Shipping fast matters?"));
    assert!(has_question("Why do launches slip"));
    assert!(has_question("Quick note\nhow would you fix this"));
    assert!(!has_question("Shipping fast matters."));
    assert!(!has_question("Somehow it worked"));
}

#[test]
fn number_requires_leading_position_or_whitespace() {
    assert!(has_number("3 lessons from a failed launch"));
    assert!(has_number("I made\n10 mistakes"));
    assert!(has_number("We grew 40% this year"));
    assert!(!has_number("Web3 is a buzzword"));
    assert!(!has_number("No digits here"));
}

#[test]
fn bold_claim_matches_markers_case_insensitively() {
    assert!(has_bold_claim("Unpopular opinion: meetings are fine"));
    assert!(has_bold_claim("HOT TAKE incoming"));
    assert!(has_bold_claim("Most people never ship"));
    assert!(!has_bold_claim("A calm observation about shipping"));
}

#[test]
fn list_detects_numbered_and_bulleted_lines() {
    assert!(has_list("Steps:\n1. Write\n2. Ship"));
    assert!(has_list("Steps:\n1) Write"));
    assert!(has_list("Notes:\n- first"));
    assert!(has_list("• one\n• two"));
    assert!(has_list("→ arrows count too"));
    assert!(!has_list("1.5 million users"));
    assert!(!has_list("a - b"));
}

#[test]
fn emoji_detects_pictographs_only() {
    assert!(has_emoji("Launch day 🚀"));
    assert!(has_emoji("Sunny ☀ morning"));
    assert!(has_emoji("Nice work ⭐"));
    assert!(has_emoji("Time's up ⌛"));
    assert!(has_emoji("Alarm ⏰"));
    assert!(has_emoji("Mahjong 🀄"));
    assert!(has_emoji("🅰 grade"));
    assert!(has_emoji("Status 🆗"));
    assert!(has_emoji("⬆ up"));
    assert!(!has_emoji("Plain text → with arrow"));
    assert!(!has_emoji("café"));
    assert!(!has_emoji("Deadline at 10:00 ⌀"));
}

#[test]
fn emoji_count_covers_symbol_blocks() {
    assert_eq!(emoji_count("⭐⭐ and ⌛ with 🅰"), 4);
}

#[test]
fn counts_hashtags_and_cashtags() {
    assert_eq!(hashtag_count("#rust #buildinpublic and more"), 2);
    assert_eq!(hashtag_count("no tags"), 0);
    assert_eq!(cashtag_count("$TSLA and $AAPL are up"), 2);
    assert_eq!(cashtag_count("costs $5"), 0);
}

#[test]
fn tracked_feature_table_matches_detectors() {
    assert_eq!(TRACKED_FEATURES.len(), 5);
    assert!(Feature::Questions.detect("Why?"));
    assert!(Feature::Numbers.detect("5 tips"));
    assert!(Feature::BoldClaims.detect("nobody talks about this"));
    assert!(Feature::Lists.detect("- item"));
    assert!(Feature::Emojis.detect("🔥"));
    assert!(!Feature::Emojis.detect("fire"));
}

#[test]
fn first_and_last_lines_skip_blank_lines() {
    let text = "\n  Hook line here  \n\nBody\n\nReply with your take\n\n";
    assert_eq!(first_line(text), "Hook line here");
    assert_eq!(last_line(text), "Reply with your take");
    assert_eq!(first_line("   "), "");
}

#[test]
fn text_signals_capture_structure() {
    let signals = extract_text_signals("What would you cut first?\nShip less. Learn more #product 🚀");
    assert_eq!(signals.first_line, "What would you cut first?");
    assert_eq!(signals.line_breaks, 1);
    assert_eq!(signals.sentence_count, 3);
    assert_eq!(signals.hashtags, 1);
    assert_eq!(signals.emojis, 1);
    assert!(signals.has_question);
    assert!(signals.addresses_reader);
    assert!(!signals.has_number);
}
