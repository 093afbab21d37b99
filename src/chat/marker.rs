//! Stage markers embedded in plain-text chat replies
//!
//! The backend may prefix a reply with `<!-- stage: NAME -->`. The marker
//! is stripped from what the user sees and NAME becomes the message stage.

use regex::Regex;
use std::sync::OnceLock;

use crate::stage::Stage;

fn marker_regex() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| {
        Regex::new(r"<!--\s*stage:\s*(\w+)\s*-->").expect("stage marker pattern is valid")
    })
}

/// Split a reply into its stage (if marked) and the text to display
///
/// Unknown stage names are removed from the text but yield no stage.
///
/// # Examples
///
/// ```
/// use household_assistant::chat::marker::split_stage_marker;
/// use household_assistant::stage::Stage;
///
/// let (stage, text) = split_stage_marker("<!-- stage: greeting -->\nHello!");
/// assert_eq!(stage, Some(Stage::Greeting));
/// assert_eq!(text, "Hello!");
/// ```
pub fn split_stage_marker(reply: &str) -> (Option<Stage>, String) {
    let re = marker_regex();
    let stage = re
        .captures(reply)
        .and_then(|caps| caps.get(1))
        .and_then(|name| Stage::parse_str(name.as_str()));
    let text = re.replace_all(reply, "");
    (stage, text.trim().to_string())
}
