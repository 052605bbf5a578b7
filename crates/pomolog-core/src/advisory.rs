//! Rule-based Do / Don't guidance for break memos.
//!
//! Classification is a case-insensitive substring match against two keyword
//! lists. It cannot fail: an empty memo, a skipped break, or text that hits
//! neither list all get the neutral advice.

const DISCOURAGE: &[&str] = &[
    "scroll", "instagram", "tiktok", "reel", "youtube", "doom", "binge", "gaming", "whatsapp",
    "twitter", "x.com", "reddit",
];

const ENCOURAGE: &[&str] = &[
    "walk", "water", "stretch", "breath", "breathing", "hydrate", "standing", "sunlight", "tea",
    "coffee", "pushups", "plank", "yoga",
];

const AVOID_FEEDS: &str = "Avoid algorithmic feeds and passive scrolling next break.";
const PHONE_AWAY: &str = "Keep phone in another room or enable Focus mode.";
const REPEAT_MOVEMENT: &str = "Repeat quick movement or hydration — it helped reset focus.";
const KEEP_SHORT: &str = "Keep break short (3–5 min) and physically reset (stand/stretch).";
const SIP_WATER: &str = "Sip water; avoid snacks if they cause lethargy.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Advisory {
    pub do_lines: Vec<&'static str>,
    pub dont_lines: Vec<&'static str>,
}

impl Advisory {
    pub fn is_empty(&self) -> bool {
        self.do_lines.is_empty() && self.dont_lines.is_empty()
    }
}

pub fn classify(memo: &str) -> Advisory {
    let text = memo.to_lowercase();
    let mut advisory = Advisory::default();

    if DISCOURAGE.iter().any(|k| text.contains(k)) {
        advisory.dont_lines.push(AVOID_FEEDS);
        advisory.dont_lines.push(PHONE_AWAY);
    }
    if ENCOURAGE.iter().any(|k| text.contains(k)) {
        advisory.do_lines.push(REPEAT_MOVEMENT);
    }
    if advisory.is_empty() {
        advisory.do_lines.push(KEEP_SHORT);
        advisory.do_lines.push(SIP_WATER);
    }
    advisory
}
