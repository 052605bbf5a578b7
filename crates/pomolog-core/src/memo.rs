//! Memo collection at the end of an interval.
//!
//! The prompt itself belongs to the front-end. From the session's side it is
//! a request that suspends the completion path until the user saves or
//! dismisses it; dismissal means "no memo", never an error.

use async_trait::async_trait;

use crate::timer::Mode;

#[async_trait]
pub trait MemoPrompt: Send {
    /// Ask for free text. `None` on cancel; a trimmed, possibly empty,
    /// string on save.
    async fn prompt_memo(&mut self, title: &str, placeholder: &str) -> Option<String>;
}

/// A prompt that never asks. Every interval is logged without a memo.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrompt;

#[async_trait]
impl MemoPrompt for NoPrompt {
    async fn prompt_memo(&mut self, _title: &str, _placeholder: &str) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoRequest {
    pub title: &'static str,
    pub placeholder: &'static str,
}

impl MemoRequest {
    pub fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::Work => Self {
                title: "Work session finished 🎯",
                placeholder: "What did you study / do this session?",
            },
            Mode::ShortBreak | Mode::LongBreak => Self {
                title: "Break finished ☕",
                placeholder: "What did you do during the break? (optional)",
            },
        }
    }
}

/// Ask for a memo about an interval in `mode`.
///
/// Blank text counts as no memo.
pub async fn collect(prompt: &mut dyn MemoPrompt, mode: Mode) -> Option<String> {
    let request = MemoRequest::for_mode(mode);
    prompt
        .prompt_memo(request.title, request.placeholder)
        .await
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
