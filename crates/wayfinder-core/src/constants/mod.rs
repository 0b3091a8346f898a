// ABOUTME: Application-wide constants for survey ratings, text limits, and chat bounds
// ABOUTME: Single source of the numeric limits enforced by validation and the chat controller
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Application constants organized by domain

/// Rating scale bounds
pub mod ratings {
    use std::ops::RangeInclusive;

    /// Seven-point scale used by survey items, journey progress, and willingness
    pub const LIKERT: RangeInclusive<u8> = 1..=7;

    /// Five-point scale used by the affect (PANAS) items
    pub const AFFECT: RangeInclusive<u8> = 1..=5;

    /// Journey progress value meaning "arrived"; willingness is optional at this value
    pub const JOURNEY_COMPLETE: u8 = 7;

    /// Number of Likert items in the pre-chat survey
    pub const PRE_SURVEY_ITEMS: usize = 3;

    /// Number of Likert items in the post-chat survey
    pub const POST_SURVEY_ITEMS: usize = 6;
}

/// Free-text and tag limits
pub mod limits {
    /// Maximum situation description length in characters
    pub const SITUATION_MAX_CHARS: usize = 1000;

    /// Minimum reflection length in characters after trimming
    pub const OPEN_RESPONSE_MIN_CHARS: usize = 20;

    /// Maximum length of a client-supplied interaction tag
    pub const INTERACTION_TYPE_MAX_LEN: usize = 50;

    /// Maximum length of a single chat turn accepted from the client
    pub const CHAT_MESSAGE_MAX_CHARS: usize = 4000;
}

/// Chat bounds
pub mod chat {
    /// An exchange is one user turn plus its assistant reply
    pub const MAX_EXCHANGES: u32 = 10;

    /// Reply substituted for any completion failure
    pub const FALLBACK_REPLY: &str =
        "I'm having trouble responding right now. Could you try rephrasing your message?";
}
