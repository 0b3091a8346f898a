// ABOUTME: Metaphor phrases pairing an emotion with a landscape feature
// ABOUTME: Start and destination metaphors with the fixed fallback pair
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

/// Emotion adjective plus geography noun, e.g. "anxious valley"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metaphor {
    /// Emotion adjective
    #[serde(default)]
    pub emotion: String,
    /// Landscape noun
    #[serde(default)]
    pub geography: String,
    /// Combined phrase shown to the participant
    #[serde(default)]
    pub phrase: String,
}

impl Metaphor {
    fn new(emotion: &str, geography: &str) -> Self {
        Self {
            emotion: emotion.to_owned(),
            geography: geography.to_owned(),
            phrase: format!("{emotion} {geography}"),
        }
    }
}

/// Current emotional state and desired destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaphorPair {
    /// Where the participant likely is now
    pub start_metaphor: Metaphor,
    /// Where the participant wants to be
    pub end_metaphor: Metaphor,
}

impl MetaphorPair {
    /// Pair offered whenever generation fails
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            start_metaphor: Metaphor::new("uncertain", "valley"),
            end_metaphor: Metaphor::new("confident", "peak"),
        }
    }
}
