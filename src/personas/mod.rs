// ABOUTME: Static registry of the four conversational personas and their system prompts
// ABOUTME: Prompts are markdown files embedded at compile time; lookup by key or grid quadrant
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Persona Registry
//!
//! Each persona pairs a display identity with the system prompt that shapes
//! its replies. The table is fixed at compile time.

use serde::Serialize;
use wayfinder_core::models::{PersonaKey, Quadrant};

/// One conversational persona
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Persona {
    /// Stable lookup key
    pub key: PersonaKey,
    /// Display name
    pub name: &'static str,
    /// Color tag used by the selection grid
    pub color: &'static str,
    /// One-line description shown to participants
    pub description: &'static str,
    /// System prompt sent with every chat completion
    pub system_prompt: &'static str,
}

impl Persona {
    /// Grid position
    #[must_use]
    pub const fn quadrant(&self) -> Quadrant {
        self.key.quadrant()
    }

    /// Public view without the system prompt
    #[must_use]
    pub const fn summary(&self) -> PersonaSummary {
        PersonaSummary {
            key: self.key,
            name: self.name,
            color: self.color,
            description: self.description,
            quadrant: self.key.quadrant(),
            self_talk: self.key.is_self_talk(),
        }
    }
}

/// Persona as exposed over HTTP
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaSummary {
    /// Stable lookup key
    pub key: PersonaKey,
    /// Display name
    pub name: &'static str,
    /// Color tag
    pub color: &'static str,
    /// One-line description
    pub description: &'static str,
    /// Grid position
    pub quadrant: Quadrant,
    /// Speaks as the participant's inner voice
    pub self_talk: bool,
}

static PERSONAS: [Persona; 4] = [
    Persona {
        key: PersonaKey::SycophanticSelf,
        name: "Supportive Inner Voice",
        color: "blue",
        description:
            "Mirrors your style with agreeable, positive reinforcement to affirm your thoughts.",
        system_prompt: include_str!("prompts/sycophantic-self.md"),
    },
    Persona {
        key: PersonaKey::AntagonisticSelf,
        name: "Challenging Inner Voice",
        color: "green",
        description:
            "Mirrors your style with provocative, humorous counterpoints to expose assumptions.",
        system_prompt: include_str!("prompts/antagonistic-self.md"),
    },
    Persona {
        key: PersonaKey::SycophanticCompanion,
        name: "Supportive Companion",
        color: "pink",
        description:
            "Engages agreeably in back-and-forth, offering validation and gentle encouragement.",
        system_prompt: include_str!("prompts/sycophantic-companion.md"),
    },
    Persona {
        key: PersonaKey::AntagonisticCompanion,
        name: "Challenging Companion",
        color: "yellow",
        description: "Engages provocatively in back-and-forth, using humor and counterarguments to build resilience.",
        system_prompt: include_str!("prompts/antagonistic-companion.md"),
    },
];

/// All personas in grid order
#[must_use]
pub fn all() -> &'static [Persona] {
    &PERSONAS
}

/// Persona for a key
#[must_use]
pub fn get(key: PersonaKey) -> &'static Persona {
    match key {
        PersonaKey::SycophanticSelf => &PERSONAS[0],
        PersonaKey::AntagonisticSelf => &PERSONAS[1],
        PersonaKey::SycophanticCompanion => &PERSONAS[2],
        PersonaKey::AntagonisticCompanion => &PERSONAS[3],
    }
}

/// Persona for a textual key, `None` when unknown
#[must_use]
pub fn lookup(key: &str) -> Option<&'static Persona> {
    key.parse::<PersonaKey>().ok().map(get)
}

/// Persona at a grid position label, `None` outside the four positions
#[must_use]
pub fn by_quadrant(position: &str) -> Option<&'static Persona> {
    position
        .parse::<Quadrant>()
        .ok()
        .map(|quadrant| get(quadrant.persona()))
}
