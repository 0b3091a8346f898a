// ABOUTME: Persona keys and the 2x2 selection grid quadrants that map onto them
// ABOUTME: Keys are the stable identifiers carried in navigation state and chat requests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of one of the four conversational personas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PersonaKey {
    /// Affirming voice speaking as the participant
    SycophanticSelf,
    /// Critical voice speaking as the participant
    AntagonisticSelf,
    /// Affirming friend
    SycophanticCompanion,
    /// Honest, teasing friend
    AntagonisticCompanion,
}

impl PersonaKey {
    /// All personas in grid order
    pub const ALL: [Self; 4] = [
        Self::SycophanticSelf,
        Self::AntagonisticSelf,
        Self::SycophanticCompanion,
        Self::AntagonisticCompanion,
    ];

    /// Lookup key
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SycophanticSelf => "sycophantic-self",
            Self::AntagonisticSelf => "antagonistic-self",
            Self::SycophanticCompanion => "sycophantic-companion",
            Self::AntagonisticCompanion => "antagonistic-companion",
        }
    }

    /// Grid position of this persona
    #[must_use]
    pub const fn quadrant(self) -> Quadrant {
        match self {
            Self::SycophanticSelf => Quadrant::TopLeft,
            Self::AntagonisticSelf => Quadrant::TopRight,
            Self::SycophanticCompanion => Quadrant::BottomLeft,
            Self::AntagonisticCompanion => Quadrant::BottomRight,
        }
    }

    /// Whether the persona speaks as the participant's own inner voice
    #[must_use]
    pub const fn is_self_talk(self) -> bool {
        matches!(self, Self::SycophanticSelf | Self::AntagonisticSelf)
    }
}

impl fmt::Display for PersonaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PersonaKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| AppError::not_found(format!("Persona '{s}'")))
    }
}

/// Position on the 2x2 persona selection grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Quadrant {
    /// Supportive, self-talk
    TopLeft,
    /// Challenging, self-talk
    TopRight,
    /// Supportive, companion
    BottomLeft,
    /// Challenging, companion
    BottomRight,
}

impl Quadrant {
    /// All four grid positions
    pub const ALL: [Self; 4] = [
        Self::TopLeft,
        Self::TopRight,
        Self::BottomLeft,
        Self::BottomRight,
    ];

    /// Grid position label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomRight => "bottom-right",
        }
    }

    /// Persona occupying this position
    #[must_use]
    pub const fn persona(self) -> PersonaKey {
        match self {
            Self::TopLeft => PersonaKey::SycophanticSelf,
            Self::TopRight => PersonaKey::AntagonisticSelf,
            Self::BottomLeft => PersonaKey::SycophanticCompanion,
            Self::BottomRight => PersonaKey::AntagonisticCompanion,
        }
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Quadrant {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|quadrant| quadrant.as_str() == s)
            .ok_or_else(|| AppError::invalid_input(format!("Unknown grid quadrant: {s}")))
    }
}
