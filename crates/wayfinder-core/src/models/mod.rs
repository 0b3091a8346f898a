// ABOUTME: Core domain models for the Wayfinder survey flow
// ABOUTME: Re-exports stage, session, survey, landscape, interaction, persona, and metaphor types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Core data models

mod interaction;
mod metaphor;
mod persona;
mod session;
mod stage;
mod survey;

pub use interaction::{Interaction, InteractionKind};
pub use metaphor::{Metaphor, MetaphorPair};
pub use persona::{PersonaKey, Quadrant};
pub use session::{Session, SessionId};
pub use stage::Stage;
pub use survey::{
    AffectItem, AffectRatings, LandscapeAssessment, LandscapePhase, PostSurvey, PreSurvey,
};
