// ABOUTME: Core types and constants for the Wayfinder research survey backend
// ABOUTME: Foundation crate with error handling, domain models, limits, and input validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Wayfinder Core
//!
//! Foundation crate providing shared types and constants for the Wayfinder
//! survey backend. This crate is designed to change infrequently, enabling
//! incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Rating ranges, text limits, and the exchange cap
//! - **models**: Stages, sessions, surveys, landscapes, interactions, personas, metaphors
//! - **validation**: Field-level checks shared by every stage submission

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models (Session, Stage, Interaction, PersonaKey, etc.)
pub mod models;

/// Field validation for ratings and free text
pub mod validation;
