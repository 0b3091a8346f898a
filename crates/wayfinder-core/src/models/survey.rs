// ABOUTME: Survey and landscape self-report models with validating constructors
// ABOUTME: Covers the ten PANAS affect items, pre/post Likert surveys, and journey landscapes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::ratings;
use crate::errors::{AppError, AppResult};
use crate::models::Stage;
use crate::validation;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// One item of the positive/negative affect schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AffectItem {
    /// Active
    Active,
    /// Alert
    Alert,
    /// Attentive
    Attentive,
    /// Determined
    Determined,
    /// Inspired
    Inspired,
    /// Afraid
    Afraid,
    /// Ashamed
    Ashamed,
    /// Hostile
    Hostile,
    /// Nervous
    Nervous,
    /// Upset
    Upset,
}

impl AffectItem {
    /// Items in their fixed presentation and storage order
    pub const ALL: [Self; 10] = [
        Self::Active,
        Self::Alert,
        Self::Attentive,
        Self::Determined,
        Self::Inspired,
        Self::Afraid,
        Self::Ashamed,
        Self::Hostile,
        Self::Nervous,
        Self::Upset,
    ];

    /// Key used in request payloads and as the column suffix
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Alert => "alert",
            Self::Attentive => "attentive",
            Self::Determined => "determined",
            Self::Inspired => "inspired",
            Self::Afraid => "afraid",
            Self::Ashamed => "ashamed",
            Self::Hostile => "hostile",
            Self::Nervous => "nervous",
            Self::Upset => "upset",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// A complete set of ten affect ratings (1-5 each)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AffectRatings([u8; 10]);

impl AffectRatings {
    /// Validate a `panasData` object; every item must be present and in range
    ///
    /// # Errors
    ///
    /// Returns an error if the object is missing or any item is absent or out of range
    pub fn from_json(panas: Option<&Map<String, Value>>) -> AppResult<Self> {
        let panas = panas.ok_or_else(|| AppError::missing_field("panasData"))?;
        let mut values = [0_u8; 10];
        for item in AffectItem::ALL {
            let field = format!("panasData.{}", item.as_str());
            values[item.index()] =
                validation::rating(&field, panas.get(item.as_str()), &ratings::AFFECT)?;
        }
        Ok(Self(values))
    }

    /// Build from already-validated values in [`AffectItem::ALL`] order
    ///
    /// # Errors
    ///
    /// Returns an error if any value is outside 1-5
    pub fn from_values(values: [u8; 10]) -> AppResult<Self> {
        if let Some(item) = AffectItem::ALL
            .into_iter()
            .find(|item| !ratings::AFFECT.contains(&values[item.index()]))
        {
            return Err(AppError::out_of_range(format!(
                "affect rating {} is outside 1-5",
                item.as_str()
            )));
        }
        Ok(Self(values))
    }

    /// Rating for one item
    #[must_use]
    pub const fn get(&self, item: AffectItem) -> u8 {
        self.0[item.index()]
    }

    /// Ratings paired with their items in storage order
    pub fn iter(&self) -> impl Iterator<Item = (AffectItem, u8)> + '_ {
        AffectItem::ALL.into_iter().map(|item| (item, self.get(item)))
    }
}

impl Serialize for AffectRatings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(AffectItem::ALL.len()))?;
        for (item, value) in self.iter() {
            map.serialize_entry(item.as_str(), &value)?;
        }
        map.end()
    }
}

/// Baseline survey: three Likert items plus affect ratings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreSurvey {
    /// Items 1-3, each 1-7
    pub items: [u8; ratings::PRE_SURVEY_ITEMS],
    /// Affect ratings
    pub affect: AffectRatings,
}

impl PreSurvey {
    /// Validate raw request values
    ///
    /// # Errors
    ///
    /// Returns an error naming the first missing or out-of-range field
    pub fn from_json(
        items: [Option<&Value>; ratings::PRE_SURVEY_ITEMS],
        panas: Option<&Map<String, Value>>,
    ) -> AppResult<Self> {
        Ok(Self {
            items: likert_items("preItem", items)?,
            affect: AffectRatings::from_json(panas)?,
        })
    }
}

/// Follow-up survey: six Likert items, affect ratings, and a written reflection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSurvey {
    /// Items 1-6, each 1-7
    pub items: [u8; ratings::POST_SURVEY_ITEMS],
    /// Affect ratings
    pub affect: AffectRatings,
    /// Reflection, trimmed, at least 20 characters
    pub open_response: String,
}

impl PostSurvey {
    /// Validate raw request values
    ///
    /// # Errors
    ///
    /// Returns an error naming the first missing or out-of-range field
    pub fn from_json(
        items: [Option<&Value>; ratings::POST_SURVEY_ITEMS],
        panas: Option<&Map<String, Value>>,
        open_response: Option<&str>,
    ) -> AppResult<Self> {
        Ok(Self {
            items: likert_items("postItem", items)?,
            affect: AffectRatings::from_json(panas)?,
            open_response: validation::open_response(open_response)?,
        })
    }
}

fn likert_items<const N: usize>(prefix: &str, items: [Option<&Value>; N]) -> AppResult<[u8; N]> {
    let mut values = [0_u8; N];
    for (index, value) in items.into_iter().enumerate() {
        values[index] =
            validation::rating(&format!("{prefix}{}", index + 1), value, &ratings::LIKERT)?;
    }
    Ok(values)
}

/// Which landscape self-report is being submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LandscapePhase {
    /// Before the chat
    Pre,
    /// After the chat
    Post,
}

impl LandscapePhase {
    /// Stage at which this phase is submitted
    #[must_use]
    pub const fn stage(self) -> Stage {
        match self {
            Self::Pre => Stage::PreLandscape,
            Self::Post => Stage::PostLandscape,
        }
    }

    /// Column prefix for this phase's landscape columns
    #[must_use]
    pub const fn column_prefix(self) -> &'static str {
        match self {
            Self::Pre => "pre_",
            Self::Post => "",
        }
    }

    /// Lowercase label used in logs and payloads
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pre => "pre",
            Self::Post => "post",
        }
    }
}

/// Metaphor landscape self-report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LandscapeAssessment {
    /// Generated start phrase shown to the participant
    pub generated_start_phrase: String,
    /// Generated destination phrase shown to the participant
    pub generated_end_phrase: String,
    /// Participant's replacement start phrase
    pub edited_start_phrase: Option<String>,
    /// Participant's replacement destination phrase
    pub edited_end_phrase: Option<String>,
    /// How far along the journey the participant feels (1-7)
    pub journey_progress: u8,
    /// Willingness to keep going (1-7); required below full progress
    pub willingness_to_continue: Option<u8>,
}

impl LandscapeAssessment {
    /// Validate raw request values
    ///
    /// # Errors
    ///
    /// Returns an error if a generated phrase is blank, progress is missing or out of
    /// range, or willingness is missing while progress is below 7
    pub fn from_json(
        generated_start_phrase: Option<&str>,
        generated_end_phrase: Option<&str>,
        edited_start_phrase: Option<&str>,
        edited_end_phrase: Option<&str>,
        journey_progress: Option<&Value>,
        willingness_to_continue: Option<&Value>,
    ) -> AppResult<Self> {
        let generated_start_phrase =
            validation::required_text("generatedStartPhrase", generated_start_phrase)?;
        let generated_end_phrase =
            validation::required_text("generatedEndPhrase", generated_end_phrase)?;
        let journey_progress =
            validation::rating("journeyProgress", journey_progress, &ratings::LIKERT)?;

        let willingness_to_continue = if journey_progress < ratings::JOURNEY_COMPLETE {
            Some(validation::rating(
                "willingnessToContinue",
                willingness_to_continue,
                &ratings::LIKERT,
            )?)
        } else {
            validation::optional_rating(
                "willingnessToContinue",
                willingness_to_continue,
                &ratings::LIKERT,
            )?
        };

        Ok(Self {
            generated_start_phrase,
            generated_end_phrase,
            edited_start_phrase: validation::optional_text(edited_start_phrase),
            edited_end_phrase: validation::optional_text(edited_end_phrase),
            journey_progress,
            willingness_to_continue,
        })
    }
}
