//! Ordered source priorities for tiered fusion.

use std::collections::BTreeSet;

use boardsight_core::PieceKind;
use serde::{Deserialize, Serialize};

use crate::{DetectorRole, FusionError};

/// Piece kinds a tier may contribute.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "kinds")]
pub enum CategoryFilter {
    All,
    Only(BTreeSet<PieceKind>),
    Except(BTreeSet<PieceKind>),
}

impl CategoryFilter {
    pub fn only(kinds: impl IntoIterator<Item = PieceKind>) -> Self {
        CategoryFilter::Only(kinds.into_iter().collect())
    }

    pub fn except(kinds: impl IntoIterator<Item = PieceKind>) -> Self {
        CategoryFilter::Except(kinds.into_iter().collect())
    }

    pub fn accepts(&self, kind: PieceKind) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(kinds) => kinds.contains(&kind),
            CategoryFilter::Except(kinds) => !kinds.contains(&kind),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FusionTier {
    pub source: String,
    pub categories: CategoryFilter,
}

impl FusionTier {
    pub fn new(source: impl Into<String>, categories: CategoryFilter) -> Self {
        Self {
            source: source.into(),
            categories,
        }
    }
}

/// Tiers in decreasing priority.
///
/// A detection from a later tier is admitted only when it does not overlap
/// anything admitted by an earlier tier. Detections inside one tier never
/// suppress each other.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FusionPolicy {
    tiers: Vec<FusionTier>,
}

impl FusionPolicy {
    pub fn new(tiers: Vec<FusionTier>) -> Result<Self, FusionError> {
        for (i, tier) in tiers.iter().enumerate() {
            if tiers[..i].iter().any(|t| t.source == tier.source) {
                return Err(FusionError::DuplicateTier(tier.source.clone()));
            }
        }
        Ok(Self { tiers })
    }

    /// Specialist restricted to `strategic`, then the generalist for all kinds.
    pub fn two_tier(
        specialist: impl Into<String>,
        generalist: impl Into<String>,
        strategic: &[PieceKind],
    ) -> Self {
        Self {
            tiers: vec![
                FusionTier::new(specialist, CategoryFilter::only(strategic.iter().copied())),
                FusionTier::new(generalist, CategoryFilter::All),
            ],
        }
    }

    /// Every specialist (restricted to `strategic`) ahead of every generalist,
    /// preserving the given order within each role.
    pub fn from_roles<'a, I>(sources: I, strategic: &[PieceKind]) -> Self
    where
        I: IntoIterator<Item = (&'a str, DetectorRole)>,
    {
        let sources: Vec<(&str, DetectorRole)> = sources.into_iter().collect();
        let mut tiers = Vec::with_capacity(sources.len());
        for wanted in [DetectorRole::Specialist, DetectorRole::Generalist] {
            for &(name, role) in &sources {
                if role != wanted || tiers.iter().any(|t: &FusionTier| t.source == name) {
                    continue;
                }
                let categories = match role {
                    DetectorRole::Specialist => CategoryFilter::only(strategic.iter().copied()),
                    DetectorRole::Generalist => CategoryFilter::All,
                };
                tiers.push(FusionTier::new(name, categories));
            }
        }
        Self { tiers }
    }

    /// One source, all kinds.
    pub fn single(source: impl Into<String>) -> Self {
        Self {
            tiers: vec![FusionTier::new(source, CategoryFilter::All)],
        }
    }

    pub fn tiers(&self) -> &[FusionTier] {
        &self.tiers
    }
}
