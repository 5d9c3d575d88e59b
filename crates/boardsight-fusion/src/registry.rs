use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{DetectionAdapter, FusionError};

/// What a detector is trusted with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorRole {
    /// High precision on the strategic kinds; leads priority fusion.
    Specialist,
    /// Broad coverage of every kind; fills gaps.
    Generalist,
}

impl DetectorRole {
    pub fn name(self) -> &'static str {
        match self {
            DetectorRole::Specialist => "specialist",
            DetectorRole::Generalist => "generalist",
        }
    }

    pub fn other(self) -> Self {
        match self {
            DetectorRole::Specialist => DetectorRole::Generalist,
            DetectorRole::Generalist => DetectorRole::Specialist,
        }
    }
}

impl fmt::Display for DetectorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named adapter plus its role.
#[derive(Clone)]
pub struct RegisteredModel {
    pub name: String,
    pub role: DetectorRole,
    pub adapter: Arc<dyn DetectionAdapter>,
}

impl RegisteredModel {
    pub fn is_available(&self) -> bool {
        self.adapter.is_available()
    }
}

impl fmt::Debug for RegisteredModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredModel")
            .field("name", &self.name)
            .field("role", &self.role)
            .field("available", &self.is_available())
            .finish()
    }
}

/// Summary row for listing loaded models.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub role: DetectorRole,
    pub available: bool,
}

/// Loaded detectors, in registration order.
///
/// Built once at startup and shared read-only afterwards.
#[derive(Clone, Debug, Default)]
pub struct ModelRegistry {
    models: Vec<RegisteredModel>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<A>(
        &mut self,
        name: impl Into<String>,
        role: DetectorRole,
        adapter: A,
    ) -> Result<(), FusionError>
    where
        A: DetectionAdapter + 'static,
    {
        self.register_shared(name, role, Arc::new(adapter))
    }

    pub fn register_shared(
        &mut self,
        name: impl Into<String>,
        role: DetectorRole,
        adapter: Arc<dyn DetectionAdapter>,
    ) -> Result<(), FusionError> {
        let name = name.into();
        if self.get(&name).is_some() {
            return Err(FusionError::DuplicateModel(name));
        }
        log::debug!("registered {role} model {name:?}");
        self.models.push(RegisteredModel {
            name,
            role,
            adapter,
        });
        Ok(())
    }

    /// Builder-style [`ModelRegistry::register`].
    pub fn with_model<A>(
        mut self,
        name: impl Into<String>,
        role: DetectorRole,
        adapter: A,
    ) -> Result<Self, FusionError>
    where
        A: DetectionAdapter + 'static,
    {
        self.register(name, role, adapter)?;
        Ok(self)
    }

    pub fn models(&self) -> &[RegisteredModel] {
        &self.models
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredModel> {
        self.models.iter().find(|m| m.name == name)
    }

    pub fn with_role(&self, role: DetectorRole) -> impl Iterator<Item = &RegisteredModel> + '_ {
        self.models.iter().filter(move |m| m.role == role)
    }

    pub fn available(&self) -> impl Iterator<Item = &RegisteredModel> + '_ {
        self.models.iter().filter(|m| m.is_available())
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn describe(&self) -> Vec<ModelInfo> {
        self.models
            .iter()
            .map(|m| ModelInfo {
                name: m.name.clone(),
                role: m.role,
                available: m.is_available(),
            })
            .collect()
    }
}
