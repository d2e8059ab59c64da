use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

use crate::model::Coordinates;

/// The user did not grant a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("location access denied")]
pub struct LocationDenied;

/// One-shot source of the user's position.
#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    async fn locate(&self) -> Result<Coordinates, LocationDenied>;
}

/// Grants the configured home coordinates, or denies when none are set.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredLocation {
    home: Option<Coordinates>,
}

impl ConfiguredLocation {
    pub fn new(home: Option<Coordinates>) -> Self {
        Self { home }
    }
}

#[async_trait]
impl Geolocator for ConfiguredLocation {
    async fn locate(&self) -> Result<Coordinates, LocationDenied> {
        self.home.ok_or(LocationDenied)
    }
}
