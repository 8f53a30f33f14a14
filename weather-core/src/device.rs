//! Position services standing in for a platform location API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::{
    error::PositionError,
    location::{PermissionStatus, PositionService},
    model::Coordinate,
};

pub const DEFAULT_IP_URL: &str = "http://ip-api.com/json";

/// Stored answer to "may this app use your location?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionPolicy {
    Granted,
    Denied,
    #[default]
    Ask,
}

impl PermissionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionPolicy::Granted => "granted",
            PermissionPolicy::Denied => "denied",
            PermissionPolicy::Ask => "ask",
        }
    }
}

impl std::fmt::Display for PermissionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interactive yes/no question shown when the policy is [`PermissionPolicy::Ask`].
pub trait PermissionPrompt: Send + Sync + Debug {
    fn confirm(&self, message: &str) -> bool;
}

const PROMPT_MESSAGE: &str = "Allow the weather app to use this device's location?";

#[derive(Debug)]
pub struct PermissionGate {
    policy: PermissionPolicy,
    prompt: Option<Box<dyn PermissionPrompt>>,
}

impl PermissionGate {
    pub fn new(policy: PermissionPolicy, prompt: Option<Box<dyn PermissionPrompt>>) -> Self {
        Self { policy, prompt }
    }

    /// Evaluate the policy. `Ask` without a prompt is treated as denied.
    pub fn request(&self) -> PermissionStatus {
        let granted = match self.policy {
            PermissionPolicy::Granted => true,
            PermissionPolicy::Denied => false,
            PermissionPolicy::Ask => self.prompt.as_ref().is_some_and(|p| p.confirm(PROMPT_MESSAGE)),
        };

        if granted { PermissionStatus::Granted } else { PermissionStatus::Denied }
    }
}

/// Approximate device position from the public IP address.
#[derive(Debug)]
pub struct IpPositionService {
    gate: PermissionGate,
    url: String,
    http: Client,
}

impl IpPositionService {
    pub fn new(gate: PermissionGate, url: &str) -> Self {
        Self { gate, url: url.to_string(), http: Client::new() }
    }
}

#[derive(Debug, Deserialize)]
struct IpLookup {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

#[async_trait]
impl PositionService for IpPositionService {
    async fn request_permission(&self) -> PermissionStatus {
        self.gate.request()
    }

    async fn current_position(&self) -> Result<Coordinate, PositionError> {
        tracing::debug!(url = %self.url, "IP position lookup");

        let lookup: IpLookup = self.http.get(&self.url).send().await?.error_for_status()?.json().await?;

        match (lookup.status.as_str(), lookup.lat, lookup.lon) {
            ("success", Some(lat), Some(lon)) => Ok(Coordinate::new(lat, lon)),
            _ => Err(PositionError::Lookup(
                lookup.message.unwrap_or_else(|| format!("status '{}'", lookup.status)),
            )),
        }
    }
}

/// Device position pinned in the configuration file.
#[derive(Debug)]
pub struct FixedPositionService {
    gate: PermissionGate,
    position: Option<Coordinate>,
}

impl FixedPositionService {
    pub fn new(gate: PermissionGate, position: Option<Coordinate>) -> Self {
        Self { gate, position }
    }
}

#[async_trait]
impl PositionService for FixedPositionService {
    async fn request_permission(&self) -> PermissionStatus {
        self.gate.request()
    }

    async fn current_position(&self) -> Result<Coordinate, PositionError> {
        self.position.ok_or(PositionError::NotConfigured)
    }
}
