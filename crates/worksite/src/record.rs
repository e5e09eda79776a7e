//! Core record types for worksite.
//!
//! This module defines the sites and incidents held by the registry, the
//! request shapes used to create and patch them, and the tag matching rules
//! shared by filtering and statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Identifier of a [`Site`].
pub type SiteId = u64;

/// Identifier of an [`Incident`].
pub type IncidentId = u64;

/// Status spellings that mark an incident as resolved (lowercase).
const RESOLVED_STATUSES: &[&str] = &["resolved", "résolu", "resolu"];

/// Severity spellings that mark an incident as critical (lowercase).
const CRITICAL_SEVERITIES: &[&str] = &["critical", "critique"];

/// Check whether a status tag means "resolved".
///
/// Matching is case-insensitive and covers the English and French spellings.
#[must_use]
pub fn is_resolved_status(status: &str) -> bool {
    let status = status.to_lowercase();
    RESOLVED_STATUSES.contains(&status.as_str())
}

/// Check whether a severity tag means "critical".
#[must_use]
pub fn is_critical_severity(severity: &str) -> bool {
    let severity = severity.to_lowercase();
    CRITICAL_SEVERITIES.contains(&severity.as_str())
}

/// A monitored construction site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    /// Unique identifier, assigned by the registry.
    pub id: SiteId,

    /// Display name.
    pub name: String,

    /// City or free-form location.
    pub location: Option<String>,

    /// Name of the site manager.
    pub manager: Option<String>,

    /// Risk score, conventionally 0–100 (not enforced).
    pub risk_score: i32,

    /// Caller-maintained count of open incidents.
    #[serde(default)]
    pub incidents_open: u32,

    /// Workers badged in today.
    #[serde(default)]
    pub workers_present_today: u32,

    /// Workers expected on site today.
    #[serde(default)]
    pub workers_expected_today: u32,
}

/// An event reported against exactly one site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
    /// Unique identifier, assigned by the registry.
    pub id: IncidentId,

    /// The site this incident was reported against.
    pub site_id: SiteId,

    /// Free-text type tag (e.g. "Theft", "Accident", "Intrusion").
    #[serde(rename = "type")]
    pub kind: String,

    /// Free-text severity tag (e.g. "Critical", "Medium", "Minor").
    pub severity: String,

    /// What happened.
    pub description: String,

    /// Free-text status tag (conventionally "New", "In Progress", "Resolved").
    pub status: String,

    /// When the registry stored this incident.
    pub created_at: DateTime<Utc>,
}

impl Incident {
    /// Check if this incident is in a resolved state.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        is_resolved_status(&self.status)
    }

    /// Check if this incident is still open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.is_resolved()
    }

    /// Check if this incident has critical severity.
    #[must_use]
    pub fn is_critical(&self) -> bool {
        is_critical_severity(&self.severity)
    }

    /// Return a copy of this incident with the patch applied.
    ///
    /// Identity, site, type and creation time are never touched.
    #[must_use]
    pub fn patched(&self, patch: IncidentPatch) -> Self {
        Self {
            status: patch.status.unwrap_or_else(|| self.status.clone()),
            severity: patch.severity.unwrap_or_else(|| self.severity.clone()),
            description: patch
                .description
                .unwrap_or_else(|| self.description.clone()),
            ..self.clone()
        }
    }
}

/// Fields accepted when creating a site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewSite {
    /// Display name (required, non-empty).
    pub name: String,
    /// City or free-form location.
    pub location: Option<String>,
    /// Name of the site manager.
    pub manager: Option<String>,
    /// Risk score; the registry default applies when absent.
    pub risk_score: Option<i32>,
    /// Open incident counter, defaults to 0.
    pub incidents_open: Option<u32>,
    /// Workers present today, defaults to 0.
    pub workers_present_today: Option<u32>,
    /// Workers expected today, defaults to 0.
    pub workers_expected_today: Option<u32>,
}

impl NewSite {
    /// Create a request for a site with only a name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Check the request shape.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the name is blank.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::invalid_input("name", "must not be empty"));
        }
        Ok(())
    }
}

/// Fields accepted when reporting an incident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIncident {
    /// The site the incident belongs to; must exist.
    pub site_id: SiteId,
    /// Type tag.
    #[serde(rename = "type")]
    pub kind: String,
    /// Severity tag.
    pub severity: String,
    /// What happened.
    pub description: String,
    /// Initial status; the registry default applies when absent.
    #[serde(default)]
    pub status: Option<String>,
}

impl NewIncident {
    /// Create a request with no explicit status.
    #[must_use]
    pub fn new(
        site_id: SiteId,
        kind: impl Into<String>,
        severity: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            site_id,
            kind: kind.into(),
            severity: severity.into(),
            description: description.into(),
            status: None,
        }
    }

    /// Set the initial status.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Check the request shape.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the type or severity tag is blank.
    pub fn validate(&self) -> Result<()> {
        if self.kind.trim().is_empty() {
            return Err(Error::invalid_input("type", "must not be empty"));
        }
        if self.severity.trim().is_empty() {
            return Err(Error::invalid_input("severity", "must not be empty"));
        }
        Ok(())
    }
}

/// Partial update of an incident.
///
/// A field that is absent (or `null` on the wire) leaves the stored value as
/// is; an explicit empty string is applied like any other value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncidentPatch {
    /// New status tag.
    pub status: Option<String>,
    /// New severity tag.
    pub severity: Option<String>,
    /// New description.
    pub description: Option<String>,
}

impl IncidentPatch {
    /// A patch that only changes the status.
    #[must_use]
    pub fn status(status: impl Into<String>) -> Self {
        Self {
            status: Some(status.into()),
            ..Self::default()
        }
    }

    /// Check if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.severity.is_none() && self.description.is_none()
    }
}
