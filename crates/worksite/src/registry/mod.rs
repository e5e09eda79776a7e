//! Registry layer for worksite.
//!
//! This module provides the in-memory store of sites and incidents, together
//! with the queries and mutations the API exposes over it.

pub mod seed;
pub mod stats;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::RegistryConfig;
use crate::error::{Error, Result};
use crate::record::{Incident, IncidentId, IncidentPatch, NewIncident, NewSite, Site, SiteId};

pub use stats::Stats;

/// Registry handle shared between request handlers.
///
/// Writers take the write lock for the whole operation, so id assignment,
/// timestamping and the append are seen by readers as one step.
pub type SharedRegistry = Arc<RwLock<Registry>>;

/// Values filled in when a creation request leaves a field out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryDefaults {
    /// Status given to incidents created without one.
    pub incident_status: String,
    /// Risk score given to sites created without one.
    pub risk_score: i32,
}

impl Default for RegistryDefaults {
    fn default() -> Self {
        Self {
            incident_status: "New".to_string(),
            risk_score: 50,
        }
    }
}

impl From<&RegistryConfig> for RegistryDefaults {
    fn from(config: &RegistryConfig) -> Self {
        Self {
            incident_status: config.default_incident_status.clone(),
            risk_score: config.default_risk_score,
        }
    }
}

/// In-memory store of sites and incidents.
///
/// Owns both collections and their identifier counters. Identifiers start at
/// 1, only ever grow, and are never reused.
#[derive(Debug)]
pub struct Registry {
    sites: Vec<Site>,
    incidents: Vec<Incident>,
    next_site_id: SiteId,
    next_incident_id: IncidentId,
    defaults: RegistryDefaults,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(RegistryDefaults::default())
    }
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new(defaults: RegistryDefaults) -> Self {
        Self {
            sites: Vec::new(),
            incidents: Vec::new(),
            next_site_id: 1,
            next_incident_id: 1,
            defaults,
        }
    }

    /// Create a registry preloaded with the demo sites and incidents.
    ///
    /// # Errors
    ///
    /// Returns an error if a seeded incident references a missing site,
    /// which would mean the seed data itself is inconsistent.
    pub fn with_seed_data(defaults: RegistryDefaults) -> Result<Self> {
        let mut registry = Self::new(defaults);

        for site in seed::sites() {
            registry.create_site(site);
        }
        let created_at = seed::seed_timestamp();
        for incident in seed::incidents() {
            registry.insert_incident(incident, created_at)?;
        }

        info!(
            "Registry seeded with {} sites and {} incidents",
            registry.site_count(),
            registry.incident_count()
        );
        Ok(registry)
    }

    /// Wrap this registry in a shared handle.
    #[must_use]
    pub fn into_shared(self) -> SharedRegistry {
        Arc::new(RwLock::new(self))
    }

    /// The defaults applied to creation requests.
    #[must_use]
    pub fn defaults(&self) -> &RegistryDefaults {
        &self.defaults
    }

    // === Sites ===

    /// All sites, in insertion order.
    #[must_use]
    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    /// Look up a site by id.
    #[must_use]
    pub fn site(&self, id: SiteId) -> Option<&Site> {
        self.sites.iter().find(|s| s.id == id)
    }

    /// Number of sites.
    #[must_use]
    pub fn site_count(&self) -> usize {
        self.sites.len()
    }

    /// Create a site and return it with its assigned id.
    pub fn create_site(&mut self, new: NewSite) -> Site {
        let site = Site {
            id: self.next_site_id,
            name: new.name,
            location: new.location,
            manager: new.manager,
            risk_score: new.risk_score.unwrap_or(self.defaults.risk_score),
            incidents_open: new.incidents_open.unwrap_or(0),
            workers_present_today: new.workers_present_today.unwrap_or(0),
            workers_expected_today: new.workers_expected_today.unwrap_or(0),
        };
        self.next_site_id += 1;

        info!("Created site {} ({})", site.id, site.name);
        self.sites.push(site.clone());
        site
    }

    // === Incidents ===

    /// Incidents in insertion order, optionally restricted to one site.
    #[must_use]
    pub fn incidents(&self, site_id: Option<SiteId>) -> Vec<Incident> {
        self.incidents
            .iter()
            .filter(|i| site_id.map_or(true, |id| i.site_id == id))
            .cloned()
            .collect()
    }

    /// Incidents whose status is not a resolved spelling, in insertion order.
    #[must_use]
    pub fn open_incidents(&self) -> Vec<Incident> {
        self.incidents
            .iter()
            .filter(|i| i.is_open())
            .cloned()
            .collect()
    }

    /// Look up an incident by id.
    #[must_use]
    pub fn incident(&self, id: IncidentId) -> Option<&Incident> {
        self.incidents.iter().find(|i| i.id == id)
    }

    /// Number of incidents.
    #[must_use]
    pub fn incident_count(&self) -> usize {
        self.incidents.len()
    }

    /// Report an incident, stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownSite`] if `site_id` does not match a site.
    /// Nothing is stored in that case.
    pub fn create_incident(&mut self, new: NewIncident) -> Result<Incident> {
        self.insert_incident(new, Utc::now())
    }

    fn insert_incident(&mut self, new: NewIncident, created_at: DateTime<Utc>) -> Result<Incident> {
        if self.site(new.site_id).is_none() {
            warn!("Rejected incident for unknown site {}", new.site_id);
            return Err(Error::UnknownSite {
                site_id: new.site_id,
            });
        }

        let incident = Incident {
            id: self.next_incident_id,
            site_id: new.site_id,
            kind: new.kind,
            severity: new.severity,
            description: new.description,
            status: new
                .status
                .unwrap_or_else(|| self.defaults.incident_status.clone()),
            created_at,
        };
        self.next_incident_id += 1;

        info!(
            "Created incident {} on site {} ({}, {})",
            incident.id, incident.site_id, incident.kind, incident.severity
        );
        self.incidents.push(incident.clone());
        Ok(incident)
    }

    /// Apply a partial update to an incident and return the new record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncidentNotFound`] if no incident has this id.
    /// Nothing is changed in that case.
    pub fn update_incident(&mut self, id: IncidentId, patch: IncidentPatch) -> Result<Incident> {
        let Some(slot) = self.incidents.iter_mut().find(|i| i.id == id) else {
            warn!("Rejected update for unknown incident {}", id);
            return Err(Error::IncidentNotFound { incident_id: id });
        };

        if patch.is_empty() {
            debug!("Empty patch for incident {}", id);
        }
        let updated = slot.patched(patch);
        *slot = updated.clone();

        info!("Updated incident {} (status {})", updated.id, updated.status);
        Ok(updated)
    }

    // === Statistics ===

    /// Aggregate statistics over the current collections.
    #[must_use]
    pub fn stats(&self) -> Stats {
        Stats::compute(&self.sites, &self.incidents)
    }
}
