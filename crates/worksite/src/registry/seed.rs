//! Demo data loaded into a fresh registry.
//!
//! The same three sites and three incidents are loaded on every start so the
//! dashboard has something to show.

use chrono::{DateTime, Utc};

use crate::record::{NewIncident, NewSite};

/// Creation time stamped on every seeded incident (2025-12-30T08:20:13Z).
const SEED_TIMESTAMP_SECS: i64 = 1_767_082_813;

const UNSPECIFIED_LOCATION: &str = "Localisation non précisée";
const UNSPECIFIED_MANAGER: &str = "Non renseigné";

/// Creation time of the seeded incidents.
#[must_use]
pub fn seed_timestamp() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(SEED_TIMESTAMP_SECS, 0).unwrap_or_default()
}

/// Demo sites, in insertion order (they receive ids 1, 2, 3).
#[must_use]
pub fn sites() -> Vec<NewSite> {
    [
        ("Immeuble Plateau A", 62),
        ("Chantier Zone Industrielle", 45),
        ("Résidence Riviera Golf", 80),
    ]
    .into_iter()
    .map(|(name, risk_score)| NewSite {
        location: Some(UNSPECIFIED_LOCATION.to_string()),
        manager: Some(UNSPECIFIED_MANAGER.to_string()),
        risk_score: Some(risk_score),
        ..NewSite::named(name)
    })
    .collect()
}

/// Demo incidents, in insertion order (they receive ids 1, 2, 3).
#[must_use]
pub fn incidents() -> Vec<NewIncident> {
    vec![
        NewIncident::new(1, "Vol", "Moyen", "Vol de ciment").with_status("Nouveau"),
        NewIncident::new(1, "Accident", "Critique", "Chute ouvrier").with_status("En cours"),
        NewIncident::new(2, "Intrusion", "Mineur", "Personne non autorisée")
            .with_status("Résolu"),
    ]
}
