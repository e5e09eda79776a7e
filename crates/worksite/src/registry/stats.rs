//! Aggregate statistics over the registry.

use serde::{Deserialize, Serialize};

use crate::record::{Incident, Site};

/// Dashboard summary figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Number of sites.
    pub total_sites: usize,
    /// Number of incidents.
    pub total_incidents: usize,
    /// Share of resolved incidents, as a whole percentage.
    pub resolved_percentage: u32,
    /// Number of incidents with critical severity.
    pub critical_incidents: usize,
}

impl Stats {
    /// Compute statistics over the given collections.
    #[must_use]
    pub fn compute(sites: &[Site], incidents: &[Incident]) -> Self {
        let resolved = incidents.iter().filter(|i| i.is_resolved()).count();
        let critical_incidents = incidents.iter().filter(|i| i.is_critical()).count();

        Self {
            total_sites: sites.len(),
            total_incidents: incidents.len(),
            resolved_percentage: percentage(resolved, incidents.len()),
            critical_incidents,
        }
    }
}

/// `100 * part / whole`, rounded half to even. Zero when `whole` is zero.
#[must_use]
pub fn percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }

    let scaled = part * 100;
    let quotient = scaled / whole;
    let twice_remainder = 2 * (scaled % whole);

    let rounded = if twice_remainder > whole || (twice_remainder == whole && quotient % 2 == 1) {
        quotient + 1
    } else {
        quotient
    };

    u32::try_from(rounded).unwrap_or(u32::MAX)
}
