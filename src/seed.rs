/// Demo data registry for development mode.
///
/// When no live database is configured, the service runs against a
/// `MemoryStore` seeded from this registry: one demo organization, a
/// handful of water sources with plausible initial readings, and users
/// with registered push tokens. This is the single source of truth for
/// the demo fixture — tests and the dev binary both load it from here.

use crate::model::StoreError;
use crate::risk::calculate_risk;
use crate::store::memory::MemoryStore;
use crate::store::RiskStore;

pub const DEMO_ORGANIZATION_ID: i32 = 1;

/// Initial state of one demo water source.
pub struct DemoSource {
    pub name: &'static str,
    /// WGS84 latitude.
    pub latitude: f64,
    /// WGS84 longitude.
    pub longitude: f64,
    /// Initial rainfall reading, mm.
    pub rainfall: f64,
    /// Initial water level reading, m.
    pub water_level: f64,
}

/// Demo sources, spanning the risk spectrum so every pipeline branch is
/// exercised: a healthy source, a rainfall-stressed one, and one breaching
/// both thresholds.
pub static DEMO_SOURCES: &[DemoSource] = &[
    DemoSource {
        name: "Lake Victoria Intake",
        latitude: -0.4167,
        longitude: 33.2000,
        rainfall: 82.0,
        water_level: 34.5,
    },
    DemoSource {
        name: "Nakuru Borehole 7",
        latitude: -0.3031,
        longitude: 36.0800,
        rainfall: 42.0,
        water_level: 26.0,
    },
    DemoSource {
        name: "Turkana Shallow Well",
        latitude: 3.1167,
        longitude: 35.6000,
        rainfall: 8.5,
        water_level: 4.2,
    },
];

/// Demo users: (push token, notifications enabled).
pub static DEMO_USERS: &[(Option<&str>, bool)] = &[
    (Some("ExponentPushToken[demo-admin]"), true),
    (Some("ExponentPushToken[demo-analyst]"), false),
    (None, true),
];

/// Load the demo registry into a fresh in-memory store, including one
/// initial history row per source so trend analysis has a starting point.
pub fn load_demo(store: &mut MemoryStore) -> Result<(), StoreError> {
    for demo in DEMO_SOURCES {
        let id = store.add_source(
            demo.name,
            demo.latitude,
            demo.longitude,
            Some(demo.rainfall),
            Some(demo.water_level),
            DEMO_ORGANIZATION_ID,
        );
        let initial_risk = calculate_risk(demo.rainfall, demo.water_level);
        store.append_history(id, DEMO_ORGANIZATION_ID, initial_risk)?;
    }

    for (token, enabled) in DEMO_USERS {
        store.add_user(DEMO_ORGANIZATION_ID, *token, *enabled);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_spans_the_risk_spectrum() {
        let risks: Vec<i32> = DEMO_SOURCES
            .iter()
            .map(|s| calculate_risk(s.rainfall, s.water_level))
            .collect();
        assert!(risks.contains(&0), "demo needs a healthy source");
        assert!(risks.contains(&100), "demo needs a source breaching both thresholds");
    }

    #[test]
    fn test_load_demo_seeds_sources_history_and_users() {
        let mut store = MemoryStore::new();
        load_demo(&mut store).unwrap();

        let sources = store.get_all_sources().unwrap();
        assert_eq!(sources.len(), DEMO_SOURCES.len());
        for source in &sources {
            assert_eq!(
                store.full_history(source.id).unwrap().len(),
                1,
                "each source starts with one history row"
            );
        }

        // Exactly one demo user is notifiable (token present and enabled).
        let recipients = store.notification_recipients(DEMO_ORGANIZATION_ID).unwrap();
        assert_eq!(recipients.len(), 1);
    }
}
