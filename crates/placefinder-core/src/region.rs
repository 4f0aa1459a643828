//! Bounding regions materialized around the user's location, one per [`Scope`].

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::geo::GeoPoint;
use crate::scope::Scope;

/// Kilometres per degree used by the flat bounding-box approximation.
pub const KM_PER_DEGREE: f64 = 111.0;

/// Regions at or above this radius use [`METRO_REGION_BOUNDS`] instead of a
/// box derived from their center.
pub const FIXED_BOUNDS_MIN_RADIUS_KM: f64 = 200.0;

/// Mumbai Metropolitan Region box.
pub const METRO_REGION_BOUNDS: Bounds = Bounds {
    north: 19.5,
    south: 18.5,
    east: 73.5,
    west: 72.5,
};

/// A `(north, south, east, west)` box in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl Bounds {
    #[must_use]
    pub fn contains(&self, point: GeoPoint) -> bool {
        (self.south..=self.north).contains(&point.latitude)
            && (self.west..=self.east).contains(&point.longitude)
    }

    #[must_use]
    pub const fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.north, self.south, self.east, self.west)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Region {
    pub center_lat: f64,
    pub center_lon: f64,
    pub radius_km: f64,
    pub name: String,
}

impl Region {
    #[must_use]
    pub fn new(center: GeoPoint, radius_km: f64, name: impl Into<String>) -> Self {
        Self {
            center_lat: center.latitude,
            center_lon: center.longitude,
            radius_km,
            name: name.into(),
        }
    }

    #[must_use]
    pub const fn center(&self) -> GeoPoint {
        GeoPoint::new(self.center_lat, self.center_lon)
    }

    /// Degree box for this region.
    ///
    /// Radii of [`FIXED_BOUNDS_MIN_RADIUS_KM`] and above always return
    /// [`METRO_REGION_BOUNDS`]; smaller radii extend `radius_km / 111` degrees
    /// from the center in each direction.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        if self.radius_km >= FIXED_BOUNDS_MIN_RADIUS_KM {
            return METRO_REGION_BOUNDS;
        }

        let delta = self.radius_km / KM_PER_DEGREE;
        Bounds {
            north: self.center_lat + delta,
            south: self.center_lat - delta,
            east: self.center_lon + delta,
            west: self.center_lon - delta,
        }
    }

    /// Global range check plus this region's bounds.
    #[must_use]
    pub fn accepts(&self, point: GeoPoint) -> bool {
        point.is_on_globe() && self.bounds().contains(point)
    }
}

/// Radius in kilometres for each scope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScopeRadii {
    pub nearby_km: f64,
    pub local_km: f64,
    pub city_km: f64,
    pub metro_km: f64,
    pub region_km: f64,
}

impl Default for ScopeRadii {
    fn default() -> Self {
        Self {
            nearby_km: 5.0,
            local_km: 15.0,
            city_km: 30.0,
            metro_km: 50.0,
            region_km: 200.0,
        }
    }
}

impl ScopeRadii {
    #[must_use]
    pub const fn radius_for(&self, scope: Scope) -> f64 {
        match scope {
            Scope::Nearby => self.nearby_km,
            Scope::Local => self.local_km,
            Scope::City => self.city_km,
            Scope::Metro => self.metro_km,
            Scope::Region => self.region_km,
        }
    }
}

const fn display_name(scope: Scope) -> &'static str {
    match scope {
        Scope::Nearby => "Nearby Area",
        Scope::Local => "Local Area",
        Scope::City => "City Area",
        Scope::Metro => "Metropolitan Area",
        Scope::Region => "Mumbai Metropolitan Region",
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("regions not initialized; call initialize first")]
    Uninitialized,
}

/// Per-request map from [`Scope`] to [`Region`].
///
/// Empty until [`RegionCatalog::initialize`] is called with the user's location.
#[derive(Debug, Clone, Default)]
pub struct RegionCatalog {
    radii: ScopeRadii,
    regions: HashMap<Scope, Region>,
}

impl RegionCatalog {
    #[must_use]
    pub fn new(radii: ScopeRadii) -> Self {
        Self {
            radii,
            regions: HashMap::new(),
        }
    }

    /// Builds one region per scope around `(center_lat, center_lon)`,
    /// replacing any previous set.
    pub fn initialize(&mut self, center_lat: f64, center_lon: f64) -> &HashMap<Scope, Region> {
        let center = GeoPoint::new(center_lat, center_lon);
        tracing::debug!(%center, "initializing search regions");

        self.regions = Scope::ALL
            .into_iter()
            .map(|scope| {
                let region = Region::new(center, self.radii.radius_for(scope), display_name(scope));
                tracing::trace!(
                    scope = %scope,
                    radius_km = region.radius_km,
                    "region initialized"
                );
                (scope, region)
            })
            .collect();

        &self.regions
    }

    /// Returns the region for `scope`, falling back to the local region when
    /// the scope has no entry.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Uninitialized`] if [`RegionCatalog::initialize`]
    /// has not been called.
    pub fn lookup(&self, scope: Scope) -> Result<&Region, CatalogError> {
        if self.regions.is_empty() {
            return Err(CatalogError::Uninitialized);
        }

        if let Some(region) = self.regions.get(&scope) {
            return Ok(region);
        }

        tracing::warn!(scope = %scope, "no region for scope, falling back to local");
        self.regions
            .get(&Scope::Local)
            .ok_or(CatalogError::Uninitialized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    fn initialized(lat: f64, lon: f64) -> RegionCatalog {
        let mut catalog = RegionCatalog::new(ScopeRadii::default());
        catalog.initialize(lat, lon);
        catalog
    }

    #[test]
    fn lookup_before_initialize_fails() {
        let catalog = RegionCatalog::new(ScopeRadii::default());
        assert_eq!(
            catalog.lookup(Scope::City).unwrap_err(),
            CatalogError::Uninitialized
        );
    }

    #[test]
    fn initialize_builds_five_regions_with_fixed_radii() {
        let mut catalog = RegionCatalog::new(ScopeRadii::default());
        let regions = catalog.initialize(19.0549, 72.8258);
        assert_eq!(regions.len(), 5);

        let expected = [
            (Scope::Nearby, 5.0, "Nearby Area"),
            (Scope::Local, 15.0, "Local Area"),
            (Scope::City, 30.0, "City Area"),
            (Scope::Metro, 50.0, "Metropolitan Area"),
            (Scope::Region, 200.0, "Mumbai Metropolitan Region"),
        ];
        for (scope, radius, name) in expected {
            let region = &regions[&scope];
            assert!(close(region.radius_km, radius), "{scope} radius");
            assert_eq!(region.name, name);
            assert!(close(region.center_lat, 19.0549));
            assert!(close(region.center_lon, 72.8258));
        }
    }

    #[test]
    fn region_scope_bounds_are_fixed_regardless_of_center() {
        for (lat, lon) in [(19.0549, 72.8258), (0.0, 0.0), (-33.9, 151.2)] {
            let catalog = initialized(lat, lon);
            let bounds = catalog.lookup(Scope::Region).expect("region").bounds();
            assert_eq!(bounds.as_tuple(), (19.5, 18.5, 73.5, 72.5));
        }
    }

    #[test]
    fn smaller_scopes_derive_bounds_from_radius() {
        let (lat, lon) = (19.0549, 72.8258);
        let catalog = initialized(lat, lon);
        for scope in [Scope::Nearby, Scope::Local, Scope::City, Scope::Metro] {
            let region = catalog.lookup(scope).expect("region");
            let d = region.radius_km / 111.0;
            let b = region.bounds();
            assert!(close(b.north, lat + d), "{scope} north");
            assert!(close(b.south, lat - d), "{scope} south");
            assert!(close(b.east, lon + d), "{scope} east");
            assert!(close(b.west, lon - d), "{scope} west");
        }
    }

    #[test]
    fn lookup_falls_back_to_local_when_scope_missing() {
        let mut catalog = initialized(19.0, 72.8);
        catalog.regions.remove(&Scope::City);
        let region = catalog.lookup(Scope::City).expect("fallback");
        assert_eq!(region.name, "Local Area");
    }

    #[test]
    fn reinitialize_replaces_center() {
        let mut catalog = initialized(19.0, 72.8);
        catalog.initialize(18.9, 72.9);
        let region = catalog.lookup(Scope::Local).expect("region");
        assert!(close(region.center_lat, 18.9));
    }

    #[test]
    fn custom_radii_are_respected() {
        let mut catalog = RegionCatalog::new(ScopeRadii {
            nearby_km: 1.0,
            ..ScopeRadii::default()
        });
        catalog.initialize(19.0, 72.8);
        let region = catalog.lookup(Scope::Nearby).expect("region");
        assert!(close(region.radius_km, 1.0));
    }

    #[test]
    fn accepts_checks_globe_and_bounds() {
        let catalog = initialized(19.1, 72.83);
        let nearby = catalog.lookup(Scope::Nearby).expect("region");
        assert!(nearby.accepts(GeoPoint::new(19.10, 72.83)));
        assert!(!nearby.accepts(GeoPoint::new(0.0, 0.0)));

        let metro_region = catalog.lookup(Scope::Region).expect("region");
        assert!(metro_region.accepts(GeoPoint::new(18.5, 73.5)));
        assert!(!metro_region.accepts(GeoPoint::new(0.0, 0.0)));
    }
}
