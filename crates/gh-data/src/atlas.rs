//! World atlas geometry for the country map.
//!
//! Country outlines come from a public GeoJSON feature collection. Each
//! feature carries a `name` property and either a Polygon or MultiPolygon
//! geometry; anything else is skipped with a warning.

use geo::Contains;
use geo_types::{MultiPolygon, Point};
use geojson::{FeatureCollection, GeoJson};

use crate::config::ApiConfig;
use crate::DataError;

/// One country's outline, keyed by the atlas spelling of its name.
pub struct CountryShape {
    pub name: String,
    pub geometry: MultiPolygon<f64>,
}

impl CountryShape {
    /// Outer rings as (lon, lat) sequences, for painting.
    pub fn rings(&self) -> impl Iterator<Item = Vec<(f64, f64)>> + '_ {
        self.geometry
            .iter()
            .map(|polygon| polygon.exterior().points().map(|p| (p.x(), p.y())).collect())
    }
}

/// All country outlines, plus point-in-country lookup for map clicks.
pub struct WorldAtlas {
    pub countries: Vec<CountryShape>,
}

impl WorldAtlas {
    /// Download and parse the atlas from the configured URL.
    pub async fn fetch(config: &ApiConfig) -> Result<Self, DataError> {
        tracing::debug!(url = %config.atlas_url, "requesting world atlas");
        let response = reqwest::get(&config.atlas_url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DataError::Status(status.as_u16()));
        }
        let body = response.text().await?;
        let atlas = Self::from_geojson_str(&body)?;
        tracing::info!(countries = atlas.countries.len(), "world atlas loaded");
        Ok(atlas)
    }

    pub fn from_geojson_str(raw: &str) -> Result<Self, DataError> {
        let geojson: GeoJson = raw
            .parse()
            .map_err(|e: geojson::Error| DataError::Atlas(e.to_string()))?;
        let collection = FeatureCollection::try_from(geojson)
            .map_err(|e| DataError::Atlas(e.to_string()))?;

        let mut countries = Vec::with_capacity(collection.features.len());
        for feature in collection.features {
            let Some(name) = feature
                .property("name")
                .and_then(|v| v.as_str())
                .map(str::to_string)
            else {
                tracing::warn!("atlas feature without a name property, skipping");
                continue;
            };
            let Some(geometry) = feature.geometry else {
                tracing::warn!(country = %name, "atlas feature without geometry, skipping");
                continue;
            };

            let geometry: MultiPolygon<f64> = match geo_types::Geometry::try_from(geometry) {
                Ok(geo_types::Geometry::Polygon(p)) => MultiPolygon(vec![p]),
                Ok(geo_types::Geometry::MultiPolygon(mp)) => mp,
                Ok(_) => {
                    tracing::warn!(country = %name, "unsupported atlas geometry, skipping");
                    continue;
                }
                Err(e) => {
                    tracing::warn!(country = %name, error = %e, "bad atlas geometry, skipping");
                    continue;
                }
            };

            countries.push(CountryShape { name, geometry });
        }

        if countries.is_empty() {
            return Err(DataError::Atlas("no usable country features".to_string()));
        }
        Ok(Self { countries })
    }

    /// Name of the country containing the given (lon, lat) point, if any.
    pub fn locate(&self, lon: f64, lat: f64) -> Option<&str> {
        let point = Point::new(lon, lat);
        self.countries
            .iter()
            .find(|c| c.geometry.contains(&point))
            .map(|c| c.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Two unit squares: "Eastland" at lon 0..1 and "Westland" at lon 2..3.
    const TINY_ATLAS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "name": "Eastland" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]
                }
            },
            {
                "type": "Feature",
                "properties": { "name": "Westland" },
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [[[[2,0],[3,0],[3,1],[2,1],[2,0]]]]
                }
            },
            {
                "type": "Feature",
                "properties": {},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[5,5],[6,5],[6,6],[5,6],[5,5]]]
                }
            }
        ]
    }"#;

    #[test]
    fn parses_polygons_and_multipolygons() {
        let atlas = WorldAtlas::from_geojson_str(TINY_ATLAS).unwrap();
        // The nameless feature is dropped.
        assert_eq!(atlas.countries.len(), 2);
        assert_eq!(atlas.countries[0].name, "Eastland");
        assert_eq!(atlas.countries[0].rings().count(), 1);
    }

    #[test]
    fn locate_hits_the_right_country() {
        let atlas = WorldAtlas::from_geojson_str(TINY_ATLAS).unwrap();
        assert_eq!(atlas.locate(0.5, 0.5), Some("Eastland"));
        assert_eq!(atlas.locate(2.5, 0.5), Some("Westland"));
        assert_eq!(atlas.locate(10.0, 10.0), None);
    }

    #[test]
    fn rejects_garbage() {
        assert!(WorldAtlas::from_geojson_str("not geojson").is_err());
        assert!(WorldAtlas::from_geojson_str(r#"{"type":"FeatureCollection","features":[]}"#).is_err());
    }
}
