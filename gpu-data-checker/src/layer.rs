//! Couche source lue depuis un fichier GeoJSON

use std::path::Path;

use anyhow::{bail, Context, Result};
use geojson::feature::Id;
use geojson::{GeoJson, JsonObject, JsonValue};
use gpu_check::{Crs, Feature, FeatureSource, Fid};
use tracing::{debug, warn};

use crate::reproject_lite::Reprojector;

/// Feature source avec ses attributs d'origine
#[derive(Debug, Clone)]
pub struct LayerRecord {
    pub feature: Feature,
    /// Identifiant GeoJSON d'origine
    pub id: Option<Id>,
    pub properties: JsonObject,
}

/// Couche GeoJSON chargée en mémoire
///
/// Les features sont conservées pour que chaque règle puisse refaire un parcours complet.
#[derive(Debug, Clone)]
pub struct GeoJsonLayer {
    name: String,
    crs: Crs,
    records: Vec<LayerRecord>,
}

impl GeoJsonLayer {
    /// Charge un fichier GeoJSON ; le nom de la couche est le nom du fichier sans extension
    pub fn open(path: &Path, fid_field: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read layer: {}", path.display()))?;
        let geojson: GeoJson = content
            .parse()
            .context(format!("Failed to parse GeoJSON: {}", path.display()))?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "layer".to_string());

        Self::from_geojson(name, geojson, fid_field)
    }

    pub fn from_geojson(name: impl Into<String>, geojson: GeoJson, fid_field: &str) -> Result<Self> {
        let name = name.into();
        let GeoJson::FeatureCollection(collection) = geojson else {
            bail!("Layer {} is not a FeatureCollection", name);
        };

        let crs = match collection
            .foreign_members
            .as_ref()
            .and_then(|members| members.get("crs"))
        {
            Some(member) => crs_from_member(member)?,
            None => Crs::WGS84,
        };

        let mut records = Vec::with_capacity(collection.features.len());
        for (index, feature) in collection.features.into_iter().enumerate() {
            let properties = feature.properties.unwrap_or_default();
            let fid = properties
                .get(fid_field)
                .and_then(value_as_fid)
                .or_else(|| feature.id.as_ref().and_then(id_as_fid))
                .unwrap_or(index as Fid + 1);

            let geometry = match feature.geometry {
                Some(geometry) => match geo::Geometry::<f64>::try_from(geometry) {
                    Ok(geometry) => Some(geometry),
                    Err(e) => {
                        warn!(layer = %name, fid, error = %e, "Unreadable geometry, treated as null");
                        None
                    }
                },
                None => None,
            };

            records.push(LayerRecord {
                feature: Feature { fid, geometry },
                id: feature.id,
                properties,
            });
        }

        debug!(layer = %name, crs = %crs, features = records.len(), "Layer loaded");

        Ok(Self { name, crs, records })
    }

    /// Remplace la projection déclarée (couche sans membre `crs`)
    pub fn with_crs(mut self, crs: Crs) -> Self {
        self.crs = crs;
        self
    }

    pub fn records(&self) -> &[LayerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Copie de la couche en EPSG:4326, nommée `<couche>_4326`
    pub fn reprojected(&self, reprojector: &Reprojector) -> Result<Self> {
        let records = self
            .records
            .iter()
            .map(|record| {
                let geometry = record
                    .feature
                    .geometry
                    .as_ref()
                    .map(|g| reprojector.transform_geometry(g))
                    .transpose()
                    .with_context(|| format!("Failed to reproject feature {}", record.feature.fid))?;
                Ok(LayerRecord {
                    feature: Feature {
                        fid: record.feature.fid,
                        geometry,
                    },
                    id: record.id.clone(),
                    properties: record.properties.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: format!("{}_4326", self.name),
            crs: Crs::WGS84,
            records,
        })
    }
}

impl FeatureSource for GeoJsonLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn crs(&self) -> Crs {
        self.crs
    }

    fn feature_count(&self) -> usize {
        self.records.len()
    }

    fn features(&self) -> Box<dyn Iterator<Item = Feature> + '_> {
        Box::new(self.records.iter().map(|r| r.feature.clone()))
    }
}

/// Membre `crs` historique : `{"type": "name", "properties": {"name": "..."}}`
fn crs_from_member(member: &JsonValue) -> Result<Crs> {
    let Some(name) = member
        .get("properties")
        .and_then(|p| p.get("name"))
        .and_then(JsonValue::as_str)
    else {
        bail!("Unsupported crs member: {}", member);
    };
    parse_crs(name).with_context(|| format!("Unknown CRS name: {}", name))
}

/// Interprète un nom de CRS : `EPSG:2154`, `urn:ogc:def:crs:EPSG::2154`, `urn:ogc:def:crs:OGC:1.3:CRS84`
pub fn parse_crs(name: &str) -> Option<Crs> {
    let name = name.trim();
    if name.ends_with("CRS84") {
        return Some(Crs::WGS84);
    }
    if !name.to_ascii_uppercase().contains("EPSG") {
        return None;
    }
    name.rsplit(':')
        .next()
        .and_then(|code| code.trim().parse::<u32>().ok())
        .map(Crs::from_epsg)
}

fn value_as_fid(value: &JsonValue) -> Option<Fid> {
    match value {
        JsonValue::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as Fid)),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn id_as_fid(id: &Id) -> Option<Fid> {
    match id {
        Id::Number(n) => n.as_i64(),
        Id::String(s) => s.trim().parse().ok(),
    }
}
