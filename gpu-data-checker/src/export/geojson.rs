//! Export GeoJSON avec geozero (écriture en flux)

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use geo::Geometry;
use geojson::feature::Id;
use geojson::JsonValue;
use geozero::geojson::GeoJsonWriter;
use geozero::GeozeroGeometry;
use gpu_check::{Crs, FeatureSource, Finding, ResultSet};
use serde_json::json;

use crate::layer::GeoJsonLayer;

/// Écrit la couche d'erreurs : points en EPSG:4326, attributs `fid, level, type, message`
pub fn export_error_layer(result: &ResultSet, output_path: &Path) -> Result<()> {
    write_collection(output_path, result.name(), result.crs(), |writer| {
        for (i, finding) in result.iter().enumerate() {
            if i > 0 {
                write!(writer, ",")?;
            }
            write_finding(writer, finding)?;
        }
        Ok(())
    })
}

/// Écrit une couche source (attributs et identifiants d'origine conservés)
pub fn export_layer(layer: &GeoJsonLayer, output_path: &Path) -> Result<()> {
    write_collection(output_path, layer.name(), layer.crs(), |writer| {
        for (i, record) in layer.records().iter().enumerate() {
            if i > 0 {
                write!(writer, ",")?;
            }
            write!(writer, r#"{{"type":"Feature","#)?;
            if let Some(id) = &record.id {
                let id = match id {
                    Id::String(s) => JsonValue::String(s.clone()),
                    Id::Number(n) => JsonValue::Number(n.clone()),
                };
                write!(writer, r#""id":{},"#, id)?;
            }
            write!(writer, r#""geometry":"#)?;
            write_geometry(writer, record.feature.geometry.as_ref())?;
            write!(writer, r#","properties":"#)?;
            serde_json::to_writer(&mut *writer, &record.properties)?;
            write!(writer, "}}")?;
        }
        Ok(())
    })
}

/// En-tête et pied de FeatureCollection autour des features écrites par `body`
fn write_collection<F>(output_path: &Path, name: &str, crs: Crs, body: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let file = File::create(output_path)
        .context(format!("Failed to create file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);

    write!(
        writer,
        r#"{{"type":"FeatureCollection","name":{},"crs":{{"type":"name","properties":{{"name":"urn:ogc:def:crs:EPSG::{}"}}}},"features":["#,
        JsonValue::String(name.to_string()),
        crs.epsg()
    )?;
    body(&mut writer)?;
    write!(writer, "]}}")?;
    writer.flush()?;

    Ok(())
}

fn write_finding<W: Write>(writer: &mut W, finding: &Finding) -> Result<()> {
    write!(writer, r#"{{"type":"Feature","geometry":"#)?;
    write_geometry(writer, Some(&Geometry::Point(finding.location)))?;
    let properties = json!({
        "fid": finding.fid,
        "level": finding.level.as_str(),
        "type": finding.category.as_str(),
        "message": finding.message,
    });
    write!(writer, r#","properties":{}}}"#, properties)?;
    Ok(())
}

/// Géométrie via geozero, `null` si absente
fn write_geometry<W: Write>(writer: &mut W, geometry: Option<&Geometry>) -> Result<()> {
    match geometry {
        Some(geometry) => {
            let mut buf = Vec::new();
            let mut geom_writer = GeoJsonWriter::new(&mut buf);
            geometry.process_geom(&mut geom_writer)?;
            writer.write_all(&buf)?;
        }
        None => write!(writer, "null")?,
    }
    Ok(())
}
