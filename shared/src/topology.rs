use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Topology as published upstream: a shared arc pool plus named objects
/// whose geometries reference arcs by index. Quantized files carry a
/// transform and delta-encoded arcs; pre-projected files carry absolute
/// coordinates and no transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub transform: Option<Transform>,
    pub arcs: Vec<Vec<[f64; 2]>>,
    pub objects: HashMap<String, TopoObject>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TopoObject {
    GeometryCollection {
        geometries: Vec<TopoObject>,
    },
    Polygon {
        #[serde(default)]
        id: Option<GeometryId>,
        arcs: Vec<Vec<i32>>,
    },
    MultiPolygon {
        #[serde(default)]
        id: Option<GeometryId>,
        arcs: Vec<Vec<Vec<i32>>>,
    },
}

/// Geometry ids in the wild are numbers (counties) or strings (nation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GeometryId {
    Num(u32),
    Str(String),
}

impl GeometryId {
    pub fn as_fips(&self) -> Option<u32> {
        match self {
            GeometryId::Num(n) => Some(*n),
            GeometryId::Str(s) => s.parse().ok(),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum TopologyError {
    #[error("topology object not found: {0}")]
    MissingObject(String),
    #[error("arc index out of range: {0}")]
    ArcIndex(i32),
}

/// A county ready to draw: FIPS id plus SVG path data in plane coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountyShape {
    pub id: u32,
    pub path: String,
}

/// Convert the `counties` object into standalone per-county SVG paths.
///
/// Geometries without a numeric id (the upstream nation outline has none)
/// are skipped rather than treated as errors.
pub fn county_shapes(topology: &Topology) -> Result<Vec<CountyShape>, TopologyError> {
    let object = topology
        .objects
        .get("counties")
        .ok_or_else(|| TopologyError::MissingObject("counties".into()))?;
    let arcs = decode_arcs(topology);
    let mut shapes = Vec::new();
    collect_shapes(object, &arcs, &mut shapes)?;
    Ok(shapes)
}

fn collect_shapes(
    object: &TopoObject,
    arcs: &[Vec<(f64, f64)>],
    out: &mut Vec<CountyShape>,
) -> Result<(), TopologyError> {
    match object {
        TopoObject::GeometryCollection { geometries } => {
            for geometry in geometries {
                collect_shapes(geometry, arcs, out)?;
            }
        }
        TopoObject::Polygon { id, arcs: rings } => {
            if let Some(fips) = id.as_ref().and_then(GeometryId::as_fips) {
                let path = polygon_path(rings, arcs)?;
                out.push(CountyShape { id: fips, path });
            }
        }
        TopoObject::MultiPolygon { id, arcs: polygons } => {
            if let Some(fips) = id.as_ref().and_then(GeometryId::as_fips) {
                let mut path = String::new();
                for rings in polygons {
                    path.push_str(&polygon_path(rings, arcs)?);
                }
                out.push(CountyShape { id: fips, path });
            }
        }
    }
    Ok(())
}

fn decode_arcs(topology: &Topology) -> Vec<Vec<(f64, f64)>> {
    topology
        .arcs
        .iter()
        .map(|arc| decode_arc(arc, topology.transform.as_ref()))
        .collect()
}

/// Delta-decode one arc when a transform is present, otherwise take the
/// positions as absolute.
fn decode_arc(arc: &[[f64; 2]], transform: Option<&Transform>) -> Vec<(f64, f64)> {
    match transform {
        Some(t) => {
            let mut x = 0.0;
            let mut y = 0.0;
            arc.iter()
                .map(|position| {
                    x += position[0];
                    y += position[1];
                    (
                        x * t.scale[0] + t.translate[0],
                        y * t.scale[1] + t.translate[1],
                    )
                })
                .collect()
        }
        None => arc.iter().map(|p| (p[0], p[1])).collect(),
    }
}

/// Stitch a ring from arc references. Index `i >= 0` is arc `i` forward;
/// `i < 0` is arc `-1 - i` reversed. Consecutive arcs repeat the junction
/// point, so the accumulated ring drops its last point before each append.
fn ring_points(
    arc_refs: &[i32],
    arcs: &[Vec<(f64, f64)>],
) -> Result<Vec<(f64, f64)>, TopologyError> {
    let mut ring: Vec<(f64, f64)> = Vec::new();
    for &index in arc_refs {
        let arc_index = if index < 0 {
            (-1 - index) as usize
        } else {
            index as usize
        };
        let arc = arcs.get(arc_index).ok_or(TopologyError::ArcIndex(index))?;
        let mut points = arc.clone();
        if index < 0 {
            points.reverse();
        }
        if !ring.is_empty() {
            ring.pop();
        }
        ring.extend(points);
    }
    Ok(ring)
}

fn polygon_path(rings: &[Vec<i32>], arcs: &[Vec<(f64, f64)>]) -> Result<String, TopologyError> {
    let mut path = String::new();
    for ring in rings {
        let points = ring_points(ring, arcs)?;
        if points.is_empty() {
            continue;
        }
        path.push_str(&ring_path(&points));
    }
    Ok(path)
}

/// One `M … L … Z` subpath. Stitched rings repeat their first point at the
/// end; the duplicate is dropped and `Z` closes the subpath instead.
fn ring_path(ring: &[(f64, f64)]) -> String {
    let mut points = ring;
    if points.len() > 1 && points.first() == points.last() {
        points = &points[..points.len() - 1];
    }
    let mut path = String::new();
    for (i, &(x, y)) in points.iter().enumerate() {
        let command = if i == 0 { 'M' } else { 'L' };
        path.push_str(&format!("{}{},{}", command, round3(x), round3(y)));
    }
    path.push('Z');
    path
}

/// Round to 3 decimal places; the value then prints in shortest form
/// (`25` rather than `25.0`).
fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}
