//! Shading geometry types.
//!
//! Two families of shading are modeled:
//! - distant (environment) shading: the ground plane around the building is
//!   divided into azimuth segments, each carrying obstacles and overhangs
//!   with a height and a distance from the building;
//! - window-local shading: overhangs, side fins and reveals attached to a
//!   transparent element. A reveal is geometrically equivalent to an
//!   overhang plus a side fin on each side, all with the reveal's depth and
//!   distance, and is expanded that way before factor calculation.

use ds_core::Real;
use serde::{Deserialize, Serialize};

/// Kind of a distant shading object within a segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShadingObjectKind {
    Obstacle,
    Overhang,
}

/// A distant shading object: something in the environment that can block the
/// solar beam for surfaces facing its segment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShadingObject {
    pub kind: ShadingObjectKind,
    /// Height of the obstacle top (or lowest overhang edge), m.
    pub height: Real,
    /// Horizontal distance from the building, m.
    pub distance: Real,
}

/// One azimuth segment of the surrounding ground plane.
///
/// Segments run clockwise: `start` is the larger azimuth, `end` the smaller,
/// and consecutive segments must share their boundary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShadingSegment {
    /// Start azimuth, degrees from south (eastwards positive).
    pub start: Real,
    /// End azimuth, degrees from south.
    pub end: Real,
    #[serde(default)]
    pub objects: Vec<ShadingObject>,
}

impl ShadingSegment {
    pub fn contains_azimuth(&self, azimuth: Real) -> bool {
        azimuth < self.start && azimuth > self.end
    }
}

/// Window-local shading attached to a transparent element.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum WindowShading {
    Overhang { depth: Real, distance: Real },
    SideFinLeft { depth: Real, distance: Real },
    SideFinRight { depth: Real, distance: Real },
    Reveal { depth: Real, distance: Real },
}

impl WindowShading {
    /// Expand reveals into their overhang + two side fins equivalent; other
    /// variants pass through unchanged.
    pub fn expand(objects: &[WindowShading]) -> Vec<WindowShading> {
        let mut expanded = Vec::with_capacity(objects.len());
        for obj in objects {
            match *obj {
                WindowShading::Reveal { depth, distance } => {
                    expanded.push(WindowShading::Overhang { depth, distance });
                    expanded.push(WindowShading::SideFinLeft { depth, distance });
                    expanded.push(WindowShading::SideFinRight { depth, distance });
                }
                other => expanded.push(other),
            }
        }
        expanded
    }
}
