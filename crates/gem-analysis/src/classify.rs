//! Body/gem decision and gem shape inference.
//!
//! Jewelry models represent the metal setting as the dominant mass, so the
//! island with the largest bounding box is the body and every other island is
//! a gem. A mesh with a single island never contains a gem.
//!
//! Gem shapes come from a fixed decision table evaluated in order; the first
//! matching rule wins. With principal spreads `a >= b >= c`:
//!
//! | # | Rule | Shape |
//! |---|------|-------|
//! | 0 | too few triangles, no area, no facet angles, or `c / a` below `min_thickness_ratio` | `unknown` |
//! | 1 | sharp fraction above `princess_min_sharp_fraction` and `a / c <= near_equal_ratio` | `princess` |
//! | 2 | moderate-dominated, `a / b >= marquise_min_elongation` and `b / c < marquise_min_elongation` | `marquise` |
//! | 3 | moderate-dominated, `b / c <= near_equal_ratio` and `a / b > near_equal_ratio` | `emerald` |
//! | 4 | flat fraction at least `round_min_flat_fraction`: `a / b <= near_equal_ratio` | `round` |
//! |   | otherwise `b / c <= near_equal_ratio` | `oval` |
//! | 5 | no match | `unknown` |

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::DegenerateReason;
use crate::features::IslandDescriptor;
use crate::params::ShapeRules;

/// Role of an island in the piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The metal setting.
    Body,
    /// An embedded gemstone.
    Gem,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Body => write!(f, "body"),
            Role::Gem => write!(f, "gem"),
        }
    }
}

/// Gem cut shapes the classifier can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GemShape {
    Round,
    Princess,
    Emerald,
    Marquise,
    Oval,
    Unknown,
}

impl GemShape {
    /// All shapes, in declaration order.
    pub const ALL: [GemShape; 6] = [
        GemShape::Round,
        GemShape::Princess,
        GemShape::Emerald,
        GemShape::Marquise,
        GemShape::Oval,
        GemShape::Unknown,
    ];

    /// Lowercase label shown to users.
    pub fn as_str(&self) -> &'static str {
        match self {
            GemShape::Round => "round",
            GemShape::Princess => "princess",
            GemShape::Emerald => "emerald",
            GemShape::Marquise => "marquise",
            GemShape::Oval => "oval",
            GemShape::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for GemShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GemShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GemShape::ALL
            .into_iter()
            .find(|shape| shape.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown gem shape: {}", s))
    }
}

/// Verdict for one island.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    /// Body or gem.
    pub role: Role,
    /// Shape label, present for gems only.
    pub shape: Option<GemShape>,
    /// Why the island fell through to `unknown`, if it was degenerate.
    pub degenerate: Option<DegenerateReason>,
}

impl Classification {
    /// Classification of the body island.
    pub fn body() -> Self {
        Self {
            role: Role::Body,
            shape: None,
            degenerate: None,
        }
    }

    /// Classification of a gem island.
    pub fn gem(shape: GemShape) -> Self {
        Self {
            role: Role::Gem,
            shape: Some(shape),
            degenerate: None,
        }
    }

    /// True if the island is a gem.
    pub fn is_gem(&self) -> bool {
        self.role == Role::Gem
    }
}

/// Index of the body island: the largest bounding volume, first wins on ties.
pub fn body_index(descriptors: &[IslandDescriptor]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, d) in descriptors.iter().enumerate() {
        let volume = d.bounding_volume();
        match best {
            Some((_, best_volume)) if volume <= best_volume => {}
            _ => best = Some((i, volume)),
        }
    }
    best.map(|(i, _)| i)
}

/// Classify every island of a mesh.
///
/// The output has one entry per descriptor, in the same order.
pub fn classify_islands(descriptors: &[IslandDescriptor], rules: &ShapeRules) -> Vec<Classification> {
    let Some(body) = body_index(descriptors) else {
        return Vec::new();
    };

    descriptors
        .iter()
        .enumerate()
        .map(|(i, d)| {
            if i == body {
                return Classification::body();
            }
            match degeneracy(d, rules) {
                Some(reason) => {
                    warn!(island = i, %reason, "Gem island too degenerate to classify");
                    Classification {
                        role: Role::Gem,
                        shape: Some(GemShape::Unknown),
                        degenerate: Some(reason),
                    }
                }
                None => {
                    let shape = infer_shape(d, rules);
                    debug!(
                        island = i,
                        %shape,
                        elongation = format!("{:.3}", d.principal.elongation()),
                        cross_section = format!("{:.3}", d.principal.cross_section_aspect()),
                        flat = format!("{:.2}", d.facet_angles.flat_fraction()),
                        moderate = format!("{:.2}", d.facet_angles.moderate_fraction()),
                        sharp = format!("{:.2}", d.facet_angles.sharp_fraction()),
                        "Gem island classified"
                    );
                    Classification::gem(shape)
                }
            }
        })
        .collect()
}

/// Reason an island cannot be classified confidently, if any.
pub fn degeneracy(d: &IslandDescriptor, rules: &ShapeRules) -> Option<DegenerateReason> {
    if d.low_confidence || d.triangle_count < rules.min_triangles {
        return Some(DegenerateReason::TooFewTriangles {
            count: d.triangle_count,
        });
    }
    if d.surface_area <= 0.0 || d.principal.spreads[0] <= 0.0 {
        return Some(DegenerateReason::ZeroArea);
    }
    if d.facet_angles.total() == 0 {
        return Some(DegenerateReason::NoFacetAngles);
    }
    let thickness_ratio = d.principal.thickness_ratio();
    if thickness_ratio < rules.min_thickness_ratio {
        return Some(DegenerateReason::TooThin { thickness_ratio });
    }
    None
}

/// Evaluate the shape decision table on a non-degenerate island.
pub fn infer_shape(d: &IslandDescriptor, rules: &ShapeRules) -> GemShape {
    let shape = &d.principal;
    let angles = &d.facet_angles;
    let near = rules.near_equal_ratio;
    let moderate_dominated = angles.moderate_fraction() >= rules.moderate_dominance;

    if angles.sharp_fraction() > rules.princess_min_sharp_fraction && shape.anisotropy() <= near {
        return GemShape::Princess;
    }

    if moderate_dominated
        && shape.elongation() >= rules.marquise_min_elongation
        && shape.cross_section_aspect() < rules.marquise_min_elongation
    {
        return GemShape::Marquise;
    }

    if moderate_dominated && shape.cross_section_aspect() <= near && shape.elongation() > near {
        return GemShape::Emerald;
    }

    if angles.flat_fraction() >= rules.round_min_flat_fraction {
        if shape.elongation() <= near {
            return GemShape::Round;
        }
        if shape.cross_section_aspect() <= near {
            return GemShape::Oval;
        }
    }

    GemShape::Unknown
}
