//! Absolute roughness of common pipe materials, in millimetres.

const ROUGHNESS_MM: &[(&str, f64)] = &[
    ("cs", 0.045),
    ("carbon_steel", 0.045),
    ("ss", 0.015),
    ("ss304", 0.015),
    ("ss316", 0.015),
    ("stainless_steel", 0.015),
    ("pvc", 0.0015),
    ("cpvc", 0.0015),
    ("copper", 0.0015),
    ("hdpe", 0.007),
    ("concrete", 0.3),
    ("cast_iron", 0.26),
    ("galvanized", 0.15),
    ("glass", 0.001),
    ("other", 0.05),
];

/// Used for materials the table does not know.
pub const DEFAULT_ROUGHNESS_MM: f64 = 0.045;

/// Roughness in millimetres and whether the material was found.
pub fn material_roughness(material: &str) -> (f64, bool) {
    let key = material.trim().to_ascii_lowercase().replace([' ', '-'], "_");
    match ROUGHNESS_MM.iter().find(|(name, _)| *name == key) {
        Some((_, eps)) => (*eps, true),
        None => (DEFAULT_ROUGHNESS_MM, false),
    }
}
