//! Team code → display name lookup.

/// Canonical department names, keyed by the team code the API uses.
const TEAM_NAMES: &[(&str, &str)] = &[
    ("AEIE", "Applied Electronics & Instrumentation"),
    ("BT", "Biotechnology"),
    ("CE", "Civil Engineering"),
    ("CHE", "Chemical Engineering"),
    ("CSE", "Computer Science & Engineering"),
    ("ECE", "Electronics & Communication Engineering"),
    ("EE", "Electrical Engineering"),
    ("FT", "Food Technology"),
    ("IT", "Information Technology"),
    ("MBA", "Business Administration"),
    ("MCA", "Computer Applications"),
    ("ME", "Mechanical Engineering"),
];

pub fn canonical_name(code: &str) -> Option<&'static str> {
    TEAM_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Table name, else the non-empty provided name, else the raw code.
pub fn resolve(code: &str, name: Option<&str>) -> String {
    if let Some(canonical) = canonical_name(code) {
        return canonical.to_owned();
    }
    match name {
        Some(n) if !n.is_empty() => n.to_owned(),
        _ => code.to_owned(),
    }
}
