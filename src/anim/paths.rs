//! Channel naming.
//!
//! Per-label curves address a pose bone named after the label:
//! `pose.bones["<label>"].location` for position and
//! `pose.bones["<label>"]["residual"]` for the residual property.

const BONE_PREFIX: &str = "pose.bones[\"";
const LOCATION_SUFFIX: &str = "\"].location";
const RESIDUAL_SUFFIX: &str = "\"][\"residual\"]";

/// Data path of a label's position curves.
pub fn location_path(label: &str) -> String {
    format!("{}{}{}", BONE_PREFIX, label, LOCATION_SUFFIX)
}

/// Data path of a label's residual curve.
pub fn residual_path(label: &str) -> String {
    format!("{}{}{}", BONE_PREFIX, label, RESIDUAL_SUFFIX)
}

/// Label of a position curve, or `None` for any other path.
pub fn location_label(data_path: &str) -> Option<&str> {
    data_path
        .strip_prefix(BONE_PREFIX)?
        .strip_suffix(LOCATION_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(location_path("Hip"), r#"pose.bones["Hip"].location"#);
        assert_eq!(residual_path("Hip"), r#"pose.bones["Hip"]["residual"]"#);
    }

    #[test]
    fn test_parse() {
        assert_eq!(location_label(&location_path("L Knee")), Some("L Knee"));
        assert_eq!(location_label(&location_path("Hip")), Some("Hip"));
        assert_eq!(location_label(&residual_path("Hip")), None);
        assert_eq!(location_label("location"), None);
        assert_eq!(location_label("rotation_euler"), None);
    }
}
