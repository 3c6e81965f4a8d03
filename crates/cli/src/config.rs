//! Assessment rule loading.

use std::path::Path;

use anyhow::Context;
use brewqa_quality::AssessmentConfig;

/// Load rules from a TOML file, or defaults when no file is given.
pub fn load(path: Option<&Path>) -> anyhow::Result<AssessmentConfig> {
    let Some(path) = path else {
        return Ok(AssessmentConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    parse(&text).with_context(|| format!("parse config {}", path.display()))
}

/// Parse rules from TOML text. Missing keys keep their defaults.
pub fn parse(text: &str) -> anyhow::Result<AssessmentConfig> {
    Ok(toml::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use brewqa_quality::ScoringMode;

    #[test]
    fn test_parse_partial_toml() {
        let config = parse(
            r#"
            temperature_tolerance = 1.5
            max_page_limit = 200
            scoring_mode = "strict"
            "#,
        )
        .unwrap();

        assert_eq!(config.temperature_tolerance, 1.5);
        assert_eq!(config.max_page_limit, 200);
        assert_eq!(config.scoring_mode, ScoringMode::Strict);
        assert_eq!(config.gravity_tolerance, 0.005);
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(parse("").unwrap(), AssessmentConfig::default());
    }

    #[test]
    fn test_no_path_is_default() {
        assert_eq!(load(None).unwrap(), AssessmentConfig::default());
    }

    #[test]
    fn test_rejects_wrong_types() {
        assert!(parse("ph_min = \"low\"").is_err());
    }
}
