//! Sample-log stream format.
//!
//! Sample logs are append-only JSONL: a `#`-prefixed header line carrying a
//! [`SampleStreamHeader`], then one JSON sample per line.

use serde::{Deserialize, Serialize};

use crate::sample::Sample;

/// Coordinate space used by recorded sample positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateSpace {
    /// World-space meters from the tracking session.
    WorldMeters,
    /// Older logs did not label coordinate space explicitly.
    #[default]
    LegacyUnspecified,
}

/// Metadata written as the first line of a sample log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleStreamHeader {
    /// Schema version for forward compatibility.
    pub schema_version: String,

    /// Wall-clock time at session start (ISO 8601).
    pub epoch_wall: String,

    /// Nominal producer sampling rate (Hz).
    pub sample_rate_hz: u32,

    /// Coordinate-space contract for x/y/z values.
    #[serde(default)]
    pub coordinate_space: CoordinateSpace,
}

/// Parse samples from JSONL content (one JSON object per line).
pub fn parse_samples(jsonl: &str) -> Result<Vec<Sample>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}

/// Serialize samples to JSONL format.
pub fn serialize_samples(samples: &[Sample]) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for sample in samples {
        output.push_str(&serde_json::to_string(sample)?);
        output.push('\n');
    }
    Ok(output)
}

/// Parse the header comment line of a sample log, if present.
pub fn parse_header(jsonl: &str) -> Result<Option<SampleStreamHeader>, serde_json::Error> {
    let first = jsonl.lines().map(str::trim).find(|line| !line.is_empty());
    match first.and_then(|line| line.strip_prefix('#')) {
        Some(rest) => serde_json::from_str(rest.trim()).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jsonl_roundtrip() {
        let samples = vec![
            Sample::new(0, 0, 0.0, 0.0, 0.0),
            Sample::new(1, 10, 1.0, 0.5, -0.2),
            Sample::new(2, 20, 3.0, 0.6, -0.1),
        ];
        let jsonl = serialize_samples(&samples).unwrap();
        let parsed = parse_samples(&jsonl).unwrap();
        assert_eq!(samples, parsed);
    }

    #[test]
    fn test_parse_samples_skips_header_comment() {
        let jsonl = "# {\"schema_version\":\"1.0\"}\n{\"seq\":0,\"t\":0,\"x\":0.5,\"y\":0.3,\"z\":0.1}\n";
        let parsed = parse_samples(jsonl).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].sequence, 0);
    }

    #[test]
    fn test_parse_header() {
        let jsonl = concat!(
            "# {\"schema_version\":\"1.0\",\"epoch_wall\":\"2026-01-01T00:00:00Z\",",
            "\"sample_rate_hz\":60,\"coordinate_space\":\"world_meters\"}\n",
            "{\"seq\":0,\"t\":0,\"x\":0.0,\"y\":0.0,\"z\":0.0}\n",
        );
        let header = parse_header(jsonl).unwrap().unwrap();
        assert_eq!(header.schema_version, "1.0");
        assert_eq!(header.sample_rate_hz, 60);
        assert_eq!(header.coordinate_space, CoordinateSpace::WorldMeters);
    }

    #[test]
    fn test_parse_header_absent() {
        let jsonl = "{\"seq\":0,\"t\":0,\"x\":0.0,\"y\":0.0,\"z\":0.0}\n";
        assert!(parse_header(jsonl).unwrap().is_none());
    }

    #[test]
    fn test_header_defaults_coordinate_space_for_legacy_logs() {
        let raw = r#"{
            "schema_version":"1.0",
            "epoch_wall":"2026-01-01T00:00:00Z",
            "sample_rate_hz":60
        }"#;

        let parsed: SampleStreamHeader = serde_json::from_str(raw).unwrap();
        assert_eq!(
            parsed.coordinate_space,
            CoordinateSpace::LegacyUnspecified
        );
    }
}
