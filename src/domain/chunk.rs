//! Archive chunk sizes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum size of each archive volume produced when packaging a case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ChunkSize {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "100mb")]
    OneHundredMb,
    #[serde(rename = "700mb")]
    Cd,
    #[serde(rename = "1gb")]
    OneGb,
    #[serde(rename = "4.5gb")]
    Dvd,
}

impl ChunkSize {
    pub const ALL: [ChunkSize; 5] = [
        ChunkSize::None,
        ChunkSize::OneHundredMb,
        ChunkSize::Cd,
        ChunkSize::OneGb,
        ChunkSize::Dvd,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Self::None => "Do not split",
            Self::OneHundredMb => "Split into 100 MB chunks",
            Self::Cd => "Split into 700 MB chunks (CD)",
            Self::OneGb => "Split into 1 GB chunks",
            Self::Dvd => "Split into 4.5 GB chunks (DVD)",
        }
    }

    /// Value for 7-Zip's `-v` switch, `None` when the archive is not split
    pub fn seven_zip_param(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::OneHundredMb => Some("100m"),
            Self::Cd => Some("700m"),
            Self::OneGb => Some("1000m"),
            Self::Dvd => Some("4500m"),
        }
    }

    /// Configuration spelling, e.g. `700mb`
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::OneHundredMb => "100mb",
            Self::Cd => "700mb",
            Self::OneGb => "1gb",
            Self::Dvd => "4.5gb",
        }
    }
}

impl fmt::Display for ChunkSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ChunkSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "Invalid chunk size '{s}'. Must be one of: {}",
                    Self::ALL.map(ChunkSize::as_str).join(", ")
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(ChunkSize::None, None, "Do not split" ; "no split")]
    #[test_case(ChunkSize::OneHundredMb, Some("100m"), "Split into 100 MB chunks" ; "100 MB")]
    #[test_case(ChunkSize::Cd, Some("700m"), "Split into 700 MB chunks (CD)" ; "cd")]
    #[test_case(ChunkSize::OneGb, Some("1000m"), "Split into 1 GB chunks" ; "1 GB")]
    #[test_case(ChunkSize::Dvd, Some("4500m"), "Split into 4.5 GB chunks (DVD)" ; "dvd")]
    fn test_chunk_size_parameters(chunk: ChunkSize, param: Option<&str>, display: &str) {
        assert_eq!(chunk.seven_zip_param(), param);
        assert_eq!(chunk.to_string(), display);
        assert_eq!(chunk.as_str().parse::<ChunkSize>().unwrap(), chunk);
    }

    #[test]
    fn test_unknown_chunk_size() {
        let err = "2gb".parse::<ChunkSize>().unwrap_err();
        assert!(err.contains("none, 100mb, 700mb, 1gb, 4.5gb"));
    }

    #[test]
    fn test_chunk_size_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            chunk_size: ChunkSize,
        }
        let w: Wrapper = toml::from_str("chunk_size = \"4.5gb\"").unwrap();
        assert_eq!(w.chunk_size, ChunkSize::Dvd);
    }
}
