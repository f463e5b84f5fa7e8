use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Media host backend types
///
/// Selects where uploaded files are forwarded. Defined in core because it is
/// part of configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaHostBackend {
    Cloudinary,
    Local,
}

impl FromStr for MediaHostBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cloudinary" => Ok(MediaHostBackend::Cloudinary),
            "local" => Ok(MediaHostBackend::Local),
            _ => Err(anyhow::anyhow!("Invalid media host backend: {}", s)),
        }
    }
}

impl Display for MediaHostBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MediaHostBackend::Cloudinary => write!(f, "cloudinary"),
            MediaHostBackend::Local => write!(f, "local"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backend_case_insensitive() {
        assert_eq!(
            "Cloudinary".parse::<MediaHostBackend>().unwrap(),
            MediaHostBackend::Cloudinary
        );
        assert_eq!(
            " local ".parse::<MediaHostBackend>().unwrap(),
            MediaHostBackend::Local
        );
        assert!("s3".parse::<MediaHostBackend>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        for backend in [MediaHostBackend::Cloudinary, MediaHostBackend::Local] {
            assert_eq!(backend.to_string().parse::<MediaHostBackend>().unwrap(), backend);
        }
    }
}
