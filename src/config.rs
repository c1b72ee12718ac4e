use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Which service-container implementation to construct. Chosen once at
/// startup; never switched at runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Live,
    #[default]
    Mock,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Live => write!(f, "live"),
            Self::Mock => write!(f, "mock"),
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "live" => Ok(Self::Live),
            "mock" => Ok(Self::Mock),
            _ => Err(format!("unknown backend kind: {s}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: BackendKind,
    pub backend_url: String,
    pub backend_key: String,
}

impl AppConfig {
    pub fn mock() -> Self {
        Self {
            backend: BackendKind::Mock,
            backend_url: String::new(),
            backend_key: String::new(),
        }
    }

    pub fn live(backend_url: &str, backend_key: &str) -> Self {
        Self {
            backend: BackendKind::Live,
            backend_url: backend_url.to_string(),
            backend_key: backend_key.to_string(),
        }
    }

    /// `BHAKTI_BACKEND` selects the implementation (defaults to mock);
    /// live additionally requires `BHAKTI_BACKEND_URL` and
    /// `BHAKTI_BACKEND_KEY`.
    pub fn from_env() -> Result<Self, AppError> {
        let backend = match std::env::var("BHAKTI_BACKEND") {
            Ok(raw) => raw
                .parse::<BackendKind>()
                .map_err(AppError::General)?,
            Err(_) => BackendKind::Mock,
        };

        match backend {
            BackendKind::Mock => Ok(Self::mock()),
            BackendKind::Live => {
                let url = std::env::var("BHAKTI_BACKEND_URL").map_err(|_| {
                    AppError::General("BHAKTI_BACKEND_URL is required for the live backend".into())
                })?;
                let key = std::env::var("BHAKTI_BACKEND_KEY").map_err(|_| {
                    AppError::General("BHAKTI_BACKEND_KEY is required for the live backend".into())
                })?;
                Ok(Self::live(&url, &key))
            }
        }
    }
}
