use thiserror::Error;

/// What a failed fetch was asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchTarget {
    Page(u32),
    Neighborhoods,
}

impl std::fmt::Display for FetchTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchTarget::Page(page) => write!(f, "page {}", page),
            FetchTarget::Neighborhoods => write!(f, "neighborhoods"),
        }
    }
}

/// Network or server failure reported by a listing source.
///
/// Cloneable so one shared in-flight request can hand the same failure to
/// every waiter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to fetch {target}: {message}")]
pub struct FetchError {
    pub target: FetchTarget,
    pub message: String,
}

impl FetchError {
    pub fn new(target: FetchTarget, source: &anyhow::Error) -> Self {
        Self {
            target,
            message: format!("{:#}", source),
        }
    }
}

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("invalid value {value:?} for query parameter `{param}`")]
    Validation { param: &'static str, value: String },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, BrowserError>;
