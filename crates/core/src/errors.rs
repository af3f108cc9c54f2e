use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog network failure: {0}")]
    Network(String),
    #[error("catalog response could not be parsed: {0}")]
    Parse(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RecommendError {
    #[error("product name must not be blank")]
    InvalidQuery,
    #[error("catalog lookup failed: {0}")]
    LookupFailed(#[from] CatalogError),
    #[error("no catalog match found for `{query}`")]
    NoMatchFound { query: String },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("not found: {message}")]
    NotFound { message: String, correlation_id: String },
    #[error("bad gateway: {message}")]
    BadGateway { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => "A non-empty product name is required.",
            Self::NotFound { .. } => "No matching product was found in the catalog.",
            Self::BadGateway { .. } => {
                "The product catalog is temporarily unavailable. Please retry shortly."
            }
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::NotFound { correlation_id, .. }
            | Self::BadGateway { correlation_id, .. } => correlation_id,
        }
    }
}

impl RecommendError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::NotFound { correlation_id: id, .. }
            | InterfaceError::BadGateway { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<RecommendError> for InterfaceError {
    fn from(value: RecommendError) -> Self {
        let message = value.to_string();
        match value {
            RecommendError::InvalidQuery => {
                Self::BadRequest { message, correlation_id: "unassigned".to_owned() }
            }
            RecommendError::NoMatchFound { .. } => {
                Self::NotFound { message, correlation_id: "unassigned".to_owned() }
            }
            RecommendError::LookupFailed(_) => {
                Self::BadGateway { message, correlation_id: "unassigned".to_owned() }
            }
        }
    }
}
