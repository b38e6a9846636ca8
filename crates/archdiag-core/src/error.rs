pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Edge [{from} -> {to}] references undeclared node [{missing}]")]
    DanglingEdge {
        from: String,
        to: String,
        missing: String,
    },

    #[error("The id [{id}] is already in use by another {existing}")]
    DuplicateId { id: String, existing: &'static str },

    #[error("The {kind} [{id}] is placed in undeclared cluster [{cluster}]")]
    UnknownCluster {
        kind: &'static str,
        id: String,
        cluster: String,
    },

    #[error("The cluster [{id}] cannot be placed within itself")]
    ClusterCycle { id: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Scene JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
