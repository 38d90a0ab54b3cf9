use serde::{Deserialize, Serialize};

/// A chunk of source text and the file it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub path: String,
    pub content: String,
}

/// One earlier question and the answer given to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub query: String,
    pub response: String,
}

/// Query string for POST /load-github
#[derive(Debug, Clone, Deserialize)]
pub struct LoadGithubParams {
    pub repo_url: String,
}

/// Query string for POST /ask
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AskParams {
    pub query: Option<String>,
}

/// JSON body for POST /ask
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AskRequest {
    pub query: Option<String>,
    #[serde(default)]
    pub history: Vec<ConversationTurn>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadGithubResponse {
    pub message: String,
    pub repo_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexResponse {
    pub indexed_chunks: usize,
}

/// Error payload shared by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
