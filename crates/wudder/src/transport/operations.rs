//! GraphQL documents and their response types.

use serde::Deserialize;

use super::Operation;

// ============================================================================
// Account
// ============================================================================

pub const CREATE_USER: Operation = Operation {
    name: "CreateUser",
    root_field: "createUser",
    document: r#"
        mutation CreateUser($user: UserInput!, $password: String!) {
            createUser(user: $user, password: $password) {
                id
            }
        }
    "#,
};

pub const LOGIN: Operation = Operation {
    name: "Login",
    root_field: "login",
    document: r#"
        mutation Login($email: String!, $password: String!) {
            login(email: $email, password: $password) {
                token
                refreshToken
                ethAccount
            }
        }
    "#,
};

pub const REFRESH_TOKEN: Operation = Operation {
    name: "RefreshToken",
    root_field: "refreshToken",
    document: r#"
        mutation RefreshToken($refreshToken: String!) {
            refreshToken(token: $refreshToken) {
                token
                refreshToken
            }
        }
    "#,
};

pub const UPDATE_USER: Operation = Operation {
    name: "UpdateUser",
    root_field: "updateUser",
    document: r#"
        mutation UpdateUser($user: UserInput!) {
            updateUser(user: $user) {
                id
            }
        }
    "#,
};

// ============================================================================
// Evidence
// ============================================================================

pub const CREATE_EVIDENCE: Operation = Operation {
    name: "CreateEvidence",
    root_field: "createEvidence",
    document: r#"
        mutation CreateEvidence($evidence: EvidenceInput!, $displayName: String!) {
            createEvidence(evidence: $evidence, displayName: $displayName) {
                evhash
            }
        }
    "#,
};

pub const PREPARE_EVIDENCE: Operation = Operation {
    name: "PrepareEvidence",
    root_field: "prepareEvidence",
    document: r#"
        mutation PrepareEvidence($content: ContentInput!, $displayName: String!) {
            prepareEvidence(content: $content, displayName: $displayName) {
                formattedTransaction
                preparedContent
                hash
                url
            }
        }
    "#,
};

pub const CONFIRM_PREPARED_EVIDENCE: Operation = Operation {
    name: "ConfirmPreparedEvidence",
    root_field: "confirmPreparedEvidence",
    document: r#"
        mutation ConfirmPreparedEvidence($evidence: PreparedEvidenceInput!) {
            confirmPreparedEvidence(evidence: $evidence) {
                evhash
            }
        }
    "#,
};

pub const PREPARED_EVIDENCE: Operation = Operation {
    name: "PreparedEvidence",
    root_field: "preparedEvidence",
    document: r#"
        query PreparedEvidence($hash: String!) {
            preparedEvidence(hash: $hash) {
                formattedTransaction
                preparedContent
                url
            }
        }
    "#,
};

pub const EVIDENCE: Operation = Operation {
    name: "Evidence",
    root_field: "evidence",
    document: r#"
        query Evidence($evhash: String!) {
            evidence(evhash: $evhash) {
                graphnData
                type
                displayName
                originalContent
            }
        }
    "#,
};

pub const GET_TRACE: Operation = Operation {
    name: "GetTrace",
    root_field: "getTrace",
    document: r#"
        query GetTrace($evhash: String!) {
            getTrace(evhash: $evhash) {
                creationEvidence {
                    evhash
                    type
                    graphnData
                    displayName
                    originalContent
                }
                childs {
                    evhash
                    type
                    graphnData
                    displayName
                    originalContent
                }
            }
        }
    "#,
};

pub const EVIDENCE_PROOF: Operation = Operation {
    name: "EvidenceProof",
    root_field: "evidence",
    document: r#"
        query EvidenceProof($evhash: String!) {
            evidence(evhash: $evhash) {
                graphnData
            }
        }
    "#,
};

// ============================================================================
// Response Types
// ============================================================================

/// Payload of mutations returning only an id.
#[derive(Debug, Deserialize)]
pub struct IdResponse {
    pub id: String,
}

/// Payload of login.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub eth_account: Option<String>,
}

/// Payload of refreshToken.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenResponse {
    pub token: String,
    pub refresh_token: String,
}

/// Payload of mutations creating evidence.
#[derive(Debug, Deserialize)]
pub struct EvhashResponse {
    pub evhash: String,
}

/// Payload of prepareEvidence and preparedEvidence.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedEvidenceResponse {
    pub formatted_transaction: String,
    pub prepared_content: String,
    /// Only returned by prepareEvidence.
    #[serde(default)]
    pub hash: Option<String>,
    pub url: String,
}

/// Payload of the proof query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofResponse {
    #[serde(default)]
    pub graphn_data: Option<String>,
}
