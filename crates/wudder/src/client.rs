//! The client facade.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tracing::{debug, info, instrument};

use crate::Result;
use crate::auth::refresh::{RefreshLoop, Refresher};
use crate::auth::{Credentials, RefreshOutcome, SessionManager, TokenPair};
use crate::canonical;
use crate::config::ClientConfig;
use crate::error::{AuthError, ProtocolError, TransportError};
use crate::event::{Event, PreparedEvent, Proof, Trace};
use crate::failure::{Failure, FailureKind, classify};
use crate::retry::RetryPolicy;
use crate::transport::operations::*;
use crate::transport::{GraphqlTransport, Operation, Transport};

/// Result of a successful login.
#[derive(Clone)]
pub struct LoginOutput {
    /// The pair now held by the session.
    pub tokens: TokenPair,
    /// The account's stored private key document, if one was uploaded.
    pub private_key: Option<Value>,
}

impl std::fmt::Debug for LoginOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginOutput")
            .field("tokens", &self.tokens)
            .field("private_key", &self.private_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// One remote call: a single transport execution, bounded in time, classified,
/// and retried under the policy.
struct Remote {
    transport: Arc<dyn Transport>,
    retry: RetryPolicy,
    timeout: Duration,
}

impl Remote {
    fn new(transport: Arc<dyn Transport>, config: &ClientConfig) -> Self {
        Self {
            transport,
            retry: RetryPolicy::from(&config.retry),
            timeout: config.request_timeout(),
        }
    }

    async fn call<T: DeserializeOwned>(&self, operation: &Operation, variables: Value) -> Result<T> {
        self.retry
            .call(operation.name, || self.attempt(operation, variables.clone()))
            .await
    }

    async fn attempt<T: DeserializeOwned>(
        &self,
        operation: &Operation,
        variables: Value,
    ) -> Result<T> {
        let response = tokio::time::timeout(
            self.timeout,
            self.transport.execute(operation, variables),
        )
        .await
        .map_err(|_| TransportError::Timeout {
            message: format!("{} exceeded {:?}", operation.name, self.timeout),
        })??;

        if let Some(failure) = classify(&response.errors) {
            debug!(operation = operation.name, kind = ?failure.kind(), "service reported failure");
            return Err(failure.into());
        }

        let mut data = response.data.ok_or(ProtocolError::MissingData {
            operation: operation.name,
        })?;
        let field = data
            .get_mut(operation.root_field)
            .map(Value::take)
            .unwrap_or(Value::Null);

        serde_json::from_value(field).map_err(|e| {
            ProtocolError::Decode {
                operation: operation.name,
                message: e.to_string(),
            }
            .into()
        })
    }
}

struct ClientInner {
    remote: Remote,
    session: SessionManager,
}

impl ClientInner {
    async fn refresh_session(&self) -> Result<RefreshOutcome> {
        let snapshot = self.session.snapshot();
        let refresh_token = snapshot
            .tokens
            .map(|t| t.refresh)
            .ok_or(AuthError::NotLoggedIn)?;

        let response: RefreshTokenResponse = self
            .remote
            .call(
                &REFRESH_TOKEN,
                json!({ "refreshToken": refresh_token.as_str() }),
            )
            .await?;

        let tokens = TokenPair::new(response.token, response.refresh_token);
        match self
            .session
            .update_tokens_if_current(tokens, snapshot.version)?
        {
            Some(_) => Ok(RefreshOutcome::Applied),
            None => Ok(RefreshOutcome::Superseded),
        }
    }
}

#[async_trait]
impl Refresher for ClientInner {
    fn has_session(&self) -> bool {
        self.session.is_logged_in()
    }

    async fn refresh(&self) -> Result<RefreshOutcome> {
        self.refresh_session().await
    }
}

/// Authenticated client for the notarization service.
///
/// Creating a client starts a background task that refreshes the session
/// every [`ClientConfig::refresh_interval_seconds`]. The task stops on
/// [`shutdown`](Self::shutdown) or when the last clone of the client is
/// dropped.
///
/// Every operation goes through the retry policy; failures reported by the
/// service surface as [`Error::Failure`](crate::Error::Failure) with their
/// [`FailureKind`] intact.
///
/// # Example
///
/// ```no_run
/// use wudder::{Client, ClientConfig, Credentials, Event, Fragment};
///
/// # async fn example() -> Result<(), wudder::Error> {
/// let client = Client::new(&ClientConfig::default())?;
/// client.login(&Credentials::new("alice@example.com", "hunter2")).await?;
///
/// let event = Event::new("NEW_TRACE", vec![Fragment::new("lot", "A-113")]);
/// let evhash = client.send_event_directly("first lot", &event).await?;
/// println!("{evhash}");
/// # client.shutdown().await;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
    refresh_loop: Arc<RefreshLoop>,
}

impl Client {
    /// Create a client for the configured endpoint. No session is held until
    /// [`login`](Self::login).
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let transport = GraphqlTransport::new(config.endpoint.clone(), config.request_timeout())?;
        Ok(Self::with_transport(Arc::new(transport), config))
    }

    /// Create a client over any transport.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn with_transport(transport: Arc<dyn Transport>, config: &ClientConfig) -> Self {
        let inner = Arc::new(ClientInner {
            session: SessionManager::new(transport.clone()),
            remote: Remote::new(transport, config),
        });
        let refresh_loop = RefreshLoop::spawn(inner.clone(), config.refresh_interval());

        Self {
            inner,
            refresh_loop: Arc::new(refresh_loop),
        }
    }

    /// Create a client and log in.
    pub async fn connect(config: &ClientConfig, credentials: &Credentials) -> Result<Self> {
        let client = Self::new(config)?;
        client.login(credentials).await?;
        Ok(client)
    }

    /// Create a client holding previously obtained tokens.
    pub fn restore(config: &ClientConfig, tokens: TokenPair) -> Result<Self> {
        let client = Self::new(config)?;
        client.inner.session.update_tokens(tokens)?;
        Ok(client)
    }

    /// The session manager owning this client's tokens.
    pub fn session(&self) -> &SessionManager {
        &self.inner.session
    }

    /// Stop the background refresh task and wait for it to exit.
    pub async fn shutdown(&self) {
        self.refresh_loop.shutdown().await;
    }

    // ========================================================================
    // Account Operations
    // ========================================================================

    /// Log in and make the returned tokens current.
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginOutput> {
        info!("Logging in");

        let response: LoginResponse = self
            .inner
            .remote
            .call(
                &LOGIN,
                json!({
                    "email": credentials.email(),
                    "password": credentials.password(),
                }),
            )
            .await?;

        let tokens = TokenPair::new(response.token, response.refresh_token);
        self.inner.session.update_tokens(tokens.clone())?;

        let private_key = match response.eth_account.as_deref() {
            Some(raw) if !raw.is_empty() => Some(decode_json(&LOGIN, raw)?),
            _ => None,
        };

        debug!("Logged in");
        Ok(LoginOutput {
            tokens,
            private_key,
        })
    }

    /// Exchange the current refresh token for a new pair.
    ///
    /// The background task does this on its own; calling it directly is
    /// only needed to renew ahead of schedule.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotLoggedIn`] if no refresh token is held yet.
    /// Unlike the other operations, which send the request and fail with
    /// [`FailureKind::Unauthorized`], this check is local: there is no token
    /// to send.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<RefreshOutcome> {
        info!("Refreshing session");
        self.inner.refresh_session().await
    }

    /// Replace the private key document stored for the account.
    #[instrument(skip(self, private_key))]
    pub async fn update_private_key(&self, private_key: &Value) -> Result<()> {
        let eth_account = canonical::to_string(private_key)?;
        let _: IdResponse = self
            .inner
            .remote
            .call(&UPDATE_USER, json!({ "user": { "ethAccount": eth_account } }))
            .await?;
        Ok(())
    }

    // ========================================================================
    // Event Operations
    // ========================================================================

    /// Submit an event in one step, letting the service sign it. Returns the
    /// evhash.
    #[instrument(skip(self, event))]
    pub async fn send_event_directly(&self, title: &str, event: &Event) -> Result<String> {
        let response: EvhashResponse = self
            .inner
            .remote
            .call(
                &CREATE_EVIDENCE,
                json!({
                    "displayName": title,
                    "evidence": { "content": event },
                }),
            )
            .await?;
        Ok(response.evhash)
    }

    /// First phase of a signed submission: obtain the transaction to sign.
    #[instrument(skip(self, event))]
    pub async fn prepare(&self, title: &str, event: &Event) -> Result<PreparedEvent> {
        let response: PreparedEvidenceResponse = self
            .inner
            .remote
            .call(
                &PREPARE_EVIDENCE,
                json!({ "displayName": title, "content": event }),
            )
            .await?;

        let hash = response.hash.clone().ok_or(ProtocolError::MissingField {
            operation: PREPARE_EVIDENCE.name,
            field: "hash",
        })?;
        prepared_event(&PREPARE_EVIDENCE, response, hash)
    }

    /// Fetch a previously prepared submission by its temporary hash.
    #[instrument(skip(self))]
    pub async fn get_prepared(&self, hash: &str) -> Result<PreparedEvent> {
        let response: Option<PreparedEvidenceResponse> = self
            .inner
            .remote
            .call(&PREPARED_EVIDENCE, json!({ "hash": hash }))
            .await?;

        let response = response.ok_or_else(|| {
            Failure::synthetic(FailureKind::NotFound, "prepared evidence not found")
        })?;
        prepared_event(&PREPARED_EVIDENCE, response, hash.to_string())
    }

    /// Second phase of a signed submission. Returns the evhash.
    #[instrument(skip(self, tx, signature))]
    pub async fn send_prepared(&self, tx: &Value, signature: Option<&str>) -> Result<String> {
        let prepared = canonical::to_string(tx)?;
        let response: EvhashResponse = self
            .inner
            .remote
            .call(
                &CONFIRM_PREPARED_EVIDENCE,
                json!({
                    "evidence": {
                        "preparedEvidence": prepared,
                        "signature": signature.unwrap_or(""),
                    },
                }),
            )
            .await?;
        Ok(response.evhash)
    }

    /// Fetch a stored event.
    ///
    /// # Errors
    ///
    /// An unknown evhash yields a [`FailureKind::NotFound`] failure.
    #[instrument(skip(self))]
    pub async fn get_event(&self, evhash: &str) -> Result<Event> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct StoredEvidence {
            #[serde(default)]
            original_content: Option<String>,
        }

        #[derive(Deserialize)]
        struct OriginalContent {
            content: Event,
        }

        let response: Option<StoredEvidence> = self
            .inner
            .remote
            .call(&EVIDENCE, json!({ "evhash": evhash }))
            .await?;

        let evidence =
            response.ok_or_else(|| Failure::synthetic(FailureKind::NotFound, "event not found"))?;
        let raw = evidence
            .original_content
            .ok_or(ProtocolError::MissingField {
                operation: EVIDENCE.name,
                field: "originalContent",
            })?;
        let original: OriginalContent = decode_json(&EVIDENCE, &raw)?;
        Ok(original.content)
    }

    /// Fetch the trace an evidence belongs to.
    #[instrument(skip(self))]
    pub async fn get_trace(&self, evhash: &str) -> Result<Trace> {
        let trace: Option<Trace> = self
            .inner
            .remote
            .call(&GET_TRACE, json!({ "evhash": evhash }))
            .await?;
        trace.ok_or_else(|| Failure::synthetic(FailureKind::NotFound, "trace not found").into())
    }

    /// Fetch the anchoring proof of an evidence.
    ///
    /// Returns `Ok(None)` when the evidence exists but has no proof data yet.
    #[instrument(skip(self))]
    pub async fn get_proof(&self, evhash: &str) -> Result<Option<Proof>> {
        let response: Option<ProofResponse> = self
            .inner
            .remote
            .call(&EVIDENCE_PROOF, json!({ "evhash": evhash }))
            .await?;

        let Some(raw) = response.and_then(|r| r.graphn_data) else {
            return Ok(None);
        };

        let mut data: Map<String, Value> = decode_json(&EVIDENCE_PROOF, &raw)?;
        let missing = |field| ProtocolError::MissingField {
            operation: EVIDENCE_PROOF.name,
            field,
        };

        let block_proof = data.remove("block_proof").ok_or(missing("block_proof"))?;
        let (proof, prefixes) = match data.remove("proof") {
            Some(proof) => {
                let prefixes = data.remove("prefixes").ok_or(missing("prefixes"))?;
                (Some(proof), Some(prefixes))
            }
            None => (None, None),
        };

        Ok(Some(Proof {
            block_proof,
            proof,
            prefixes,
        }))
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("session", &self.inner.session)
            .field("retry", &self.inner.remote.retry)
            .field("refreshing", &self.refresh_loop.is_running())
            .finish()
    }
}

/// Register a new account. No session is needed or created.
///
/// Returns the new user's id.
#[instrument(skip(config, credentials, private_key), fields(email = %credentials.email()))]
pub async fn create_user(
    config: &ClientConfig,
    credentials: &Credentials,
    private_key: &Value,
) -> Result<String> {
    let transport = GraphqlTransport::new(config.endpoint.clone(), config.request_timeout())?;
    register(&Remote::new(Arc::new(transport), config), credentials, private_key).await
}

async fn register(remote: &Remote, credentials: &Credentials, private_key: &Value) -> Result<String> {
    info!("Creating user");
    let eth_account = canonical::to_string(private_key)?;
    let response: IdResponse = remote
        .call(
            &CREATE_USER,
            json!({
                "user": {
                    "email": credentials.email(),
                    "ethAccount": eth_account,
                },
                "password": credentials.password(),
            }),
        )
        .await?;
    Ok(response.id)
}

fn prepared_event(
    operation: &Operation,
    response: PreparedEvidenceResponse,
    hash: String,
) -> Result<PreparedEvent> {
    Ok(PreparedEvent {
        tx: decode_json(operation, &response.formatted_transaction)?,
        event: decode_json(operation, &response.prepared_content)?,
        hash,
        url: response.url,
    })
}

/// Decode a JSON document embedded as a string field of a response.
fn decode_json<T: DeserializeOwned>(operation: &Operation, raw: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(|e| {
        ProtocolError::Decode {
            operation: operation.name,
            message: e.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::event::Fragment;
    use crate::transport::AUTH_HEADER;
    use crate::transport::mock::{Reply, ScriptedTransport};

    fn config() -> ClientConfig {
        let mut config = ClientConfig::default();
        config.retry.initial_backoff_ms = 10;
        config.retry.max_attempts = 3;
        config
    }

    fn client() -> (Arc<ScriptedTransport>, Client) {
        let transport = Arc::new(ScriptedTransport::new());
        let client = Client::with_transport(transport.clone(), &config());
        (transport, client)
    }

    fn login_reply(access: &str, refresh: &str) -> Reply {
        Reply::Data(json!({
            "token": access,
            "refreshToken": refresh,
            "ethAccount": "",
        }))
    }

    async fn logged_in() -> (Arc<ScriptedTransport>, Client) {
        let (transport, client) = client();
        transport.script(&LOGIN, login_reply("access-0", "refresh-0"));
        client
            .login(&Credentials::new("alice@example.com", "pw"))
            .await
            .unwrap();
        (transport, client)
    }

    #[tokio::test(start_paused = true)]
    async fn login_updates_session_and_header() {
        let (transport, client) = client();
        transport.script(
            &LOGIN,
            Reply::Data(json!({
                "token": "access-1",
                "refreshToken": "refresh-1",
                "ethAccount": "{\"address\":\"0xabc\"}",
            })),
        );

        let output = client
            .login(&Credentials::new("alice@example.com", "pw"))
            .await
            .unwrap();

        assert_eq!(output.tokens, TokenPair::new("access-1", "refresh-1"));
        assert_eq!(output.private_key, Some(json!({ "address": "0xabc" })));
        assert_eq!(transport.header(AUTH_HEADER).as_deref(), Some("access-1"));
        assert_eq!(
            transport.calls(&LOGIN)[0].variables,
            json!({ "email": "alice@example.com", "password": "pw" })
        );
        client.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn login_without_private_key() {
        let (_, client) = logged_in().await;
        assert!(client.session().is_logged_in());
        client.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn debug_output_hides_tokens() {
        let (_, client) = logged_in().await;

        let debug = format!("{:?}", client);
        assert!(!debug.contains("access-0"));
        assert!(!debug.contains("refresh-0"));
        assert!(debug.contains("refreshing: true"));

        client.shutdown().await;
        assert!(format!("{:?}", client).contains("refreshing: false"));
    }

    #[tokio::test(start_paused = true)]
    async fn unauthorized_login_is_not_retried() {
        let (transport, client) = client();
        transport.script(&LOGIN, Reply::code(401));

        let err = client
            .login(&Credentials::new("alice@example.com", "wrong"))
            .await
            .unwrap_err();

        assert_eq!(err.failure_kind(), Some(FailureKind::Unauthorized));
        assert_eq!(transport.calls(&LOGIN).len(), 1);
        assert!(!client.session().is_logged_in());
        client.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limited_call_retries_until_success() {
        let (transport, client) = logged_in().await;
        transport
            .script(&CREATE_EVIDENCE, Reply::code(429))
            .script(&CREATE_EVIDENCE, Reply::Fault)
            .script(&CREATE_EVIDENCE, Reply::Data(json!({ "evhash": "ev-1" })));

        let event = Event::new("NEW_TRACE", vec![Fragment::new("k", "v")]);
        let evhash = client.send_event_directly("title", &event).await.unwrap();

        assert_eq!(evhash, "ev-1");
        let calls = transport.calls(&CREATE_EVIDENCE);
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].variables["displayName"], "title");
        assert_eq!(calls[0].variables["evidence"]["content"]["type"], "NEW_TRACE");
        assert_eq!(calls[0].auth_header.as_deref(), Some("access-0"));
        client.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn persistent_rate_limit_surfaces_kind() {
        let (transport, client) = logged_in().await;
        transport.script(&EVIDENCE, Reply::code(429));

        let err = client.get_event("ev").await.unwrap_err();

        assert_eq!(err.failure_kind(), Some(FailureKind::RateLimited));
        assert_eq!(transport.calls(&EVIDENCE).len(), 3);
        client.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn hung_attempt_times_out_and_retries() {
        let (transport, client) = logged_in().await;
        transport
            .script(
                &EVIDENCE_PROOF,
                Reply::Delayed(Duration::from_secs(3600), Box::new(Reply::Fault)),
            )
            .script(&EVIDENCE_PROOF, Reply::Data(Value::Null));

        let proof = client.get_proof("ev").await.unwrap();

        assert!(proof.is_none());
        assert_eq!(transport.calls(&EVIDENCE_PROOF).len(), 2);
        client.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn get_event_not_found() {
        let (transport, client) = logged_in().await;
        transport.script(&EVIDENCE, Reply::code(404));

        let err = client.get_event("missing").await.unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(transport.calls(&EVIDENCE).len(), 1);
        client.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn get_event_null_is_not_found() {
        let (transport, client) = logged_in().await;
        transport.script(&EVIDENCE, Reply::Data(Value::Null));

        let err = client.get_event("missing").await.unwrap_err();
        assert!(err.is_not_found());
        client.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn get_event_reads_original_content() {
        let (transport, client) = logged_in().await;
        let content = json!({
            "content": {
                "type": "ADD_EVENT",
                "trace": "root",
                "fragments": [{ "field": "temp", "value": "4C" }],
                "timestamp": 1_600_000_000,
                "salt": "pepper",
                "extra": "ignored",
            }
        });
        transport.script(
            &EVIDENCE,
            Reply::Data(json!({
                "graphnData": null,
                "type": "ADD_EVENT",
                "displayName": "t",
                "originalContent": content.to_string(),
            })),
        );

        let event = client.get_event("ev").await.unwrap();

        assert_eq!(event.event_type, "ADD_EVENT");
        assert_eq!(event.trace.as_deref(), Some("root"));
        assert_eq!(event.fragments, vec![Fragment::new("temp", "4C")]);
        assert_eq!(event.salt, "pepper");
        client.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn unexpected_failure_keeps_raw_entry() {
        let (transport, client) = logged_in().await;
        transport.script(
            &GET_TRACE,
            Reply::Errors(vec![json!({ "message": "boom" }), json!({ "code": 404 })]),
        );

        let err = client.get_trace("ev").await.unwrap_err();

        let Error::Failure(failure) = err else {
            panic!("expected a classified failure");
        };
        assert_eq!(failure.kind(), FailureKind::Unexpected);
        assert_eq!(failure.first().message(), Some("boom"));
        assert_eq!(failure.errors().len(), 2);
        assert_eq!(transport.calls(&GET_TRACE).len(), 1);
        client.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn prepare_and_confirm() {
        let (transport, client) = logged_in().await;
        let event = Event::new("NEW_TRACE", vec![]);
        transport.script(
            &PREPARE_EVIDENCE,
            Reply::Data(json!({
                "formattedTransaction": "{\"nonce\":1,\"data\":\"0x\"}",
                "preparedContent": serde_json::to_string(&event).unwrap(),
                "hash": "tmp-1",
                "url": "https://explorer.test/tmp-1",
            })),
        );
        transport.script(
            &CONFIRM_PREPARED_EVIDENCE,
            Reply::Data(json!({ "evhash": "ev-2" })),
        );

        let prepared = client.prepare("title", &event).await.unwrap();
        assert_eq!(prepared.hash, "tmp-1");
        assert_eq!(prepared.event, event);
        assert_eq!(prepared.tx, json!({ "nonce": 1, "data": "0x" }));

        let evhash = client.send_prepared(&prepared.tx, None).await.unwrap();
        assert_eq!(evhash, "ev-2");

        let sent = &transport.calls(&CONFIRM_PREPARED_EVIDENCE)[0].variables;
        assert_eq!(
            sent["evidence"]["preparedEvidence"],
            r#"{"data":"0x","nonce":1}"#
        );
        assert_eq!(sent["evidence"]["signature"], "");
        client.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn get_prepared_keeps_requested_hash() {
        let (transport, client) = logged_in().await;
        let event = Event::new("NEW_TRACE", vec![]);
        transport.script(
            &PREPARED_EVIDENCE,
            Reply::Data(json!({
                "formattedTransaction": "{}",
                "preparedContent": serde_json::to_string(&event).unwrap(),
                "url": "u",
            })),
        );

        let prepared = client.get_prepared("tmp-9").await.unwrap();
        assert_eq!(prepared.hash, "tmp-9");
        assert_eq!(prepared.url, "u");
        client.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn proof_without_inclusion_omits_fields() {
        let (transport, client) = logged_in().await;
        transport.script(
            &EVIDENCE_PROOF,
            Reply::Data(json!({
                "graphnData": json!({ "block_proof": { "height": 7 } }).to_string(),
            })),
        );

        let proof = client.get_proof("ev").await.unwrap().unwrap();
        assert_eq!(proof.block_proof, json!({ "height": 7 }));
        assert!(proof.proof.is_none());
        assert!(proof.prefixes.is_none());
        client.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn proof_with_inclusion() {
        let (transport, client) = logged_in().await;
        transport.script(
            &EVIDENCE_PROOF,
            Reply::Data(json!({
                "graphnData": json!({
                    "block_proof": "b",
                    "proof": ["p1"],
                    "prefixes": ["x"],
                })
                .to_string(),
            })),
        );

        let proof = client.get_proof("ev").await.unwrap().unwrap();
        assert_eq!(proof.proof, Some(json!(["p1"])));
        assert_eq!(proof.prefixes, Some(json!(["x"])));
        client.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn proof_with_null_graphn_data() {
        let (transport, client) = logged_in().await;
        transport.script(&EVIDENCE_PROOF, Reply::Data(json!({ "graphnData": null })));

        assert!(client.get_proof("ev").await.unwrap().is_none());
        client.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn update_private_key_sends_canonical_json() {
        let (transport, client) = logged_in().await;
        transport.script(&UPDATE_USER, Reply::Data(json!({ "id": "u1" })));

        client
            .update_private_key(&json!({ "version": 3, "address": "0xabc" }))
            .await
            .unwrap();

        assert_eq!(
            transport.calls(&UPDATE_USER)[0].variables,
            json!({ "user": { "ethAccount": r#"{"address":"0xabc","version":3}"# } })
        );
        client.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn register_needs_no_session() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.script(&CREATE_USER, Reply::Data(json!({ "id": "user-1" })));
        let remote = Remote::new(transport.clone(), &config());

        let id = register(
            &remote,
            &Credentials::new("bob@example.com", "pw"),
            &json!({ "b": 1, "a": 2 }),
        )
        .await
        .unwrap();

        assert_eq!(id, "user-1");
        let call = &transport.calls(&CREATE_USER)[0];
        assert_eq!(call.auth_header, None);
        assert_eq!(call.variables["user"]["ethAccount"], r#"{"a":2,"b":1}"#);
        assert_eq!(call.variables["password"], "pw");
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_before_login_fails_locally() {
        let (transport, client) = client();
        let err = client.refresh().await.unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::NotLoggedIn)));
        assert!(transport.calls(&REFRESH_TOKEN).is_empty());
        client.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn operation_before_login_fails_unauthorized_at_server() {
        let (transport, client) = client();
        transport.script(&GET_TRACE, Reply::code(401));

        let err = client.get_trace("ev").await.unwrap_err();

        assert_eq!(err.failure_kind(), Some(FailureKind::Unauthorized));
        let calls = transport.calls(&GET_TRACE);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].auth_header, None);
        client.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn explicit_refresh_rotates_tokens() {
        let (transport, client) = logged_in().await;
        transport.script(
            &REFRESH_TOKEN,
            Reply::Data(json!({ "token": "access-1", "refreshToken": "refresh-1" })),
        );

        assert_eq!(client.refresh().await.unwrap(), RefreshOutcome::Applied);
        assert_eq!(
            transport.calls(&REFRESH_TOKEN)[0].variables,
            json!({ "refreshToken": "refresh-0" })
        );
        assert_eq!(transport.header(AUTH_HEADER).as_deref(), Some("access-1"));
        client.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn background_refresh_runs_on_interval() {
        let (transport, client) = logged_in().await;
        transport.script(
            &REFRESH_TOKEN,
            Reply::Data(json!({ "token": "access-bg", "refreshToken": "refresh-bg" })),
        );

        tokio::time::sleep(Duration::from_secs(901)).await;

        assert_eq!(transport.calls(&REFRESH_TOKEN).len(), 1);
        assert_eq!(
            client.session().current_refresh_token().unwrap().as_str(),
            "refresh-bg"
        );
        client.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn failed_background_refresh_keeps_loop_and_login_wins() {
        let (transport, client) = logged_in().await;
        // Every refresh attempt of the first tick faults; the second tick's
        // response arrives late, after a manual login.
        transport
            .script(&REFRESH_TOKEN, Reply::Fault)
            .script(&REFRESH_TOKEN, Reply::Fault)
            .script(&REFRESH_TOKEN, Reply::Fault)
            .script(
                &REFRESH_TOKEN,
                Reply::Delayed(
                    Duration::from_secs(5),
                    Box::new(Reply::Data(
                        json!({ "token": "stale-access", "refreshToken": "stale-refresh" }),
                    )),
                ),
            );

        // First tick: three faulted attempts, loop keeps running
        tokio::time::sleep(Duration::from_secs(901)).await;
        assert_eq!(transport.calls(&REFRESH_TOKEN).len(), 3);
        assert_eq!(
            client.session().current_refresh_token().unwrap().as_str(),
            "refresh-0"
        );

        // Second tick starts a slow refresh
        tokio::time::sleep(Duration::from_secs(900)).await;
        assert_eq!(transport.calls(&REFRESH_TOKEN).len(), 4);

        // A manual login lands while it is in flight
        transport.script(&LOGIN, login_reply("login-access", "login-refresh"));
        client
            .login(&Credentials::new("alice@example.com", "pw"))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(
            client.session().current_refresh_token().unwrap().as_str(),
            "login-refresh"
        );
        assert_eq!(transport.header(AUTH_HEADER).as_deref(), Some("login-access"));
        client.shutdown().await;
    }
}
