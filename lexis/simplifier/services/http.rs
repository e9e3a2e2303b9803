use std::{collections::BTreeMap, thread, time::Duration};

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::{
    EntityType, MaskedLanguageModel, PartOfSpeech, Prediction, ServiceError, SyntaxTagger,
    TaggedToken,
};

/// Timeout and bounded-retry settings shared by the HTTP collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per call, including the first.
    pub max_attempts: u32,
    /// Per-attempt timeout.
    pub timeout: Duration,
    /// Pause between attempts.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            timeout: Duration::from_millis(4_000),
            backoff: Duration::from_millis(150),
        }
    }
}

impl RetryPolicy {
    /// Runs `call`, retrying retryable failures until the attempt budget is spent.
    pub fn run<T>(
        &self,
        mut call: impl FnMut() -> Result<T, ServiceError>,
    ) -> Result<T, ServiceError> {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match call() {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < attempts => {
                    if !self.backoff.is_zero() {
                        thread::sleep(self.backoff);
                    }
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn client(&self) -> Result<Client, ServiceError> {
        Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("lexis-simplifier/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| ServiceError::Unavailable(err.to_string()))
    }

    fn classify(&self, err: &reqwest::Error) -> ServiceError {
        if err.is_timeout() {
            ServiceError::Timeout(self.timeout)
        } else if err.is_decode() {
            ServiceError::Malformed(err.to_string())
        } else {
            ServiceError::Transport(err.to_string())
        }
    }
}

#[derive(Serialize)]
struct FillMaskRequest<'a> {
    inputs: &'a str,
    parameters: FillMaskParameters,
}

#[derive(Serialize)]
struct FillMaskParameters {
    top_k: usize,
}

#[derive(Deserialize)]
struct FillMaskEntry {
    token_str: String,
    score: f32,
}

/// Fill-mask client speaking the inference-API JSON shape
/// (`{inputs, parameters:{top_k}}` in, `[{token_str, score}]` out).
#[derive(Debug, Clone)]
pub struct HttpMaskedLanguageModel {
    client: Client,
    endpoint: String,
    mask_token: String,
    policy: RetryPolicy,
}

impl HttpMaskedLanguageModel {
    /// Creates a client for `endpoint`.
    pub fn new(
        endpoint: impl Into<String>,
        mask_token: impl Into<String>,
        policy: RetryPolicy,
    ) -> Result<Self, ServiceError> {
        Ok(Self {
            client: policy.client()?,
            endpoint: endpoint.into(),
            mask_token: mask_token.into(),
            policy,
        })
    }

    fn request(&self, masked: &str, top_k: usize) -> Result<Vec<Prediction>, ServiceError> {
        let body = FillMaskRequest {
            inputs: masked,
            parameters: FillMaskParameters { top_k },
        };
        let entries: Vec<FillMaskEntry> = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .and_then(|response| response.json::<Vec<FillMaskEntry>>())
            .map_err(|err| self.policy.classify(&err))?;
        Ok(entries
            .into_iter()
            .take(top_k)
            .map(|entry| Prediction::new(entry.token_str, entry.score))
            .collect())
    }
}

impl MaskedLanguageModel for HttpMaskedLanguageModel {
    fn mask_token(&self) -> &str {
        &self.mask_token
    }

    fn fill_mask(&self, masked: &str, top_k: usize) -> Result<Vec<Prediction>, ServiceError> {
        self.policy.run(|| self.request(masked, top_k))
    }
}

#[derive(Serialize)]
struct TagRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct TagResponse {
    tokens: Vec<WireToken>,
}

#[derive(Deserialize)]
struct WireToken {
    text: String,
    pos: String,
    #[serde(default)]
    tag: String,
    #[serde(default)]
    dep: String,
    #[serde(default)]
    head: Option<usize>,
    #[serde(default)]
    morph: BTreeMap<String, String>,
    #[serde(default)]
    ent_type: String,
    #[serde(default)]
    lemma: String,
}

impl From<WireToken> for TaggedToken {
    fn from(mut wire: WireToken) -> Self {
        let lemma = if wire.lemma.is_empty() {
            wire.text.to_lowercase()
        } else {
            wire.lemma
        };
        Self {
            pos: PartOfSpeech::parse(&wire.pos),
            tag: wire.tag,
            dependency: wire.dep,
            head: wire.head,
            tense: wire.morph.remove("Tense"),
            number: wire.morph.remove("Number"),
            entity: EntityType::parse(&wire.ent_type),
            lemma,
            text: wire.text,
        }
    }
}

/// Tagging client posting `{text}` and reading `{tokens:[{text, pos, tag, dep, head, morph, ent_type, lemma}]}`.
#[derive(Debug, Clone)]
pub struct HttpSyntaxTagger {
    client: Client,
    endpoint: String,
    policy: RetryPolicy,
}

impl HttpSyntaxTagger {
    /// Creates a client for `endpoint`.
    pub fn new(endpoint: impl Into<String>, policy: RetryPolicy) -> Result<Self, ServiceError> {
        Ok(Self {
            client: policy.client()?,
            endpoint: endpoint.into(),
            policy,
        })
    }

    fn request(&self, sentence: &str) -> Result<Vec<TaggedToken>, ServiceError> {
        let response: TagResponse = self
            .client
            .post(&self.endpoint)
            .json(&TagRequest { text: sentence })
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .and_then(|response| response.json::<TagResponse>())
            .map_err(|err| self.policy.classify(&err))?;
        Ok(response.tokens.into_iter().map(TaggedToken::from).collect())
    }
}

impl SyntaxTagger for HttpSyntaxTagger {
    fn tag(&self, sentence: &str) -> Result<Vec<TaggedToken>, ServiceError> {
        self.policy.run(|| self.request(sentence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn retries_transport_failures_until_budget_is_spent() {
        let policy = RetryPolicy {
            max_attempts: 3,
            timeout: Duration::from_millis(10),
            backoff: Duration::ZERO,
        };
        let calls = Cell::new(0);
        let result: Result<(), ServiceError> = policy.run(|| {
            calls.set(calls.get() + 1);
            Err(ServiceError::Transport("refused".into()))
        });
        assert!(result.is_err());
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn does_not_retry_malformed_responses() {
        let policy = RetryPolicy {
            backoff: Duration::ZERO,
            ..RetryPolicy::default()
        };
        let calls = Cell::new(0);
        let result: Result<(), ServiceError> = policy.run(|| {
            calls.set(calls.get() + 1);
            Err(ServiceError::Malformed("not json".into()))
        });
        assert_eq!(result, Err(ServiceError::Malformed("not json".into())));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn recovers_after_a_timeout() {
        let policy = RetryPolicy {
            backoff: Duration::ZERO,
            ..RetryPolicy::default()
        };
        let calls = Cell::new(0);
        let result = policy.run(|| {
            calls.set(calls.get() + 1);
            if calls.get() == 1 {
                Err(ServiceError::Timeout(Duration::from_millis(1)))
            } else {
                Ok("filled")
            }
        });
        assert_eq!(result, Ok("filled"));
    }

    #[test]
    fn wire_tokens_map_morphology_and_entities() {
        let wire: WireToken = serde_json::from_str(
            r#"{"text":"Paris","pos":"PROPN","dep":"nsubj","head":1,"morph":{"Number":"Sing"},"ent_type":"GPE"}"#,
        )
        .unwrap();
        let token = TaggedToken::from(wire);
        assert_eq!(token.pos, PartOfSpeech::Propn);
        assert_eq!(token.number.as_deref(), Some("Sing"));
        assert_eq!(token.entity, Some(EntityType::GeoPolitical));
        assert_eq!(token.lemma, "paris");
    }
}
