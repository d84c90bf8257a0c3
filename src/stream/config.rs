/*!
`config.rs`

Provider configuration parsing for the `/apikey` command argument.

Accepted input forms (checked in this order):
  1. JSON object literal:   {"provider":"gemini","api_key":"abc"}
     (argument trimmed; recognized by a leading '{')
  2. key=value tokens:      provider=gemini key=abc [base=url] [model=name]
  3. bare key shorthand:    sk-123
     (exactly one whitespace token - taken verbatim as the api_key)

Tokenization rules (deliberate backward-compatibility shims, keep exact):
  - Tokens split on runs of whitespace.
  - A token containing '=' splits on the FIRST '=' only, so the value may
    itself contain '=' (key=a=b -> api_key "a=b").
  - Key aliases: key|api_key, base|api_base, provider, model. Anything else
    is silently ignored.
  - A token without '=' counts as a bare api_key only while api_key is still
    unset: the first bare token wins, later bare ones are dropped. Later
    key= tokens still overwrite.
  - The single-token shorthand applies even when that token contains '='.
  - provider values are lower-cased.

Validation: an empty api_key after parsing is an error; no partial config
is ever returned.
*/

use serde::{Deserialize, Serialize};

/// Credentials/settings for a configurable upstream AI provider.
///
/// Serialized as the `/settings/apikey` request body; absent optional
/// fields are omitted entirely rather than sent as null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Required; a config with an empty key is never sent.
    #[serde(default)]
    pub api_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Local validation failures for `/apikey` arguments. These never reach
/// the network; the dispatcher reports them and aborts the submission.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid JSON config")]
    MalformedJson,
    #[error("API key is required")]
    MissingApiKey,
}

/// Parse a `/apikey` argument into a full `ProviderConfig`.
///
/// Idempotent on well-formed input: parsing the same argument twice yields
/// the same config.
pub fn parse_provider_config(raw: &str) -> Result<ProviderConfig, ConfigError> {
    let trimmed = raw.trim();

    // JSON branch short-circuits tokenization entirely. Only the leading
    // object is read; trailing text after it is ignored, not re-tokenized.
    if trimmed.starts_with('{') {
        let mut values = serde_json::Deserializer::from_str(trimmed).into_iter::<ProviderConfig>();
        let cfg = match values.next() {
            Some(Ok(cfg)) => cfg,
            _ => return Err(ConfigError::MalformedJson),
        };
        if cfg.api_key.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        return Ok(cfg);
    }

    let mut cfg = ProviderConfig::default();
    let parts: Vec<&str> = trimmed.split_whitespace().collect();

    if parts.len() == 1 {
        // Bare shorthand: the whole token is the key, '=' included.
        cfg.api_key = parts[0].to_string();
    } else {
        for part in parts {
            if let Some((key, value)) = part.split_once('=') {
                match key {
                    "provider" => cfg.provider = Some(value.to_lowercase()),
                    "key" | "api_key" => cfg.api_key = value.to_string(),
                    "base" | "api_base" => cfg.api_base = Some(value.to_string()),
                    "model" => cfg.model = Some(value.to_string()),
                    _ => {}
                }
            } else if cfg.api_key.is_empty() {
                cfg.api_key = part.to_string();
            }
        }
    }

    if cfg.api_key.is_empty() {
        return Err(ConfigError::MissingApiKey);
    }
    Ok(cfg)
}
