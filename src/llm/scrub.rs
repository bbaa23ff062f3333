use crate::error::GenerationError;
use std::borrow::Cow;

const MAX_ERROR_BODY_CHARS: usize = 200;
const REDACTED: &str = "[REDACTED]";

/// Key prefixes whose whole token is redacted.
const TOKEN_PREFIXES: [&str; 5] = ["sk-", "gsk_", "hf_", "xai-", "AIza"];

/// Markers whose following value is redacted; the marker itself is kept.
const VALUE_MARKERS: [&str; 7] = [
    "Bearer ",
    "bearer ",
    "api_key=",
    "access_token=",
    "\"api_key\":\"",
    "\"access_token\":\"",
    "\"token\":\"",
];

fn is_secret_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '+' | '/' | '=')
}

fn token_end(input: &str, from: usize) -> usize {
    input[from..]
        .char_indices()
        .find(|&(_, c)| !is_secret_char(c))
        .map_or(input.len(), |(i, _)| from + i)
}

/// Redact every occurrence of `needle`. With `keep_marker` only the value
/// after the needle goes; otherwise the needle and its token go together.
fn redact_after(text: &mut String, needle: &str, keep_marker: bool) -> bool {
    let mut modified = false;
    let mut search_from = 0;

    while let Some(rel) = text[search_from..].find(needle) {
        let start = search_from + rel;
        let value_start = start + needle.len();
        let end = token_end(text, value_start);

        let at_boundary = keep_marker
            || text[..start]
                .chars()
                .next_back()
                .is_none_or(|c| !is_secret_char(c));

        if end == value_start || !at_boundary {
            search_from = value_start;
            continue;
        }

        let replace_from = if keep_marker { value_start } else { start };
        text.replace_range(replace_from..end, REDACTED);
        modified = true;
        search_from = replace_from + REDACTED.len();
    }

    modified
}

/// Redact API keys and bearer tokens from provider error text.
pub fn redact_secrets(input: &str) -> Cow<'_, str> {
    let suspicious = TOKEN_PREFIXES
        .iter()
        .chain(VALUE_MARKERS.iter())
        .any(|needle| input.contains(needle));
    if !suspicious {
        return Cow::Borrowed(input);
    }

    let mut text = input.to_string();
    for prefix in TOKEN_PREFIXES {
        redact_after(&mut text, prefix, false);
    }
    for marker in VALUE_MARKERS {
        redact_after(&mut text, marker, true);
    }
    Cow::Owned(text)
}

/// Redact secrets and cap the length of a provider error body.
pub fn sanitize_error_body(input: &str) -> String {
    let redacted = redact_secrets(input.trim());
    if redacted.chars().count() <= MAX_ERROR_BODY_CHARS {
        return redacted.into_owned();
    }

    let cut = redacted
        .char_indices()
        .nth(MAX_ERROR_BODY_CHARS)
        .map_or(redacted.len(), |(i, _)| i);
    format!("{}...", &redacted[..cut])
}

/// Classify a non-success HTTP reply into a [`GenerationError`].
pub async fn api_error(provider: &str, response: reqwest::Response) -> GenerationError {
    let status = response.status();
    let retry_after_secs = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok());
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read provider error body>".to_string());

    match status.as_u16() {
        401 | 403 => GenerationError::Auth {
            provider: provider.to_string(),
        },
        429 => GenerationError::RateLimited {
            provider: provider.to_string(),
            retry_after_secs,
        },
        code => GenerationError::Request {
            provider: provider.to_string(),
            status: code,
            message: sanitize_error_body(&body),
        },
    }
}

/// Map a transport-level failure (DNS, connect, timeout) into a [`GenerationError`].
pub fn transport_error(provider: &str, err: &reqwest::Error) -> GenerationError {
    let message = if err.is_timeout() {
        "request timed out".to_string()
    } else {
        sanitize_error_body(&err.to_string())
    };
    GenerationError::Unreachable {
        provider: provider.to_string(),
        message,
    }
}
