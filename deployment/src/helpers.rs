use std::io::{Cursor, Write};

use anyhow::Context;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::{
    blocking::Response,
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    StatusCode,
};
use serde::de::DeserializeOwned;
use zip::{write::SimpleFileOptions, CompressionMethod, DateTime, ZipWriter};

use crate::{Credential, DeployError};

pub fn encode_base64_utf8(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

pub fn decode_base64_utf8(encoded: &str) -> anyhow::Result<String> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .context("Input is not valid base64")?;
    String::from_utf8(bytes).context("Decoded bytes are not valid UTF-8")
}

pub(crate) fn zip_files(files: &[(&str, &[u8])]) -> anyhow::Result<Vec<u8>> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644);

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in files {
        writer
            .start_file(*name, options)
            .with_context(|| format!("Could not add {} to archive", name))?;
        writer.write_all(content)?;
    }
    Ok(writer.finish()?.into_inner())
}

pub(crate) fn bearer_headers(credential: &Credential) -> Result<HeaderMap, DeployError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", credential.expose()))
        .map_err(|_e| DeployError::InvalidCredential)?;
    value.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, value);
    Ok(headers)
}

pub(crate) fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, DeployError> {
    let status = response.status();
    let body = response.text()?;
    if !status.is_success() {
        return Err(DeployError::ProviderRejected(rejection_message(status, &body)));
    }
    serde_json::from_str(&body).map_err(|e| {
        error!("Could not decode provider response {}: {}", body, e);
        DeployError::ProviderRejected(format!("Unexpected response from provider: {}", e))
    })
}

pub(crate) fn rejected(response: Response) -> DeployError {
    let status = response.status();
    match response.text() {
        Ok(body) => DeployError::ProviderRejected(rejection_message(status, &body)),
        Err(e) => e.into(),
    }
}

// Vercel nests the message under `error`, Netlify and GitHub put it at the top.
pub(crate) fn rejection_message(status: StatusCode, body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let message = parsed.as_ref().and_then(|value| {
        value
            .pointer("/error/message")
            .or_else(|| value.get("message"))
            .or_else(|| value.get("error"))
            .and_then(|m| m.as_str())
            .map(str::to_owned)
    });

    let details: Vec<&str> = parsed
        .as_ref()
        .and_then(|value| value.get("errors"))
        .and_then(|errors| errors.as_array())
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| e.get("message").and_then(|m| m.as_str()))
                .collect()
        })
        .unwrap_or_default();

    match message {
        Some(message) if !details.is_empty() => {
            format!("{}: {}", message.trim_end_matches('.'), details.join(", "))
        }
        Some(message) => message,
        None if !body.trim().is_empty() => body.trim().to_owned(),
        None => format!("Provider responded with HTTP {}", status),
    }
}
