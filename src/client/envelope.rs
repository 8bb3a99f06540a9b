//! `{ data: ... }` envelope decoding shared by every endpoint.

// crates.io
use serde_json::Value;
// self
use crate::{_prelude::*, http::ApiResponse};

#[derive(Deserialize)]
struct Envelope<T> {
	data: T,
}

/// Access-token payload returned by the login and refresh endpoints.
#[derive(Deserialize)]
pub(crate) struct TokenPayload {
	#[serde(rename = "accessToken", alias = "access_token")]
	pub(crate) access_token: String,
}

/// Decodes the `data` member of a successful response.
pub(crate) fn decode_data<R>(response: &ApiResponse) -> Result<R>
where
	R: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(&response.body);
	let envelope: Envelope<R> = serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| Error::Decode { source, status: response.status })?;

	Ok(envelope.data)
}

/// Turns a non-2xx response into [`Error::Api`]; 2xx responses pass through.
pub(crate) fn into_success(response: ApiResponse) -> Result<ApiResponse> {
	if response.is_success() {
		Ok(response)
	} else {
		Err(Error::Api { status: response.status, message: error_message(&response) })
	}
}

/// Extracts a human-readable message from an error body.
///
/// Looks at `data.message`, then a top-level `message`; either may be a string or a list of
/// strings. Falls back to the status reason.
pub(crate) fn error_message(response: &ApiResponse) -> String {
	serde_json::from_slice::<Value>(&response.body)
		.ok()
		.and_then(|body| {
			body.pointer("/data/message")
				.and_then(render_message)
				.or_else(|| body.get("message").and_then(render_message))
		})
		.unwrap_or_else(|| status_reason(response.status))
}

fn render_message(value: &Value) -> Option<String> {
	let rendered = match value {
		Value::String(message) => message.trim().to_owned(),
		Value::Array(items) =>
			items.iter().filter_map(Value::as_str).collect::<Vec<_>>().join("; "),
		_ => return None,
	};

	if rendered.is_empty() { None } else { Some(rendered) }
}

fn status_reason(status: u16) -> String {
	let reason = match status {
		400 => "Bad Request",
		401 => "Unauthorized",
		403 => "Forbidden",
		404 => "Not Found",
		409 => "Conflict",
		422 => "Unprocessable Entity",
		429 => "Too Many Requests",
		500 => "Internal Server Error",
		502 => "Bad Gateway",
		503 => "Service Unavailable",
		_ => return format!("HTTP {status}"),
	};

	reason.to_owned()
}
