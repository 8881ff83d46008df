use crate::ResponseBody;

/// Decodes a response body the way the request asked for.
///
/// With `json` set, a body that parses as JSON becomes
/// [`ResponseBody::Json`]; anything else (including an empty body) is kept as
/// text so no payload is lost.
pub(crate) fn decode_body(body: String, json: bool) -> ResponseBody {
    if !json || body.trim().is_empty() {
        return ResponseBody::Text(body);
    }
    match serde_json::from_str(&body) {
        Ok(value) => ResponseBody::Json(value),
        Err(_) => ResponseBody::Text(body),
    }
}
