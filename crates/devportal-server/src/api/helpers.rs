//! Shared API helper functions.

use crate::error::ApiError;
use serde_json::Value;

/// Format a unix timestamp (seconds) as RFC3339.
pub fn format_timestamp_rfc3339(timestamp: u64) -> Result<String, ApiError> {
    let seconds = i64::try_from(timestamp)
        .map_err(|_| ApiError::Internal(anyhow::anyhow!("Invalid timestamp")))?;
    Ok(chrono::DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("Invalid timestamp")))?
        .to_rfc3339())
}

/// Serialize `value` for embedding inside an inline `<script>`
///
/// Characters that could close the script element or break a JS string
/// literal are emitted as unicode escapes.
pub fn script_json(value: &Value) -> String {
    let mut out = String::new();
    for c in value.to_string().chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    out
}

/// Page the OAuth popup lands on; relays `message` to the opener window
pub fn callback_page(message: &Value, target_origin: &str) -> String {
    let message = script_json(message);
    let origin = script_json(&Value::String(target_origin.to_string()));

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Developer Portal</title></head>
<body>
<p id="status">Completing sign-in...</p>
<script>
(function () {{
  var message = {message};
  if (window.opener) {{
    window.opener.postMessage(message, {origin});
    window.close();
  }} else {{
    document.getElementById("status").textContent =
      message.type === "oauth-success"
        ? "Signed in. You can close this window."
        : "Sign-in failed: " + message.error;
  }}
}})();
</script>
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(
            format_timestamp_rfc3339(0).unwrap(),
            "1970-01-01T00:00:00+00:00"
        );
        assert!(format_timestamp_rfc3339(u64::MAX).is_err());
    }

    #[test]
    fn test_script_json_escapes_markup() {
        let escaped = script_json(&json!({"error": "</script><script>alert(1)</script>"}));

        assert!(!escaped.contains('<'));
        assert!(!escaped.contains('>'));
        assert!(escaped.contains("\\u003c/script\\u003e"));
    }

    #[test]
    fn test_callback_page_targets_origin() {
        let page = callback_page(
            &json!({"type": "oauth-success", "payload": {}}),
            "https://portal.example.com",
        );

        assert!(page.contains(r#"postMessage(message, "https://portal.example.com")"#));
        assert!(page.contains(r#""type":"oauth-success""#));
    }
}
