use serde::Serialize;

/// Hands a pretty-printed JSON rendering of `value` to `log_action`.
/// Serialization is skipped entirely unless DEBUG is enabled.
pub(crate) fn with_pretty_json_debug<T, F>(value: &T, log_action: F)
where
    T: Serialize,
    F: FnOnce(&str),
{
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }

    match serde_json::to_string_pretty(value) {
        Ok(pretty) => log_action(pretty.as_str()),
        Err(error) => tracing::debug!(%error, "pretty JSON rendering failed"),
    }
}
