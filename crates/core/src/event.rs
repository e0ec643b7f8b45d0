//! Interpreting frames as stream events.

use serde::Deserialize;
use sillage_model::StreamEvent;

const DATA_PREFIX: &str = "data: ";

#[derive(Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    kind: String,
    content: Option<String>,
}

/// Interprets one frame, producing at most one event.
///
/// Frames that don't carry data are skipped silently. Malformed payloads
/// are reported and skipped, they never abort the stream.
pub fn interpret(frame: &str) -> Option<StreamEvent> {
    let payload = frame.trim().strip_prefix(DATA_PREFIX)?;

    let raw = match serde_json::from_str::<RawEvent>(payload) {
        Ok(raw) => raw,
        Err(err) => {
            warn!("skipping malformed frame: {err}");
            return None;
        }
    };

    let event = match (raw.kind.as_str(), raw.content) {
        ("answer", Some(content)) => StreamEvent::Answer(content),
        ("answer", None) => {
            warn!("skipping answer without content");
            return None;
        }
        ("log", Some(content)) => StreamEvent::Log(content),
        ("error", content) => {
            StreamEvent::RemoteError(content.unwrap_or_default())
        }
        (kind, _) => StreamEvent::Ignored {
            kind: kind.to_owned(),
        },
    };
    Some(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer() {
        assert_eq!(
            interpret(r#"data: {"type": "answer", "content": "시트러스"}"#),
            Some(StreamEvent::Answer("시트러스".to_owned()))
        );
        // Surrounding whitespace is trimmed before the prefix check.
        assert_eq!(
            interpret("\n  data: {\"type\":\"answer\",\"content\":\"\"}  \n"),
            Some(StreamEvent::Answer(String::new()))
        );
    }

    #[test]
    fn test_other_kinds() {
        assert_eq!(
            interpret(r#"data: {"type": "log", "content": "🔎 citrus"}"#),
            Some(StreamEvent::Log("🔎 citrus".to_owned()))
        );
        assert_eq!(
            interpret(r#"data: {"type": "error", "content": "boom"}"#),
            Some(StreamEvent::RemoteError("boom".to_owned()))
        );
        assert_eq!(
            interpret(r#"data: {"type": "usage", "tokens": 42}"#),
            Some(StreamEvent::Ignored {
                kind: "usage".to_owned()
            })
        );
    }

    #[test]
    fn test_not_data() {
        assert_eq!(interpret(""), None);
        assert_eq!(interpret(": keep-alive"), None);
        assert_eq!(interpret("event: answer"), None);
        assert_eq!(interpret(r#"data:{"type":"answer","content":"x"}"#), None);
    }

    #[test]
    fn test_malformed() {
        assert_eq!(interpret("data: {\"type\": \"answer\""), None);
        assert_eq!(interpret("data: [DONE]"), None);
        assert_eq!(interpret(r#"data: {"content": "no type"}"#), None);
        assert_eq!(
            interpret(r#"data: {"type": "answer", "content": 1}"#),
            None
        );
        assert_eq!(interpret(r#"data: {"type": "answer"}"#), None);
    }
}
