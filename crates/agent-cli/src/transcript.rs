//! Conversation transcript log

use agent_suql::DialogueHistory;
use chrono::{DateTime, TimeZone};
use std::fmt::Display;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

/// Separator written before every session
pub const SEPARATOR: &str = "=====";

/// Format one session block: separator, timestamp, then the dialogue
pub fn format_session<Tz>(history: &DialogueHistory, finished: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "{SEPARATOR}\n{}\n{}\n",
        finished.format("%d/%m/%Y %H:%M:%S"),
        history.to_text("User", "Chatbot")
    )
}

/// Append the session to `path`, creating the file if needed
pub fn append<Tz>(path: &Path, history: &DialogueHistory, finished: &DateTime<Tz>) -> io::Result<()>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(format_session(history, finished).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_empty_session_block() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            format_session(&DialogueHistory::new(), &at),
            "=====\n09/03/2024 14:05:07\n\n"
        );
    }

    #[test]
    fn test_sessions_are_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.log");
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();

        append(&path, &DialogueHistory::new(), &at).unwrap();
        append(&path, &DialogueHistory::new(), &at).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches(SEPARATOR).count(), 2);
        assert!(content.starts_with("=====\n09/03/2024 14:05:07\n"));
    }
}
