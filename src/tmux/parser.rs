//! Parsers for tmux `-F` format output.

use chrono::DateTime;
use tracing::debug;

use crate::session::SessionRecord;

use super::FIELD_DELIM;

/// Number of fields in [`super::SESSION_FORMAT`].
const SESSION_FIELDS: usize = 6;

/// Parse `list-sessions` output, one session per line.
///
/// Lines with too few fields or unparseable numbers are skipped.
pub(super) fn parse_session_list(output: &str) -> Vec<SessionRecord> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(parse_session_line)
        .collect()
}

pub(super) fn parse_session_line(line: &str) -> Option<SessionRecord> {
    let parts: Vec<&str> = line.trim().split(FIELD_DELIM).collect();
    if parts.len() < SESSION_FIELDS {
        debug!(line, fields = parts.len(), "dropping short session line");
        return None;
    }

    let Some(created) = parts[1]
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
    else {
        debug!(line, "dropping session line with invalid creation time");
        return None;
    };
    let Ok(window_count) = parts[3].parse::<u32>() else {
        debug!(line, "dropping session line with invalid window count");
        return None;
    };

    Some(SessionRecord {
        name: parts[0].to_string(),
        created,
        attached: parts[2].parse::<u32>().is_ok_and(|clients| clients > 0),
        window_count,
        current_window: parts[4].to_string(),
        session_id: parts[5].to_string(),
    })
}

/// Pick the active pane from `list-panes -F '#{pane_active}:#{pane_id}'`.
///
/// Falls back to the first listed pane when none is flagged active.
pub(super) fn parse_active_pane(output: &str) -> Option<String> {
    let panes: Vec<(&str, &str)> = output
        .lines()
        .filter_map(|line| line.trim().split_once(FIELD_DELIM))
        .filter(|(_, pane_id)| !pane_id.is_empty())
        .collect();

    panes
        .iter()
        .find(|(active, _)| *active == "1")
        .or_else(|| panes.first())
        .map(|(_, pane_id)| (*pane_id).to_string())
}

/// Extract the version from `tmux -V` output (`tmux 3.3a` -> `3.3a`).
pub(super) fn parse_version(output: &str) -> String {
    output
        .split_whitespace()
        .last()
        .unwrap_or("unknown")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_session_lines() {
        let output = "work:1700000000:1:3:@4:$1\nscratch:1700000100:0:1:@7:$2\n";
        let sessions = parse_session_list(output);

        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].name, "work");
        assert_eq!(sessions[0].created.timestamp(), 1_700_000_000);
        assert!(sessions[0].attached);
        assert_eq!(sessions[0].window_count, 3);
        assert_eq!(sessions[0].current_window, "@4");
        assert_eq!(sessions[0].session_id, "$1");
        assert!(!sessions[1].attached);
    }

    #[test]
    fn drops_lines_with_fewer_than_six_fields() {
        let output = "broken:1700000000:1\nwork:1700000000:0:1:@1:$0\n\n";
        let sessions = parse_session_list(output);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].name, "work");
    }

    #[test]
    fn drops_lines_with_non_numeric_fields() {
        let output = "bad:yesterday:0:1:@1:$0\nbad2:1700000000:0:many:@1:$1";
        assert!(parse_session_list(output).is_empty());
    }

    #[test]
    fn multiple_attached_clients_count_as_attached() {
        let record = parse_session_line("pair:1700000000:2:1:@1:$3").unwrap();
        assert!(record.attached);
    }

    #[test]
    fn active_pane_prefers_flagged_pane() {
        assert_eq!(
            parse_active_pane("0:%1\n1:%2\n0:%3"),
            Some("%2".to_string())
        );
    }

    #[test]
    fn active_pane_falls_back_to_first_listed() {
        assert_eq!(parse_active_pane("0:%5\n0:%6"), Some("%5".to_string()));
        assert_eq!(parse_active_pane(""), None);
        assert_eq!(parse_active_pane("garbage"), None);
    }

    #[test]
    fn version_is_last_token() {
        assert_eq!(parse_version("tmux 3.3a"), "3.3a");
        assert_eq!(parse_version("tmux next-3.5"), "next-3.5");
        assert_eq!(parse_version(""), "unknown");
    }
}
