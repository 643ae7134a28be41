//! Log file location, escape-code removal and UTC timestamps.
use std::path::PathBuf;

/// Drop terminal escape codes so the log file stays plain text.
///
/// A CSI sequence (`ESC [`) runs up to its final byte in `@`..=`~`. Any
/// other escape swallows exactly one following character.
pub(super) fn strip_ansi(s: &str) -> String {
    let mut plain = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\x1b' {
            plain.push(c);
            continue;
        }
        if chars.next() == Some('[') {
            chars.by_ref().find(|f| ('@'..='~').contains(f));
        }
    }
    plain
}

/// `$XDG_CACHE_HOME/devsetup`, falling back to `~/.cache/devsetup`. Created
/// on demand; `None` if that fails.
pub(super) fn cache_dir() -> Option<PathBuf> {
    let base = match std::env::var_os("XDG_CACHE_HOME") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => std::env::var_os("HOME")
            .map_or_else(|| PathBuf::from("."), PathBuf::from)
            .join(".cache"),
    };
    let dir = base.join("devsetup");
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir)
}

/// Log file for one invocation of `command`.
pub(super) fn log_file_path(command: &str) -> Option<PathBuf> {
    cache_dir().map(|dir| dir.join(command).with_extension("log"))
}

pub(super) fn format_utc_datetime() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

pub(super) fn format_utc_time() -> String {
    chrono::Utc::now().format("%H:%M:%S").to_string()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn strip_ansi_removes_colors_and_cursor_codes() {
        assert_eq!(strip_ansi("\x1b[31mERROR\x1b[0m apt failed"), "ERROR apt failed");
        assert_eq!(
            strip_ansi("\x1b[1;34m==>\x1b[0m \x1b[1mInstall Go\x1b[0m"),
            "==> Install Go"
        );
        assert_eq!(strip_ansi("\x1b[2J\x1b[Kdone"), "done");
        assert_eq!(strip_ansi("\x1b7saved"), "saved");
    }

    #[test]
    fn strip_ansi_leaves_plain_text_alone() {
        assert_eq!(strip_ansi(""), "");
        assert_eq!(strip_ansi("12. Configure shell profiles"), "12. Configure shell profiles");
    }

    #[test]
    fn timestamps_have_fixed_width() {
        let time = format_utc_time();
        assert_eq!(time.len(), 8);
        assert_eq!(time.matches(':').count(), 2);

        let datetime = format_utc_datetime();
        assert_eq!(datetime.len(), 19);
        assert_eq!(datetime.chars().nth(10), Some(' '));
    }
}
