use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

/// Every backup object ends with this suffix, with or without a timestamp:
/// `{name}.{YYYYMMDDHHMMSS}.backup.tar.gz` or `{name}.backup.tar.gz`.
pub const BACKUP_SUFFIX: &str = ".backup.tar.gz";

const STAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year][month][day][hour][minute][second]");

/// 14-digit `YYYYMMDDHHMMSS` stamp of the current local time. Falls back to
/// UTC when the local offset cannot be determined.
pub fn current_timestamp() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    now.format(STAMP_FORMAT).unwrap_or_default()
}

/// Builds a backup filename for `container`. With `use_timestamp`, the
/// explicit `timestamp` is used when given, the current time otherwise.
pub fn backup_filename(container: &str, use_timestamp: bool, timestamp: Option<&str>) -> String {
    if use_timestamp {
        let ts = timestamp.map(str::to_string).unwrap_or_else(current_timestamp);
        format!("{container}.{ts}{BACKUP_SUFFIX}")
    } else {
        format!("{container}{BACKUP_SUFFIX}")
    }
}

/// Splits a backup filename into `(container, timestamp)`. Filenames that do
/// not follow the convention fall back to stripping the last two
/// dot-extensions and carry no timestamp.
pub fn parse_backup_filename(filename: &str) -> (String, Option<String>) {
    if let Some(stem) = filename.strip_suffix(BACKUP_SUFFIX) {
        if !stem.is_empty() {
            if let Some((name, ts)) = stem.rsplit_once('.') {
                if !name.is_empty() && is_timestamp(ts) {
                    return (name.to_string(), Some(ts.to_string()));
                }
            }
            return (stem.to_string(), None);
        }
    }
    (strip_two_extensions(filename).to_string(), None)
}

/// Renders a 14-digit stamp as `YYYY-MM-DD HH:MM:SS` for listings.
pub fn format_timestamp(ts: &str) -> String {
    if !is_timestamp(ts) {
        return ts.to_string();
    }
    format!(
        "{}-{}-{} {}:{}:{}",
        &ts[..4],
        &ts[4..6],
        &ts[6..8],
        &ts[8..10],
        &ts[10..12],
        &ts[12..14]
    )
}

pub(crate) fn is_timestamp(s: &str) -> bool {
    s.len() == 14 && s.bytes().all(|b| b.is_ascii_digit())
}

fn strip_two_extensions(filename: &str) -> &str {
    let mut name = filename;
    for _ in 0..2 {
        match name.rfind('.') {
            // A leading dot is a hidden-file marker, not an extension.
            Some(idx) if idx > 0 => name = &name[..idx],
            _ => break,
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_with_timestamp() {
        let filename = backup_filename("kali-vbox", true, Some("20240101120000"));
        assert_eq!(filename, "kali-vbox.20240101120000.backup.tar.gz");
        assert_eq!(
            parse_backup_filename(&filename),
            ("kali-vbox".to_string(), Some("20240101120000".to_string()))
        );
    }

    #[test]
    fn round_trip_without_timestamp() {
        let filename = backup_filename("kali-vbox", false, None);
        assert_eq!(filename, "kali-vbox.backup.tar.gz");
        assert_eq!(parse_backup_filename(&filename), ("kali-vbox".to_string(), None));
    }

    #[test]
    fn generated_timestamp_is_fourteen_digits() {
        let filename = backup_filename("box", true, None);
        let (name, ts) = parse_backup_filename(&filename);
        assert_eq!(name, "box");
        let ts = ts.expect("generated name must carry a timestamp");
        assert_eq!(ts.len(), 14);
        assert!(ts.bytes().all(|b| b.is_ascii_digit()));
    }

    #[test]
    fn container_name_may_contain_dots() {
        assert_eq!(
            parse_backup_filename("my.box.20240102030405.backup.tar.gz"),
            ("my.box".to_string(), Some("20240102030405".to_string()))
        );
    }

    #[test]
    fn non_numeric_segment_is_part_of_the_name() {
        assert_eq!(
            parse_backup_filename("archive.notdigits.backup.tar.gz"),
            ("archive.notdigits".to_string(), None)
        );
    }

    #[test]
    fn thirteen_digit_stamp_is_not_a_timestamp() {
        assert_eq!(
            parse_backup_filename("a.2024010112000.backup.tar.gz"),
            ("a.2024010112000".to_string(), None)
        );
    }

    #[test]
    fn unrecognized_filename_loses_two_extensions() {
        assert_eq!(parse_backup_filename("foo.bar.gz"), ("foo".to_string(), None));
        assert_eq!(parse_backup_filename("foo.gz"), ("foo".to_string(), None));
        assert_eq!(parse_backup_filename("plain"), ("plain".to_string(), None));
    }

    #[test]
    fn timestamp_display_format() {
        assert_eq!(format_timestamp("20240101120000"), "2024-01-01 12:00:00");
        assert_eq!(format_timestamp("junk"), "junk");
    }
}
