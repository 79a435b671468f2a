use crate::backup_name::{parse_backup_filename, BACKUP_SUFFIX};
use anyhow::{anyhow, Result};

/// Catalog view over a raw bucket listing: keeps only backup objects,
/// optionally restricted to `"{prefix}."` keys, sorted most recent first.
/// Entries without a timestamp sort after every timestamped entry; the sort
/// is stable, so equal stamps keep their listing order.
pub fn sort_backups(keys: &[String], prefix: Option<&str>) -> Vec<String> {
    let mut backups: Vec<String> = keys
        .iter()
        .filter(|key| key.ends_with(BACKUP_SUFFIX))
        .filter(|key| match prefix {
            Some(prefix) => key.starts_with(&format!("{prefix}.")),
            None => true,
        })
        .cloned()
        .collect();
    backups.sort_by(|a, b| sort_stamp(b).cmp(&sort_stamp(a)));
    backups
}

/// Most recent backup in the listing, if any.
pub fn latest(keys: &[String], prefix: Option<&str>) -> Option<String> {
    sort_backups(keys, prefix).into_iter().next()
}

/// Backups whose timestamp falls on the given `YYYYMMDD` day. Entries without
/// a timestamp never match.
pub fn backups_on_date(keys: &[String], prefix: Option<&str>, date: &str) -> Vec<String> {
    sort_backups(keys, prefix)
        .into_iter()
        .filter(|key| {
            let (_, timestamp) = parse_backup_filename(key);
            timestamp.is_some_and(|ts| ts.starts_with(date))
        })
        .collect()
}

pub fn ensure_date(date: &str) -> Result<()> {
    if date.len() != 8 || !date.bytes().all(|b| b.is_ascii_digit()) {
        return Err(anyhow!("date must be YYYYMMDD (8 digits), got: {date}"));
    }
    Ok(())
}

fn sort_stamp(key: &str) -> String {
    let (_, timestamp) = parse_backup_filename(key);
    timestamp.unwrap_or_else(|| "0".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn prefix_filter_and_ordering() {
        let listing = keys(&[
            "a.20240101000000.backup.tar.gz",
            "b.20240102000000.backup.tar.gz",
            "a.backup.tar.gz",
        ]);
        assert_eq!(
            sort_backups(&listing, Some("a")),
            keys(&["a.20240101000000.backup.tar.gz", "a.backup.tar.gz"])
        );
    }

    #[test]
    fn sorts_most_recent_first_without_prefix() {
        let listing = keys(&[
            "a.20240101000000.backup.tar.gz",
            "b.20240103000000.backup.tar.gz",
            "c.20240102000000.backup.tar.gz",
        ]);
        assert_eq!(
            sort_backups(&listing, None),
            keys(&[
                "b.20240103000000.backup.tar.gz",
                "c.20240102000000.backup.tar.gz",
                "a.20240101000000.backup.tar.gz",
            ])
        );
    }

    #[test]
    fn equal_stamps_keep_listing_order() {
        let listing = keys(&[
            "x.20240101000000.backup.tar.gz",
            "y.20240101000000.backup.tar.gz",
            "x.backup.tar.gz",
            "y.backup.tar.gz",
        ]);
        assert_eq!(sort_backups(&listing, None), listing);
    }

    #[test]
    fn prefix_must_match_up_to_a_dot() {
        let listing = keys(&[
            "ab.20240101000000.backup.tar.gz",
            "a.20240101000000.backup.tar.gz",
        ]);
        assert_eq!(
            sort_backups(&listing, Some("a")),
            keys(&["a.20240101000000.backup.tar.gz"])
        );
    }

    #[test]
    fn non_backup_keys_are_dropped() {
        let listing = keys(&["a.backup.tar.gz", "notes.txt", "a.tar.gz"]);
        assert_eq!(sort_backups(&listing, None), keys(&["a.backup.tar.gz"]));
    }

    #[test]
    fn latest_picks_the_newest() {
        let listing = keys(&[
            "a.20240101000000.backup.tar.gz",
            "a.20240105000000.backup.tar.gz",
        ]);
        assert_eq!(
            latest(&listing, Some("a")),
            Some("a.20240105000000.backup.tar.gz".to_string())
        );
        assert_eq!(latest(&[], None), None);
    }

    #[test]
    fn by_date_excludes_other_days_and_untimestamped() {
        let listing = keys(&[
            "a.20240101090000.backup.tar.gz",
            "a.20240102000000.backup.tar.gz",
            "a.20240101100000.backup.tar.gz",
            "a.backup.tar.gz",
        ]);
        assert_eq!(
            backups_on_date(&listing, Some("a"), "20240101"),
            keys(&[
                "a.20240101100000.backup.tar.gz",
                "a.20240101090000.backup.tar.gz",
            ])
        );
    }

    #[test]
    fn date_validation() {
        assert!(ensure_date("20240101").is_ok());
        assert!(ensure_date("2024-01-01").is_err());
        assert!(ensure_date("202401").is_err());
        assert!(ensure_date("2024010a").is_err());
    }
}
