use std::path::PathBuf;

use chrono::{DateTime, Datelike, Utc};

use turnlog_config::{LoggerConfig, RotationMode};

/// Shard identifier for the calendar month of `now`, formatted
/// `YYYY-MM`.
///
/// Boundaries follow UTC months — every generated timestamp in the pipeline
/// is UTC, so the store a record lands in never depends on the host's
/// timezone.  Pure function of `now`; nothing is cached between calls, so a
/// month change is picked up by the very next invocation.
pub fn shard_id(now: DateTime<Utc>) -> String {
    format!("{:04}-{:02}", now.year(), now.month())
}

/// The shard label recorded on the canonical record: the monthly id, or the
/// fixed store stem in `single` mode.
pub fn shard_label(config: &LoggerConfig, now: DateTime<Utc>) -> String {
    match config.memory.rotation {
        RotationMode::Monthly => shard_id(now),
        RotationMode::Single => config
            .memory
            .single_store
            .trim_end_matches(".mv2")
            .to_string(),
    }
}

/// Physical store file for `now` under the configured memory directory.
/// The same shard id always maps to the same path.
pub fn store_path(config: &LoggerConfig, now: DateTime<Utc>) -> PathBuf {
    let dir = PathBuf::from(&config.memory.dir);
    match config.memory.rotation {
        RotationMode::Monthly => dir.join(format!("memory_{}.mv2", shard_id(now))),
        RotationMode::Single => dir.join(&config.memory.single_store),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 10, 30, 0).unwrap()
    }

    #[test]
    fn same_month_yields_identical_id_and_path() {
        let cfg = LoggerConfig::default();
        let a = at(2026, 2, 1);
        let b = at(2026, 2, 28);
        assert_eq!(shard_id(a), shard_id(b));
        assert_eq!(store_path(&cfg, a), store_path(&cfg, b));
    }

    #[test]
    fn next_month_yields_different_id() {
        assert_eq!(shard_id(at(2026, 2, 19)), "2026-02");
        assert_eq!(shard_id(at(2026, 3, 1)), "2026-03");
    }

    #[test]
    fn december_to_january_boundary() {
        assert_eq!(shard_id(at(2026, 12, 31)), "2026-12");
        assert_eq!(shard_id(at(2027, 1, 1)), "2027-01");
    }

    #[test]
    fn monthly_path_embeds_shard_id() {
        let mut cfg = LoggerConfig::default();
        cfg.memory.dir = "/var/lib/turnlog".to_string();
        assert_eq!(
            store_path(&cfg, at(2026, 2, 19)),
            PathBuf::from("/var/lib/turnlog/memory_2026-02.mv2")
        );
    }

    #[test]
    fn single_mode_ignores_the_clock() {
        let mut cfg = LoggerConfig::default();
        cfg.memory.dir = "/var/lib/turnlog".to_string();
        cfg.memory.rotation = RotationMode::Single;
        let expected = PathBuf::from("/var/lib/turnlog/memory.mv2");
        assert_eq!(store_path(&cfg, at(2026, 2, 19)), expected);
        assert_eq!(store_path(&cfg, at(2031, 7, 4)), expected);
        assert_eq!(shard_label(&cfg, at(2026, 2, 19)), "memory");
    }
}
