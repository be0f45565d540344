use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const POWER_SUPPLY_ROOT: &str = "/sys/class/power_supply";

/// Read the first battery charge level (percent) found under `root`
pub fn read_level(root: &Path) -> Option<u8> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(root)
        .ok()?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .collect();
    entries.sort();
    entries.iter().find_map(|dir| {
        let kind = std::fs::read_to_string(dir.join("type")).ok()?;
        if kind.trim() != "Battery" {
            return None;
        }
        let capacity = std::fs::read_to_string(dir.join("capacity")).ok()?;
        capacity.trim().parse::<u8>().ok().map(|v| v.min(100))
    })
}

/// Re-arming battery poll driven by the main loop
pub struct BatteryMonitor {
    root: PathBuf,
    interval: Duration,
    next_poll: Option<Instant>,
}

impl BatteryMonitor {
    pub fn new(interval: Duration) -> Self {
        Self::with_root(PathBuf::from(POWER_SUPPLY_ROOT), interval)
    }

    pub fn with_root(root: PathBuf, interval: Duration) -> Self {
        Self {
            root,
            interval,
            next_poll: None,
        }
    }

    /// Returns a fresh reading when a poll is due, `None` otherwise
    pub fn poll(&mut self, now: Instant) -> Option<Option<u8>> {
        if self.next_poll.is_some_and(|t| now < t) {
            return None;
        }
        self.next_poll = Some(now + self.interval);
        Some(read_level(&self.root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_supply(root: &Path, name: &str, kind: &str, capacity: &str) {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("type"), kind).unwrap();
        std::fs::write(dir.join("capacity"), capacity).unwrap();
    }

    #[test]
    fn test_reads_battery_skipping_mains() {
        let dir = tempfile::tempdir().unwrap();
        fake_supply(dir.path(), "AC", "Mains\n", "0\n");
        fake_supply(dir.path(), "BAT0", "Battery\n", "87\n");
        assert_eq!(read_level(dir.path()), Some(87));
    }

    #[test]
    fn test_no_battery() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_level(dir.path()), None);
        assert_eq!(read_level(&dir.path().join("missing")), None);
    }

    #[test]
    fn test_poll_rearms() {
        let dir = tempfile::tempdir().unwrap();
        fake_supply(dir.path(), "BAT0", "Battery", "50");
        let mut monitor = BatteryMonitor::with_root(dir.path().to_path_buf(), Duration::from_secs(60));
        let start = Instant::now();
        assert_eq!(monitor.poll(start), Some(Some(50)));
        assert_eq!(monitor.poll(start + Duration::from_secs(30)), None);
        assert_eq!(monitor.poll(start + Duration::from_secs(61)), Some(Some(50)));
    }
}
