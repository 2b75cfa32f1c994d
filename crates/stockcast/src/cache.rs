//! File-backed snapshot cache with time-based expiry
//!
//! One JSON file per (symbol, period) under the configured directory. The
//! file's modification time is the entry's creation time; nothing about
//! expiry is stored in the content. Expired entries are left on disk and
//! overwritten by the next `put`.
//!
//! Failures never escape: a read error or corrupt file is a miss, a write
//! error is logged and dropped.

use crate::config::CacheConfig;
use crate::error::Result;
use crate::models::{Period, StockSnapshot};
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};

/// Snapshot cache keyed by (symbol, period)
#[derive(Debug, Clone)]
pub struct HistoryCache {
    config: CacheConfig,
}

impl HistoryCache {
    pub fn new(config: CacheConfig) -> Self {
        Self { config }
    }

    pub fn ttl(&self) -> Duration {
        self.config.ttl
    }

    /// File name for a (symbol, period) entry
    ///
    /// Characters outside `[A-Z0-9.^=-]` are percent-encoded byte by byte, so
    /// distinct symbols never share a file and none can leave the directory.
    pub fn key(symbol: &str, period: Period) -> String {
        let mut encoded = String::new();
        for c in symbol.trim().to_ascii_uppercase().chars() {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=') {
                encoded.push(c);
            } else {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    encoded.push_str(&format!("%{byte:02X}"));
                }
            }
        }
        format!("{encoded}_{period}.json")
    }

    pub fn path(&self, symbol: &str, period: Period) -> PathBuf {
        self.config.dir.join(Self::key(symbol, period))
    }

    /// Look up a valid entry as of now
    pub fn get(&self, symbol: &str, period: Period) -> Option<StockSnapshot> {
        self.get_at(symbol, period, SystemTime::now())
    }

    /// Look up an entry that is still valid at `now`
    pub fn get_at(&self, symbol: &str, period: Period, now: SystemTime) -> Option<StockSnapshot> {
        let path = self.path(symbol, period);
        match self.read_entry(&path, now) {
            Ok(Some(snapshot)) => {
                debug!("Cache hit for {}", path.display());
                Some(snapshot)
            }
            Ok(None) => {
                debug!("Cache miss for {}", path.display());
                None
            }
            Err(e) => {
                warn!("Error loading from cache {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Store a snapshot, replacing any previous entry
    pub fn put(&self, symbol: &str, period: Period, snapshot: &StockSnapshot) {
        let path = self.path(symbol, period);
        match self.write_entry(&path, snapshot) {
            Ok(()) => info!("Data saved to cache: {}", path.display()),
            Err(e) => warn!("Error saving to cache {}: {}", path.display(), e),
        }
    }

    fn read_entry(&self, path: &PathBuf, now: SystemTime) -> Result<Option<StockSnapshot>> {
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        // A timestamp in the future (clock skew) counts as fresh.
        let age = now
            .duration_since(metadata.modified()?)
            .unwrap_or(Duration::ZERO);
        if age >= self.ttl() {
            info!(
                "Cache expired for {} (older than {:?}), refreshing data.",
                path.display(),
                self.ttl()
            );
            return Ok(None);
        }

        let text = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&text)?))
    }

    fn write_entry(&self, path: &PathBuf, snapshot: &StockSnapshot) -> Result<()> {
        fs::create_dir_all(&self.config.dir)?;
        let text = serde_json::to_string(snapshot)?;

        // Write beside the target and rename so readers never see a torn file.
        let tmp = path.with_extension(format!("json.{}.tmp", std::process::id()));
        fs::write(&tmp, text)?;
        if let Err(e) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}
