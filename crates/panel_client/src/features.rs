use std::sync::Mutex;
use std::time::{Duration, Instant};

use panel_logging::panel_warn;

use crate::backend::CatalogBackend;
use crate::types::FeatureFlags;

/// Default memo lifetime for the feature-flag response.
pub const FEATURES_TTL: Duration = Duration::from_secs(300);

/// TTL memo over `GET /features`. A probe failure degrades to all-disabled
/// and is memoized like a success, so a flapping backend is asked at most
/// once per TTL window.
pub struct FeatureProbe {
    ttl: Duration,
    memo: Mutex<Option<(Instant, FeatureFlags)>>,
}

impl FeatureProbe {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            memo: Mutex::new(None),
        }
    }

    pub async fn get(&self, backend: &dyn CatalogBackend) -> FeatureFlags {
        if let Some(flags) = self.cached() {
            return flags;
        }

        let flags = match backend.features().await {
            Ok(flags) => flags,
            Err(err) => {
                panel_warn!("feature probe failed, assuming defaults: {err}");
                FeatureFlags::default()
            }
        };

        if let Ok(mut memo) = self.memo.lock() {
            *memo = Some((Instant::now(), flags));
        }
        flags
    }

    fn cached(&self) -> Option<FeatureFlags> {
        let memo = self.memo.lock().ok()?;
        match *memo {
            Some((at, flags)) if at.elapsed() < self.ttl => Some(flags),
            _ => None,
        }
    }
}

impl Default for FeatureProbe {
    fn default() -> Self {
        Self::new(FEATURES_TTL)
    }
}
