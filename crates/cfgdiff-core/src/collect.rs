//! Concurrent per-device collection.
//!
//! Every device is handled in its own task: fetch the diff, look up the
//! hostname, normalize. Failures stay scoped to their device so one bad
//! config never sinks the daily report.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::Instrument;

use crate::hostname::HostnameMatcher;
use crate::normalize::{DiffNormalizer, NormalizedDiff};
use crate::obs;
use crate::source::DiffSource;

/// What happened to one device.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeviceOutcome {
    /// Real changes found.
    Changed {
        file: String,
        hostname: String,
        diff: NormalizedDiff,
    },
    /// Diff contained only noise or unchanged context.
    Unchanged { file: String },
    /// The diff command produced no output.
    Empty { file: String },
    Failed { file: String, error: String },
}

impl DeviceOutcome {
    pub fn file(&self) -> &str {
        match self {
            DeviceOutcome::Changed { file, .. }
            | DeviceOutcome::Unchanged { file }
            | DeviceOutcome::Empty { file }
            | DeviceOutcome::Failed { file, .. } => file,
        }
    }

    pub fn is_changed(&self) -> bool {
        matches!(self, DeviceOutcome::Changed { .. })
    }
}

/// Default cap on devices processed at once.
pub const DEFAULT_MAX_CONCURRENT: usize = 4;

/// Fans device work out over a bounded set of tasks.
pub struct Collector {
    source: Arc<dyn DiffSource>,
    normalizer: Arc<DiffNormalizer>,
    hostnames: Arc<HostnameMatcher>,
    max_concurrent: usize,
}

impl Collector {
    pub fn new(
        source: Arc<dyn DiffSource>,
        normalizer: DiffNormalizer,
        hostnames: HostnameMatcher,
    ) -> Self {
        Self {
            source,
            normalizer: Arc::new(normalizer),
            hostnames: Arc::new(hostnames),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Process every file; outcomes come back in the order of `files`.
    pub async fn collect(&self, files: &[String]) -> Vec<DeviceOutcome> {
        let permits = Arc::new(Semaphore::new(self.max_concurrent));
        let mut join_set = JoinSet::new();

        for (idx, file) in files.iter().cloned().enumerate() {
            let source = Arc::clone(&self.source);
            let normalizer = Arc::clone(&self.normalizer);
            let hostnames = Arc::clone(&self.hostnames);
            let permits = Arc::clone(&permits);
            let span = obs::device_span(&file);
            join_set.spawn(
                async move {
                    let _permit = permits.acquire_owned().await.ok();
                    let outcome =
                        process_device(source.as_ref(), &normalizer, &hostnames, file).await;
                    (idx, outcome)
                }
                .instrument(span),
            );
        }

        let mut slots: Vec<Option<DeviceOutcome>> = vec![None; files.len()];
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((idx, outcome)) => slots[idx] = Some(outcome),
                Err(e) => tracing::error!(error = %e, "device task join error"),
            }
        }

        files
            .iter()
            .zip(slots)
            .map(|(file, slot)| {
                slot.unwrap_or_else(|| DeviceOutcome::Failed {
                    file: file.clone(),
                    error: "device task aborted".to_string(),
                })
            })
            .collect()
    }
}

async fn process_device(
    source: &dyn DiffSource,
    normalizer: &DiffNormalizer,
    hostnames: &HostnameMatcher,
    file: String,
) -> DeviceOutcome {
    let text = match source.fetch_diff(&file).await {
        Ok(Some(text)) => text,
        Ok(None) => {
            obs::emit_device_skipped(&file, "diff output is empty");
            return DeviceOutcome::Empty { file };
        }
        Err(e) => {
            obs::emit_device_failed(&file, &e);
            return DeviceOutcome::Failed {
                file,
                error: e.to_string(),
            };
        }
    };

    obs::emit_device_started(&file, text.len());
    match normalizer.normalize(&text) {
        Ok(Some(diff)) => {
            let hostname = source.hostname(&file, hostnames).await;
            obs::emit_device_changed(&file, &hostname, diff.lines.len());
            DeviceOutcome::Changed {
                file,
                hostname,
                diff,
            }
        }
        Ok(None) => {
            obs::emit_device_skipped(&file, "diff has only dynamic data");
            DeviceOutcome::Unchanged { file }
        }
        Err(e) => {
            obs::emit_device_failed(&file, &e);
            DeviceOutcome::Failed {
                file,
                error: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CfgDiffError, Result};
    use crate::normalize::NormalizeConfig;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const PREAMBLE: &str = "diff --git a/x b/x\nindex 1..2 100644\n--- a/x\n+++ b/x\n@@ -1 +1 @@\n";

    /// In-memory diff source; files missing from the map fail.
    struct MemorySource {
        diffs: HashMap<String, Option<String>>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl MemorySource {
        fn new(entries: &[(&str, Option<&str>)]) -> Self {
            Self {
                diffs: entries
                    .iter()
                    .map(|(f, d)| (f.to_string(), d.map(|d| format!("{PREAMBLE}{d}"))))
                    .collect(),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl DiffSource for MemorySource {
        async fn fetch_diff(&self, file: &str) -> Result<Option<String>> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            self.diffs
                .get(file)
                .cloned()
                .ok_or_else(|| CfgDiffError::DiffCommand {
                    file: file.to_string(),
                    stderr: "unknown revision".to_string(),
                })
        }

        async fn hostname(&self, file: &str, matcher: &HostnameMatcher) -> String {
            let text = self
                .diffs
                .get(file)
                .cloned()
                .flatten()
                .unwrap_or_default();
            matcher.find_or_unknown(&text)
        }
    }

    fn collector(source: Arc<MemorySource>, max_concurrent: usize) -> Collector {
        Collector::new(
            source,
            DiffNormalizer::new(NormalizeConfig::default()),
            HostnameMatcher::new([r"hostname (\S+)"]).unwrap(),
        )
        .with_max_concurrent(max_concurrent)
    }

    #[tokio::test]
    async fn test_outcomes_keep_input_order() {
        let source = Arc::new(MemorySource::new(&[
            ("a.cfg", Some(" hostname a\n-mtu 1500\n+mtu 9000\n")),
            ("b.cfg", Some(" hostname b\n interface Gi0/1\n")),
            ("c.cfg", None),
        ]));
        let files: Vec<String> = ["a.cfg", "b.cfg", "c.cfg", "missing.cfg"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let outcomes = collector(source, 4).collect(&files).await;
        let order: Vec<&str> = outcomes.iter().map(|o| o.file()).collect();
        assert_eq!(order, vec!["a.cfg", "b.cfg", "c.cfg", "missing.cfg"]);

        match &outcomes[0] {
            DeviceOutcome::Changed { hostname, diff, .. } => {
                assert_eq!(hostname, "a");
                assert_eq!(diff.rendered(), vec![" hostname a", "-mtu 1500", "+mtu 9000"]);
            }
            other => panic!("expected Changed, got {other:?}"),
        }
        assert!(matches!(outcomes[1], DeviceOutcome::Unchanged { .. }));
        assert!(matches!(outcomes[2], DeviceOutcome::Empty { .. }));
        assert!(matches!(outcomes[3], DeviceOutcome::Failed { .. }));
    }

    #[tokio::test]
    async fn test_malformed_range_fails_only_that_device() {
        let source = Arc::new(MemorySource::new(&[
            ("bad.cfg", Some("+ switchport trunk allowed vlan 1,\n")),
            ("good.cfg", Some("+ switchport trunk allowed vlan 1\n")),
        ]));
        let files = vec!["bad.cfg".to_string(), "good.cfg".to_string()];
        let outcomes = collector(source, 2).collect(&files).await;

        match &outcomes[0] {
            DeviceOutcome::Failed { error, .. } => assert!(error.contains("malformed")),
            other => panic!("expected Failed, got {other:?}"),
        }
        assert!(outcomes[1].is_changed());
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let entries: Vec<(String, Option<&str>)> = (0..12)
            .map(|i| (format!("sw{i}.cfg"), Some("-a\n+b\n")))
            .collect();
        let borrowed: Vec<(&str, Option<&str>)> =
            entries.iter().map(|(f, d)| (f.as_str(), *d)).collect();
        let source = Arc::new(MemorySource::new(&borrowed));
        let files: Vec<String> = entries.iter().map(|(f, _)| f.clone()).collect();

        let outcomes = collector(Arc::clone(&source), 3).collect(&files).await;
        assert_eq!(outcomes.len(), 12);
        assert!(outcomes.iter().all(|o| o.is_changed()));
        assert!(source.peak.load(Ordering::SeqCst) <= 3);
    }
}
