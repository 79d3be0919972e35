use stateboard_index::{Database, Error as IndexError};
use stateboard_providers::{ProviderSet, StateProvider};
use stateboard_types::{LockInfo, Version};
use std::collections::{HashMap, HashSet};

use crate::Result;

#[derive(Debug, Clone, PartialEq)]
pub enum SyncProgress {
    ProviderScanning {
        provider_name: String,
    },
    ProviderFailed {
        provider_name: String,
        error: String,
    },
    StateVersions {
        path: String,
        count: usize,
    },
    StateIngested {
        path: String,
        version_id: String,
        serial: u64,
    },
    StateFailed {
        path: String,
        version_id: Option<String>,
        error: String,
    },
    Completed {
        ingested: usize,
        skipped: usize,
        failed: usize,
    },
}

/// One synchronization pass from state providers into the index.
///
/// Provider and snapshot failures are reported and skipped; storage errors
/// abort the pass. A version whose snapshot could not be fetched stays
/// unknown so the next pass retries it.
pub struct SyncService<'a> {
    db: &'a Database,
    providers: ProviderSet,
}

impl<'a> SyncService<'a> {
    pub fn new(db: &'a Database, providers: Vec<Box<dyn StateProvider>>) -> Self {
        Self {
            db,
            providers: providers.into(),
        }
    }

    pub fn run<F>(&self, mut on_progress: F) -> Result<()>
    where
        F: FnMut(SyncProgress),
    {
        let mut known: HashSet<String> = self.db.known_versions()?.into_iter().collect();

        let mut ingested = 0;
        let mut skipped = 0;
        let mut failed = 0;

        for provider in self.providers.iter() {
            let provider_name = provider.name();

            on_progress(SyncProgress::ProviderScanning {
                provider_name: provider_name.to_string(),
            });

            let paths = match provider.get_states() {
                Ok(paths) => paths,
                Err(err) => {
                    tracing::warn!(provider = provider_name, error = %err, "failed to list states");
                    on_progress(SyncProgress::ProviderFailed {
                        provider_name: provider_name.to_string(),
                        error: err.to_string(),
                    });
                    failed += 1;
                    continue;
                }
            };

            for path in paths {
                let versions = match provider.get_versions(&path) {
                    Ok(versions) => ordered_versions(versions),
                    Err(err) => {
                        tracing::warn!(provider = provider_name, path = %path, error = %err, "failed to list versions");
                        on_progress(SyncProgress::StateFailed {
                            path: path.clone(),
                            version_id: None,
                            error: err.to_string(),
                        });
                        failed += 1;
                        continue;
                    }
                };

                on_progress(SyncProgress::StateVersions {
                    path: path.clone(),
                    count: versions.len(),
                });

                for version in versions {
                    if known.contains(&version.id) {
                        skipped += 1;
                        continue;
                    }

                    let file = match provider.get_state(&path, &version.id) {
                        Ok(file) => file,
                        Err(err) => {
                            tracing::warn!(
                                provider = provider_name,
                                path = %path,
                                version_id = %version.id,
                                error = %err,
                                "failed to fetch state"
                            );
                            on_progress(SyncProgress::StateFailed {
                                path: path.clone(),
                                version_id: Some(version.id.clone()),
                                error: err.to_string(),
                            });
                            failed += 1;
                            continue;
                        }
                    };

                    self.db.insert_version(&version)?;

                    match self.db.insert_state(&path, &version.id, &file) {
                        Ok(_) => {}
                        Err(err @ (IndexError::Json(_) | IndexError::Query(_))) => {
                            // Malformed snapshot (undecodable attributes, serial out of
                            // range): rejected, the version stays recorded so it is not refetched
                            tracing::warn!(
                                path = %path,
                                version_id = %version.id,
                                error = %err,
                                "rejected malformed state"
                            );
                            on_progress(SyncProgress::StateFailed {
                                path: path.clone(),
                                version_id: Some(version.id.clone()),
                                error: err.to_string(),
                            });
                            known.insert(version.id);
                            failed += 1;
                            continue;
                        }
                        Err(err) => return Err(err.into()),
                    }

                    tracing::info!(
                        path = %path,
                        version_id = %version.id,
                        serial = file.serial,
                        "ingested state"
                    );
                    on_progress(SyncProgress::StateIngested {
                        path: path.clone(),
                        version_id: version.id.clone(),
                        serial: file.serial,
                    });
                    known.insert(version.id);
                    ingested += 1;
                }
            }
        }

        tracing::info!(ingested, skipped, failed, "sync pass completed");
        on_progress(SyncProgress::Completed {
            ingested,
            skipped,
            failed,
        });

        Ok(())
    }

    /// Locks held across all providers, keyed by state path.
    /// Unreachable providers are logged and left out.
    pub fn locks(&self) -> HashMap<String, LockInfo> {
        let mut locks = HashMap::new();
        for provider in self.providers.iter() {
            match provider.get_locks() {
                Ok(provider_locks) => locks.extend(provider_locks),
                Err(err) => {
                    tracing::warn!(provider = provider.name(), error = %err, "failed to read locks");
                }
            }
        }
        locks
    }
}

/// Oldest first; versions without a timestamp keep backend order ahead of dated ones
fn ordered_versions(mut versions: Vec<Version>) -> Vec<Version> {
    versions.sort_by_key(|v| v.last_modified);
    versions
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_ordered_versions_oldest_first() {
        let at = |h| Utc.with_ymd_and_hms(2024, 1, 1, h, 0, 0).unwrap();
        let versions = vec![
            Version::new("c").with_last_modified(at(9)),
            Version::new("a").with_last_modified(at(7)),
            Version::new("undated"),
            Version::new("b").with_last_modified(at(8)),
        ];

        let ids: Vec<String> = ordered_versions(versions)
            .into_iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(ids, vec!["undated", "a", "b", "c"]);
    }
}
