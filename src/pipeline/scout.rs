use futures::future;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};

use super::{EntityEnricher, PartitionPlanner, SearchPaginator};
use crate::config::{Config, RunConfig};
use crate::error::ScoutError;
use crate::store::{Ledger, PartitionStore, RegionCatalog, ResultStore};
use crate::types::{Partition, PartitionKey};
use crate::upstream::{GithubApi, Throttle, ThrottleSettings};

/// Totals for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub partitions: usize,
    pub skipped: usize,
    pub failed: usize,
    pub identities: usize,
    pub enriched: usize,
    pub enrich_failures: usize,
    pub cancelled: bool,
}

#[derive(Debug)]
enum PartitionOutcome {
    Skipped,
    Failed,
    Done {
        identities: usize,
        enriched: usize,
        failures: usize,
    },
}

impl RunSummary {
    fn absorb(&mut self, outcome: PartitionOutcome) {
        self.partitions += 1;
        match outcome {
            PartitionOutcome::Skipped => self.skipped += 1,
            PartitionOutcome::Failed => self.failed += 1,
            PartitionOutcome::Done {
                identities,
                enriched,
                failures,
            } => {
                self.identities += identities;
                self.enriched += enriched;
                self.enrich_failures += failures;
            }
        }
    }
}

/// Ledger state loaded once at the start of a run.
struct Completed {
    searched: HashSet<PartitionKey>,
    enriched: HashSet<PartitionKey>,
}

/// Drives every planned partition through search, then enrichment.
pub struct Scout {
    planner: PartitionPlanner,
    paginator: SearchPaginator,
    enricher: EntityEnricher,
    accounts: PartitionStore,
    results: ResultStore,
    accounts_ledger: Ledger,
    users_ledger: Ledger,
    run: RunConfig,
    cancel: CancellationToken,
}

impl Scout {
    /// Wires every component from `cfg`. Fails on anything that should stop a run before it starts.
    pub fn from_config(cfg: &Config, cancel: CancellationToken) -> Result<Self, ScoutError> {
        cfg.validate()?;
        let planner = PartitionPlanner::new(
            RegionCatalog::new(cfg.output.states_path()),
            cfg.run.clone(),
        );
        planner.validate()?;

        let api = Arc::new(GithubApi::new(&cfg.upstream, cfg.proxy.as_ref())?);
        let throttle = Arc::new(Throttle::new(
            ThrottleSettings::from(&cfg.upstream),
            cancel.clone(),
        ));

        info!(
            region = cfg.run.selected_region().unwrap_or("all"),
            city = cfg.run.selected_city().unwrap_or("all"),
            start_date = %cfg.run.start_date,
            end_date = %cfg.run.end_date,
            window = ?cfg.run.window,
            direction = ?cfg.run.direction,
            workers = cfg.run.workers,
            data_dir = %cfg.output.data_dir.display(),
            "Run configured"
        );

        Ok(Self {
            planner,
            paginator: SearchPaginator::new(api.clone(), throttle.clone(), &cfg.upstream),
            enricher: EntityEnricher::new(api, throttle),
            accounts: PartitionStore::new(cfg.output.accounts_path()),
            results: ResultStore::new(cfg.output.users_path(), cfg.output.include_counts),
            accounts_ledger: Ledger::new(cfg.output.accounts_ledger_path()),
            users_ledger: Ledger::new(cfg.output.users_ledger_path()),
            run: cfg.run.clone(),
            cancel,
        })
    }

    pub async fn run(&self) -> Result<RunSummary, ScoutError> {
        let completed = if self.run.skip_completed {
            Completed {
                searched: self.accounts_ledger.completed().await?,
                enriched: self.users_ledger.completed().await?,
            }
        } else {
            Completed {
                searched: HashSet::new(),
                enriched: HashSet::new(),
            }
        };
        info!(
            searched = completed.searched.len(),
            enriched = completed.enriched.len(),
            "Ledgers loaded"
        );

        let workers = self.run.workers.max(1);
        let mut outcomes = stream::iter(self.planner.partitions())
            .take_while(|_| future::ready(!self.cancel.is_cancelled()))
            .map(|partition| {
                let span = info_span!(
                    "partition",
                    region = %partition.region,
                    city = partition.city.as_deref().unwrap_or("-"),
                    window = %partition.created_range(),
                );
                self.run_partition(partition, &completed).instrument(span)
            })
            .buffer_unordered(workers);

        let mut summary = RunSummary::default();
        while let Some(outcome) = outcomes.next().await {
            match outcome {
                Ok(outcome) => summary.absorb(outcome),
                Err(ScoutError::Cancelled) => summary.cancelled = true,
                Err(e) => {
                    error!(error = %e, "Partition aborted");
                    summary.absorb(PartitionOutcome::Failed);
                }
            }
        }
        summary.cancelled |= self.cancel.is_cancelled();

        info!(
            partitions = summary.partitions,
            skipped = summary.skipped,
            failed = summary.failed,
            identities = summary.identities,
            enriched = summary.enriched,
            enrich_failures = summary.enrich_failures,
            cancelled = summary.cancelled,
            "Run finished"
        );
        Ok(summary)
    }

    async fn run_partition(
        &self,
        partition: Partition,
        completed: &Completed,
    ) -> Result<PartitionOutcome, ScoutError> {
        let key = partition.key();
        if completed.enriched.contains(&key) {
            debug!("Partition already enriched; skipping");
            return Ok(PartitionOutcome::Skipped);
        }

        if completed.searched.contains(&key) {
            info!("Search already recorded; reusing stored summaries");
        } else {
            match self
                .paginator
                .collect(&partition, &self.accounts, &self.accounts_ledger)
                .await
            {
                Ok(count) => info!(count, "Search complete"),
                Err(ScoutError::Cancelled) => return Err(ScoutError::Cancelled),
                Err(e) => {
                    error!(error = %e, "Search failed; skipping partition");
                    return Ok(PartitionOutcome::Failed);
                }
            }
        }

        let handles = match self.accounts.list_identities(&partition).await {
            Ok(handles) => handles,
            Err(e) => {
                error!(
                    path = %self.accounts.path_for(&partition).display(),
                    error = %e,
                    "Failed to read stored summaries; skipping partition"
                );
                return Ok(PartitionOutcome::Failed);
            }
        };

        let known = if self.run.skip_known_handles {
            self.results
                .known_handles(&partition)
                .await
                .unwrap_or_else(|e| {
                    warn!(error = %e, "Failed to read existing results; enriching every handle");
                    HashSet::new()
                })
        } else {
            HashSet::new()
        };

        let mut enriched = 0usize;
        let mut failures = 0usize;
        for handle in &handles {
            if known.contains(handle) {
                debug!(handle = %handle, "Handle already enriched; skipping");
                continue;
            }
            match self.enricher.enrich(handle).await {
                Ok(profile) => match self.results.append(&partition, &profile).await {
                    Ok(()) => {
                        enriched += 1;
                        info!(handle = %handle, "Identity stored");
                    }
                    Err(e) => {
                        failures += 1;
                        error!(handle = %handle, error = %e, "Failed to persist identity");
                    }
                },
                Err(ScoutError::Cancelled) => return Err(ScoutError::Cancelled),
                Err(e) => {
                    failures += 1;
                    error!(handle = %handle, error = %e, "Enrichment failed; skipping identity");
                }
            }
        }

        if failures > 0 {
            warn!(
                failures,
                "Partition left out of the ledger so the next run retries its failed identities"
            );
        } else if let Err(e) = self.users_ledger.record(&partition, enriched as u64).await {
            error!(error = %e, "Failed to record enrichment in ledger");
        }
        info!(
            identities = handles.len(),
            enriched,
            failures,
            "Partition complete"
        );

        Ok(PartitionOutcome::Done {
            identities: handles.len(),
            enriched,
            failures,
        })
    }
}
