use crate::error::{Result, ScanError};
use crate::models::candidate::{
    AbilityPair, AbilityStats, Candidate, CandidateOrigin, CommittedPick, HeroModel,
};
use crate::models::config::ScanConfig;
use crate::models::payload::{
    IncrementalScan, InitialScan, ScanMetadata, ScanMode, ScanPayload, ScanResult,
};
use crate::models::recognition::{Recognition, RecognitionResult};
use crate::models::region::{Region, RegionManifest, SlotKind, DRAFTING_PLAYERS, SLOTS_PER_PLAYER};
use crate::services::capture::FrameSource;
use crate::services::frame_diff::changed_mask;
use crate::services::pool_builder::{build_pools, DraftPools};
use crate::services::recognition::classifier::AbilityClassifier;
use crate::services::recognition::model_server::ModelServerManager;
use crate::services::scoring::score_ability;
use crate::services::selector::{select_top_tier, ExclusionRules};
use crate::services::stats_repo::StatsRepository;
use crate::services::synergy;
use chrono::Utc;
use image::RgbaImage;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Externally visible scanner state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ScanState {
    Idle,
    Scanning,
    Success,
    Error { message: String },
}

/// Inter-scan state, owned by the scanner and committed only on success
///
/// `pool` holds one recognition per pool region in manifest order, so a
/// rescan can diff and reconfirm against what the last successful scan
/// saw. `epoch` increments on every session reset; a scan that started
/// under an older epoch discards its result instead of committing.
#[derive(Debug, Clone, Default)]
struct ScanCache {
    frame: Option<RgbaImage>,
    pool: Vec<Recognition>,
    model_owner: Option<u8>,
    drafting_owner: Option<u8>,
    epoch: u64,
}

impl ScanCache {
    /// True once a successful scan has populated the pool baseline
    fn is_primed(&self) -> bool {
        self.frame.is_some() && !self.pool.is_empty()
    }

    fn clear(&mut self) {
        self.frame = None;
        self.pool.clear();
        self.model_owner = None;
        self.drafting_owner = None;
    }
}

/// What the recognition phase produced for one scan
struct RecognitionOutcome {
    /// Every manifest region with its recognition, pool first
    results: Vec<RecognitionResult>,
    /// Pool recognitions aligned with `RegionManifest::pool_regions`
    pool: Vec<Recognition>,
    scanned: usize,
    reconfirmed: usize,
    kept_from_cache: usize,
}

/// Pure enrichment output, assembled into the payload by the scanner
struct Enrichment {
    ultimates: Vec<Candidate>,
    standards: Vec<Candidate>,
    committed: Vec<CommittedPick>,
    hero_models: Vec<HeroModel>,
    op_pairs: Vec<AbilityPair>,
    trap_pairs: Vec<AbilityPair>,
    synergy_in_pool: Vec<String>,
    top_tier: Vec<Candidate>,
}

/// Draft-board scan orchestrator
///
/// Sequences capture, recognition, statistics lookup, synergy resolution,
/// scoring, and suggestion selection into one enriched payload per scan.
/// One scan runs at a time; requests arriving while a scan is in flight
/// are rejected with a busy signal rather than queued. All inter-scan
/// state lives in the private cache, which only a successful scan
/// mutates.
pub struct DraftScanner<S, C, R>
where
    S: FrameSource,
    C: AbilityClassifier,
    R: StatsRepository,
{
    source: S,
    classifier: C,
    repo: R,
    manifest: RegionManifest,
    config: ScanConfig,
    cache: Mutex<ScanCache>,
    status: Mutex<ScanState>,
    in_flight: AtomicBool,
    server: Option<tokio::sync::Mutex<ModelServerManager>>,
}

impl<S, C, R> DraftScanner<S, C, R>
where
    S: FrameSource,
    C: AbilityClassifier,
    R: StatsRepository,
{
    /// Create a scanner over a region manifest
    ///
    /// The manifest must carry at least one region; full board validation
    /// belongs to the manifest loader.
    pub fn new(
        source: S,
        classifier: C,
        repo: R,
        manifest: RegionManifest,
        config: ScanConfig,
    ) -> Result<Self> {
        if manifest.regions.is_empty() {
            return Err(ScanError::Configuration(
                "region manifest has no regions".to_string(),
            ));
        }

        Ok(Self {
            source,
            classifier,
            repo,
            manifest,
            config,
            cache: Mutex::new(ScanCache::default()),
            status: Mutex::new(ScanState::Idle),
            in_flight: AtomicBool::new(false),
            server: None,
        })
    }

    /// Attach a managed model server, checked before every scan
    pub fn with_model_server(mut self, server: ModelServerManager) -> Self {
        self.server = Some(tokio::sync::Mutex::new(server));
        self
    }

    pub fn status(&self) -> ScanState {
        self.status.lock().clone()
    }

    pub fn is_scanning(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Full scan of every board region
    pub async fn initial_scan(&self) -> Result<ScanResult> {
        self.scan(ScanMode::Initial).await
    }

    /// Cache-assisted rescan; falls back to a full scan on an empty cache
    pub async fn rescan(&self) -> Result<ScanResult> {
        self.scan(ScanMode::Incremental).await
    }

    /// Run one scan in the requested mode
    pub async fn scan(&self, mode: ScanMode) -> Result<ScanResult> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(ScanError::ScanInProgress);
        }
        *self.status.lock() = ScanState::Scanning;

        let result = self.run_scan(mode).await;

        match &result {
            Ok(_) => *self.status.lock() = ScanState::Success,
            // The reset already moved the state machine on; leave it alone
            Err(ScanError::Cancelled) => {}
            Err(e) => {
                *self.status.lock() = ScanState::Error {
                    message: e.to_string(),
                }
            }
        }
        self.in_flight.store(false, Ordering::SeqCst);

        result
    }

    /// Drop all inter-scan state and return to idle
    ///
    /// A scan in flight keeps running but its result is discarded at
    /// commit time instead of landing in the fresh session.
    pub fn reset_session(&self) {
        {
            let mut cache = self.cache.lock();
            cache.clear();
            cache.epoch += 1;
        }
        *self.status.lock() = ScanState::Idle;
        info!("scan session reset");
    }

    /// Pin the seat the user is drafting for
    pub fn set_drafting_owner(&self, seat: Option<u8>) -> Result<()> {
        Self::check_seat(seat)?;
        self.cache.lock().drafting_owner = seat;
        Ok(())
    }

    pub fn drafting_owner(&self) -> Option<u8> {
        self.cache.lock().drafting_owner
    }

    /// Pin a reference seat whose picks frame the suggestions
    ///
    /// Independent of the drafting owner; setting or clearing one never
    /// touches the other. A successful initial scan clears this pin.
    pub fn set_model_owner(&self, seat: Option<u8>) -> Result<()> {
        Self::check_seat(seat)?;
        self.cache.lock().model_owner = seat;
        Ok(())
    }

    pub fn model_owner(&self) -> Option<u8> {
        self.cache.lock().model_owner
    }

    /// Clear the recognition backend's hard-failure latch
    pub async fn reinitialize_recognition(&self) {
        if let Some(server) = &self.server {
            server.lock().await.reinitialize();
        }
    }

    fn check_seat(seat: Option<u8>) -> Result<()> {
        match seat {
            Some(seat) if seat >= DRAFTING_PLAYERS => Err(ScanError::OwnerOutOfRange(seat)),
            _ => Ok(()),
        }
    }

    async fn run_scan(&self, mode: ScanMode) -> Result<ScanResult> {
        let started_at = Utc::now();
        let timer = Instant::now();

        if let Some(server) = &self.server {
            server.lock().await.ensure_running().await?;
        }

        let frame = self.source.capture()?;
        let cached = self.cache.lock().clone();

        let (effective_mode, fell_back) = match mode {
            ScanMode::Initial => (ScanMode::Initial, false),
            ScanMode::Incremental if !cached.is_primed() => {
                warn!("rescan requested with an empty cache, running a full scan");
                (ScanMode::Initial, true)
            }
            ScanMode::Incremental => (ScanMode::Incremental, false),
        };
        debug!("{:?} scan started", effective_mode);

        let deadline = Duration::from_millis(self.config.recognition.timeout_ms);
        let outcome = timeout(deadline, self.recognize_phase(&frame, &cached, effective_mode))
            .await
            .map_err(|_| ScanError::Timeout(self.config.recognition.timeout_ms))??;

        let pools = build_pools(&outcome.results);

        // An initial scan drops the model pin, so it cannot steer this
        // scan's suggestions either
        let target = match effective_mode {
            ScanMode::Initial => cached.drafting_owner,
            ScanMode::Incremental => cached.drafting_owner.or(cached.model_owner),
        };

        let enrichment = self.enrich(&pools, target)?;

        {
            let mut cache = self.cache.lock();
            if cache.epoch != cached.epoch {
                warn!("scan discarded, session was reset mid-flight");
                return Err(ScanError::Cancelled);
            }
            cache.frame = Some(frame);
            cache.pool = outcome.pool;
            if effective_mode == ScanMode::Initial {
                cache.model_owner = None;
            }
        }

        let metadata = ScanMetadata {
            mode,
            target_player: target,
            started_at,
            duration_ms: timer.elapsed().as_millis() as u64,
            regions_scanned: outcome.scanned,
            regions_skipped: outcome.kept_from_cache,
        };
        info!(
            "{:?} scan finished in {} ms: {} regions scanned, {} from cache",
            mode, metadata.duration_ms, metadata.regions_scanned, metadata.regions_skipped
        );

        let payload = ScanPayload {
            ultimates: enrichment.ultimates,
            standards: enrichment.standards,
            slots: pools.rows,
            committed: enrichment.committed,
            hero_models: enrichment.hero_models,
            op_pairs: enrichment.op_pairs,
            trap_pairs: enrichment.trap_pairs,
            synergy_in_pool: enrichment.synergy_in_pool,
            top_tier: enrichment.top_tier,
            metadata,
        };

        Ok(match mode {
            ScanMode::Initial => ScanResult::Initial(InitialScan { payload }),
            ScanMode::Incremental => ScanResult::Incremental(IncrementalScan {
                payload,
                fell_back_to_full: fell_back,
                reconfirmed: outcome.reconfirmed,
                kept_from_cache: outcome.kept_from_cache,
            }),
        })
    }

    /// Recognize the board, consulting the cache in incremental mode
    ///
    /// Committed regions are always recognized in full since commitments
    /// change between scans. Pool regions are gated by the frame diff: an
    /// unchanged slot keeps its cached recognition, a changed slot with a
    /// cached label is reconfirmed, and a changed slot that was blank
    /// stays blank because the pool only ever drains mid-draft.
    async fn recognize_phase(
        &self,
        frame: &RgbaImage,
        cached: &ScanCache,
        mode: ScanMode,
    ) -> Result<RecognitionOutcome> {
        let pool_regions = self.manifest.pool_regions();
        let committed_regions = self.manifest.committed_regions();

        let mut scanned = 0;
        let mut reconfirmed = 0;
        let mut kept_from_cache = 0;

        let pool = match mode {
            ScanMode::Initial => {
                let recognitions = self.classifier.recognize_batch(frame, &pool_regions).await?;
                scanned += recognitions.len();
                recognitions
            }
            ScanMode::Incremental => {
                let mask = changed_mask(
                    frame,
                    cached.frame.as_ref(),
                    &pool_regions,
                    &self.config.diff,
                );

                let mut recognitions: Vec<Recognition> = Vec::with_capacity(pool_regions.len());
                let mut to_confirm: Vec<usize> = Vec::new();
                for i in 0..pool_regions.len() {
                    let previous = cached.pool.get(i).cloned().unwrap_or_else(Recognition::empty);
                    if mask[i] && previous.is_recognized() {
                        to_confirm.push(i);
                        recognitions.push(previous);
                    } else {
                        kept_from_cache += 1;
                        recognitions.push(previous);
                    }
                }

                if !to_confirm.is_empty() {
                    let regions: Vec<Region> =
                        to_confirm.iter().map(|&i| pool_regions[i]).collect();
                    let confirmed = self.classifier.recognize_batch(frame, &regions).await?;
                    for (&i, fresh) in to_confirm.iter().zip(confirmed) {
                        // A different answer means the known ability left
                        // the slot, not that a new one arrived
                        recognitions[i] = if fresh.label == recognitions[i].label {
                            fresh
                        } else {
                            Recognition::empty()
                        };
                    }
                    reconfirmed = to_confirm.len();
                    scanned += reconfirmed;
                }

                recognitions
            }
        };

        let committed = self
            .classifier
            .recognize_batch(frame, &committed_regions)
            .await?;
        scanned += committed.len();

        let mut results = Vec::with_capacity(pool.len() + committed.len());
        for (region, recognition) in pool_regions.iter().zip(&pool) {
            results.push(RecognitionResult::new(*region, recognition.clone()));
        }
        for (region, recognition) in committed_regions.iter().zip(&committed) {
            results.push(RecognitionResult::new(*region, recognition.clone()));
        }

        Ok(RecognitionOutcome {
            results,
            pool,
            scanned,
            reconfirmed,
            kept_from_cache,
        })
    }

    /// Statistics lookup, synergy resolution, scoring, and selection
    fn enrich(&self, pools: &DraftPools, target: Option<u8>) -> Result<Enrichment> {
        let all_names = pools.all_names();
        let details = self.repo.details_by_names(&all_names)?;

        let target_picks = target.map(|seat| pools.picks_of(seat)).unwrap_or(&[]);
        let target_names: Vec<String> =
            target_picks.iter().map(|pick| pick.label.clone()).collect();

        let report = synergy::resolve(
            &pools.pool_names(),
            &pools.committed_names,
            &target_names,
            &self.repo,
            self.config.suggestions.synergy_threshold,
        )?;

        let mut candidates: Vec<Candidate> = Vec::with_capacity(pools.pool_entries.len());
        for entry in &pools.pool_entries {
            let mut stats = details.get(&entry.name).cloned().unwrap_or_else(|| {
                AbilityStats::unknown(&entry.name, entry.kind == SlotKind::Ultimate)
            });
            // The board knows an ultimate slot even when the snapshot does not
            if entry.kind == SlotKind::Ultimate {
                stats.is_ultimate = true;
            }

            let mut candidate = Candidate::from_stats(stats, CandidateOrigin::Pool);
            candidate.synergy_partners = report.partners_of(&entry.name).to_vec();
            candidate.score = score_ability(&candidate.stats, &self.config.scoring);
            candidates.push(candidate);
        }

        let exclude_ultimates = target_picks
            .iter()
            .any(|pick| pick.slot == SLOTS_PER_PLAYER - 1);
        let rules = ExclusionRules {
            committed_names: pools.committed_names.iter().cloned().collect(),
            exclude_ultimates,
        };
        let synergy_set: HashSet<String> = report.synergy_in_pool.iter().cloned().collect();
        let top_tier = select_top_tier(
            &candidates,
            &synergy_set,
            &rules,
            self.config.suggestions.top_tier_cap,
        );

        // Mirror the selection flags onto the pool lists for display
        for selected in &top_tier {
            if let Some(candidate) = candidates.iter_mut().find(|c| c.name() == selected.name()) {
                candidate.is_synergy_pick = selected.is_synergy_pick;
                candidate.is_top_tier_pick = selected.is_top_tier_pick;
            }
        }

        let mut ultimates = Vec::new();
        let mut standards = Vec::new();
        for (entry, candidate) in pools.pool_entries.iter().zip(candidates) {
            match entry.kind {
                SlotKind::Ultimate => ultimates.push(candidate),
                SlotKind::Standard => standards.push(candidate),
            }
        }

        let mut committed = Vec::new();
        for (&player, slots) in &pools.committed_by_player {
            for slot in slots {
                let stats = details.get(&slot.label).cloned().unwrap_or_else(|| {
                    AbilityStats::unknown(&slot.label, slot.slot == SLOTS_PER_PLAYER - 1)
                });
                committed.push(CommittedPick {
                    player,
                    slot: slot.slot,
                    stats,
                });
            }
        }

        let mut hero_models = Vec::new();
        for row in &pools.rows {
            if !row.region.is_defining() {
                continue;
            }
            if let (Some(hero), Some(label)) = (row.region.pool_hero(), row.label.as_deref()) {
                if let Some(record) = self.repo.hero_for_ability(label)? {
                    hero_models.push(HeroModel {
                        hero,
                        hero_key: record.hero_key,
                        display_name: record.display_name,
                        defining_label: label.to_string(),
                    });
                }
            }
        }
        hero_models.sort_by_key(|model| model.hero);

        Ok(Enrichment {
            ultimates,
            standards,
            committed,
            hero_models,
            op_pairs: report.op_pairs,
            trap_pairs: report.trap_pairs,
            synergy_in_pool: report.synergy_in_pool,
            top_tier,
        })
    }
}
