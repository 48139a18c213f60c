//! Batch crop sessions.
//!
//! A `BatchSession` holds one entry per asset, drives a single
//! `TransformController` for whichever asset is active and turns every
//! entry into a `CropResult` when the batch is finalized.
//!
//! # Aspect Lock
//!
//! The first asset decides the aspect ratio for the whole batch. Once a
//! preset is locked, changing it from any other asset is silently ignored
//! (`PresetChange::Ignored`). A lock supplied when the batch opens is hard:
//! no asset may change it.
//!
//! # Consistency Points
//!
//! The controller's transform is copied into its entry before `switch_to`,
//! `commit_active` and `finalize`. Nothing else reads it.
//!
//! # Export
//!
//! `finalize` walks the entries in order, one asset at a time, so at most
//! one decode buffer is alive. A `ReclaimGate` paces the steps and a
//! `CancelToken` is checked between them. One failing asset never aborts
//! the rest.

mod collaborators;
mod export;
mod publish;
mod result;

pub use collaborators::{
    CancelToken, CropEncoder, DecodeBudget, EncodedAsset, ImageUploader, Immediate, ReclaimGate,
};
pub use publish::publish;
pub use result::{AssetFailure, CropMetadata, CropOutcome, CropResult, FinalizeReport, VideoFraming};

use serde::{Deserialize, Serialize};

use crate::config::CropConfig;
use crate::controller::TransformController;
use crate::error::CropError;
use crate::geometry::{AssetDimensions, Frame, Transform};
use crate::preset::{preset, PresetKey};

use export::export_entry;

/// Kind of media behind an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

/// An asset handed to a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSource {
    pub uri: String,
    pub kind: MediaKind,
    /// Size reported by the picker, if known.
    #[serde(default)]
    pub dimensions: Option<AssetDimensions>,
}

impl AssetSource {
    pub fn image(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            kind: MediaKind::Image,
            dimensions: None,
        }
    }

    pub fn video(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            kind: MediaKind::Video,
            dimensions: None,
        }
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.dimensions = Some(AssetDimensions::new(width, height));
        self
    }
}

/// Space available to the crop frame, in display units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Editing(usize),
    Exporting,
    Cancelled,
    Completed,
}

/// Outcome of a preset change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetChange {
    Applied,
    /// The batch's aspect ratio is locked by another asset.
    Ignored,
}

/// Per-asset state.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEntry {
    pub source_uri: String,
    pub media_kind: MediaKind,
    pub preset_key: PresetKey,
    /// `UNLOADED` until the asset has been measured.
    pub dimensions: AssetDimensions,
    /// Last transform reported by the controller.
    pub transform: Option<Transform>,
    pub committed: Option<CropResult>,
    /// Set when the asset failed validation on load.
    pub rejection: Option<CropError>,
}

impl SessionEntry {
    fn new(source: AssetSource, preset_key: PresetKey) -> Self {
        Self {
            source_uri: source.uri,
            media_kind: source.kind,
            preset_key,
            dimensions: source.dimensions.unwrap_or(AssetDimensions::UNLOADED),
            transform: None,
            committed: None,
            rejection: None,
        }
    }

    /// Drop framing that was computed against a different frame.
    fn reset_framing(&mut self) {
        self.transform = None;
        self.committed = None;
        self.rejection = None;
    }
}

/// Open a session for a single asset.
///
/// `saved` restores a framing from an earlier edit of the same asset.
pub fn open_single_crop(
    source: AssetSource,
    preset_key: PresetKey,
    saved: Option<Transform>,
    viewport: Viewport,
    config: CropConfig,
) -> BatchSession {
    let mut entry = SessionEntry::new(source, preset_key);
    entry.transform = saved;
    BatchSession::new(vec![entry], None, viewport, config)
}

/// Open a session over several assets.
///
/// Every asset starts on `locked` if given (a hard lock), else on `default_preset`.
pub fn open_batch_crop(
    sources: Vec<AssetSource>,
    default_preset: PresetKey,
    locked: Option<PresetKey>,
    viewport: Viewport,
    config: CropConfig,
) -> Result<BatchSession, CropError> {
    if sources.is_empty() {
        return Err(CropError::EmptyBatch);
    }
    let key = locked.unwrap_or(default_preset);
    let entries = sources
        .into_iter()
        .map(|source| SessionEntry::new(source, key))
        .collect();
    Ok(BatchSession::new(entries, locked, viewport, config))
}

/// State machine over a batch of assets being cropped.
#[derive(Debug)]
pub struct BatchSession {
    entries: Vec<SessionEntry>,
    active_index: usize,
    locked_preset: Option<PresetKey>,
    hard_locked: bool,
    state: SessionState,
    viewport: Viewport,
    config: CropConfig,
    controller: TransformController,
}

impl BatchSession {
    fn new(
        entries: Vec<SessionEntry>,
        locked: Option<PresetKey>,
        viewport: Viewport,
        config: CropConfig,
    ) -> Self {
        let controller = build_controller(&entries[0], viewport, &config);
        let mut session = Self {
            entries,
            active_index: 0,
            locked_preset: locked,
            hard_locked: locked.is_some(),
            state: SessionState::Editing(0),
            viewport,
            config,
            controller,
        };
        session.preload_active();
        session
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn entries(&self) -> &[SessionEntry] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> Option<&SessionEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn locked_preset(&self) -> Option<PresetKey> {
        self.locked_preset
    }

    pub fn config(&self) -> &CropConfig {
        &self.config
    }

    /// Controller for the active asset.
    pub fn controller(&self) -> &TransformController {
        &self.controller
    }

    /// Mutable controller for routing gestures to the active asset.
    pub fn controller_mut(&mut self) -> &mut TransformController {
        &mut self.controller
    }

    /// Frame of the given entry's preset in this session's viewport.
    pub fn frame_for(&self, index: usize) -> Option<Frame> {
        self.entries
            .get(index)
            .map(|entry| frame_of(entry.preset_key, self.viewport, &self.config))
    }

    /// Route the active asset's load event to its controller.
    pub fn asset_loaded(&mut self, width: u32, height: u32) -> Result<(), CropError> {
        self.ensure_editing()?;
        let saved = if self.controller.is_loaded() {
            Some(self.controller.settled())
        } else {
            self.entries[self.active_index].transform
        };

        let result = self.controller.on_asset_loaded(width, height, saved);
        let entry = &mut self.entries[self.active_index];
        if width > 0 && height > 0 {
            entry.dimensions = AssetDimensions::new(width, height);
        }
        match &result {
            Ok(()) => {
                entry.rejection = None;
                entry.transform = Some(self.controller.transform());
            }
            Err(err @ CropError::AssetTooSmall { .. }) => entry.rejection = Some(err.clone()),
            Err(_) => {}
        }
        result
    }

    /// Record a size learned outside the editor (e.g. picker metadata).
    pub fn record_dimensions(&mut self, index: usize, width: u32, height: u32) -> Result<(), CropError> {
        self.ensure_editing()?;
        self.check_index(index)?;
        self.entries[index].dimensions = AssetDimensions::new(width, height);
        Ok(())
    }

    /// Copy the controller's transform, settled into bounds, into the active entry.
    pub fn flush(&mut self) {
        if self.controller.is_loaded() {
            self.entries[self.active_index].transform = Some(self.controller.settled());
        }
    }

    /// Make another asset active, keeping the current one's framing.
    pub fn switch_to(&mut self, index: usize) -> Result<(), CropError> {
        self.ensure_editing()?;
        self.check_index(index)?;
        self.flush();

        self.active_index = index;
        self.state = SessionState::Editing(index);
        self.controller = build_controller(&self.entries[index], self.viewport, &self.config);
        self.preload_active();
        tracing::debug!(index, "switched asset");
        Ok(())
    }

    /// Choose the aspect preset for the batch.
    ///
    /// Only the first asset (or any asset before a lock exists) may choose;
    /// the choice applies to every entry. Entries whose preset changes lose
    /// their framing and committed result.
    pub fn set_preset_for_active(&mut self, key: PresetKey) -> Result<PresetChange, CropError> {
        self.ensure_editing()?;
        if self.hard_locked || (self.active_index != 0 && self.locked_preset.is_some()) {
            tracing::warn!(
                index = self.active_index,
                requested = %key,
                locked = ?self.locked_preset,
                "preset change ignored"
            );
            return Ok(PresetChange::Ignored);
        }

        self.locked_preset = Some(key);
        let mut active_changed = false;
        for (i, entry) in self.entries.iter_mut().enumerate() {
            if entry.preset_key != key {
                entry.preset_key = key;
                entry.reset_framing();
                active_changed |= i == self.active_index;
            }
        }

        if active_changed {
            let frame = frame_of(key, self.viewport, &self.config);
            let entry = &mut self.entries[self.active_index];
            match self.controller.set_frame(preset(key), frame) {
                Ok(()) => {
                    if self.controller.is_loaded() {
                        entry.transform = Some(self.controller.transform());
                    }
                }
                Err(err) => {
                    entry.rejection = Some(err);
                }
            }
        }
        tracing::info!(preset = %key, "batch preset locked");
        Ok(PresetChange::Applied)
    }

    /// Export the active asset now.
    pub fn commit_active(&mut self, encoder: &dyn CropEncoder) -> Result<&CropResult, CropError> {
        self.ensure_editing()?;
        self.flush();

        let index = self.active_index;
        let frame = frame_of(self.entries[index].preset_key, self.viewport, &self.config);
        let result = export_entry(&mut self.entries[index], frame, encoder)?;
        tracing::info!(index, uri = %result.uri, "asset committed");
        Ok(self.entries[index].committed.insert(result))
    }

    /// Export every asset in order.
    ///
    /// Committed images are reused; videos are always re-emitted. A fully
    /// successful pass completes the session; otherwise it stays editable so
    /// the failures can be retried or `accept_partial` called.
    #[tracing::instrument(skip_all, fields(assets = self.entries.len()))]
    pub fn finalize(
        &mut self,
        encoder: &dyn CropEncoder,
        gate: &mut dyn ReclaimGate,
        cancel: &CancelToken,
    ) -> Result<CropOutcome<FinalizeReport>, CropError> {
        self.ensure_editing()?;
        self.flush();
        self.state = SessionState::Exporting;

        let mut report = FinalizeReport::default();
        for index in 0..self.entries.len() {
            if cancel.is_cancelled() {
                tracing::info!(index, "finalize cancelled");
                self.cancel();
                return Ok(CropOutcome::Cancelled);
            }

            let entry = &mut self.entries[index];
            let reusable = match (&entry.committed, entry.media_kind) {
                (Some(result), MediaKind::Image) => Some(result.clone()),
                _ => None,
            };
            let outcome = match reusable {
                Some(result) => Ok(result),
                None => {
                    let estimated = match entry.media_kind {
                        MediaKind::Image => entry.dimensions.decoded_bytes(),
                        MediaKind::Video => 0,
                    };
                    gate.before_decode(index, estimated);
                    let frame = frame_of(entry.preset_key, self.viewport, &self.config);
                    let outcome = export_entry(entry, frame, encoder);
                    gate.after_release(index, estimated);
                    outcome
                }
            };

            match outcome {
                Ok(result) => {
                    entry.committed = Some(result.clone());
                    report.outcomes.push(Ok(result));
                }
                Err(error) => {
                    tracing::warn!(index, uri = %entry.source_uri, %error, "asset export failed");
                    report.outcomes.push(Err(AssetFailure {
                        index,
                        source_uri: entry.source_uri.clone(),
                        error,
                    }));
                }
            }
        }

        self.state = if report.is_complete() {
            SessionState::Completed
        } else {
            SessionState::Editing(self.active_index)
        };
        tracing::info!(
            exported = report.results().count(),
            failed = report.failures().count(),
            "finalize finished"
        );
        Ok(CropOutcome::Completed(report))
    }

    /// Complete the session with whatever has been exported, in order.
    pub fn accept_partial(&mut self) -> Result<Vec<CropResult>, CropError> {
        self.ensure_editing()?;
        let results = self
            .entries
            .iter()
            .filter_map(|entry| entry.committed.clone())
            .collect();
        self.state = SessionState::Completed;
        Ok(results)
    }

    /// Finish a single-asset flow.
    ///
    /// Unlike a batch, a rejected or failing asset blocks: the error is
    /// returned and the session stays editable.
    pub fn finish_single(
        &mut self,
        encoder: &dyn CropEncoder,
    ) -> Result<CropOutcome<CropResult>, CropError> {
        if self.state == SessionState::Cancelled {
            return Ok(CropOutcome::Cancelled);
        }
        let result = self.commit_active(encoder)?.clone();
        self.state = SessionState::Completed;
        Ok(CropOutcome::Completed(result))
    }

    /// Discard all framing and uncommitted work.
    ///
    /// Remote state created by an uploader is untouched.
    pub fn cancel(&mut self) {
        if self.state == SessionState::Completed {
            return;
        }
        for entry in &mut self.entries {
            entry.transform = None;
            entry.committed = None;
        }
        self.controller = build_controller(&self.entries[self.active_index], self.viewport, &self.config);
        self.state = SessionState::Cancelled;
        tracing::info!("session cancelled");
    }

    fn preload_active(&mut self) {
        let dims = self.entries[self.active_index].dimensions;
        if dims.is_loaded() {
            if let Err(error) = self.asset_loaded(dims.width, dims.height) {
                tracing::debug!(index = self.active_index, %error, "preloaded asset not editable");
            }
        }
    }

    fn ensure_editing(&self) -> Result<(), CropError> {
        match self.state {
            SessionState::Editing(_) => Ok(()),
            state => Err(CropError::SessionClosed { state }),
        }
    }

    fn check_index(&self, index: usize) -> Result<(), CropError> {
        if index >= self.entries.len() {
            return Err(CropError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        Ok(())
    }
}

fn frame_of(key: PresetKey, viewport: Viewport, config: &CropConfig) -> Frame {
    preset(key).frame_for_viewport(viewport.width, viewport.height, config.max_frame_height_fraction)
}

fn build_controller(entry: &SessionEntry, viewport: Viewport, config: &CropConfig) -> TransformController {
    let frame = frame_of(entry.preset_key, viewport, config);
    TransformController::new(entry.source_uri.clone(), preset(entry.preset_key), frame, config)
}
