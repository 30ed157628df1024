//! The clip sequencer: deterministic, fully sequential playback with fixed
//! dwell gaps.
//!
//! Planning is pure ([`plan_tokens`]); execution is async so the dwell is a
//! cancellable timer rather than a blocked thread.  Cancellation is a
//! `watch`-channel generation counter: the UI bumps it when the owning view
//! closes, and the sequencer stops at the next step boundary.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};

use super::catalog::ClipCatalog;
use super::player::ClipPlayer;
use super::tokenize::tokenize;

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

/// One step of a playback plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanStep {
    /// Start this clip (non-blocking).
    Clip(PathBuf),
    /// Hold for the dwell duration.
    Dwell,
}

/// Build the playback plan for `tokens`, in order.
///
/// Per token: a known word plays its clip, dwells, then shows the neutral
/// clip.  Anything else is spelled out — each alphabetic character with a
/// letter clip plays it, dwells, then shows the neutral clip; characters
/// without a clip show the neutral clip and dwell.
pub fn plan_tokens(catalog: &ClipCatalog, tokens: &[String]) -> Vec<PlanStep> {
    let mut plan = Vec::new();

    for token in tokens {
        if let Some(clip) = catalog.word(token) {
            plan.push(PlanStep::Clip(clip.to_path_buf()));
            plan.push(PlanStep::Dwell);
            plan.push(PlanStep::Clip(catalog.default_clip().to_path_buf()));
        } else {
            for ch in token.chars() {
                match catalog.letter(ch).filter(|_| ch.is_alphabetic()) {
                    Some(clip) => {
                        plan.push(PlanStep::Clip(clip.to_path_buf()));
                        plan.push(PlanStep::Dwell);
                        plan.push(PlanStep::Clip(catalog.default_clip().to_path_buf()));
                    }
                    None => {
                        plan.push(PlanStep::Clip(catalog.default_clip().to_path_buf()));
                        plan.push(PlanStep::Dwell);
                    }
                }
            }
        }
    }

    plan
}

// ---------------------------------------------------------------------------
// ClipSequencer
// ---------------------------------------------------------------------------

/// How a playback run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    Completed,
    Cancelled,
}

/// Executes playback plans against a [`ClipPlayer`].
pub struct ClipSequencer {
    catalog: Arc<ClipCatalog>,
    player: Arc<dyn ClipPlayer>,
    dwell: Duration,
}

impl ClipSequencer {
    pub fn new(catalog: Arc<ClipCatalog>, player: Arc<dyn ClipPlayer>, dwell: Duration) -> Self {
        Self {
            catalog,
            player,
            dwell,
        }
    }

    /// Tokenize a whole phrase and play it.
    pub async fn play_phrase(
        &self,
        phrase: &str,
        cancel: &mut watch::Receiver<u64>,
    ) -> PlayOutcome {
        let tokens = tokenize(phrase);
        self.play_tokens(&tokens, cancel).await
    }

    /// Play `tokens` in order, one plan step at a time.
    ///
    /// Returns [`PlayOutcome::Cancelled`] as soon as the cancellation
    /// generation moves past the value observed at entry; the in-flight
    /// clip is left to the player (a later play replaces it).
    pub async fn play_tokens(
        &self,
        tokens: &[String],
        cancel: &mut watch::Receiver<u64>,
    ) -> PlayOutcome {
        let start_gen = *cancel.borrow_and_update();

        for step in plan_tokens(&self.catalog, tokens) {
            if *cancel.borrow() != start_gen {
                return PlayOutcome::Cancelled;
            }

            match step {
                PlanStep::Clip(clip) => {
                    // A missing clip file is the player's problem; the
                    // sequence itself keeps its timing.
                    if let Err(e) = self.player.play(&clip) {
                        log::warn!("playback: {e}");
                    }
                }
                PlanStep::Dwell => {
                    tokio::select! {
                        _ = tokio::time::sleep(self.dwell) => {}
                        _ = cancel.changed() => return PlayOutcome::Cancelled,
                    }
                }
            }
        }

        PlayOutcome::Completed
    }
}

// ---------------------------------------------------------------------------
// Sequencer task
// ---------------------------------------------------------------------------

/// Playback requests accepted by [`run_sequencer`].
#[derive(Debug, Clone)]
pub enum SequencerCommand {
    /// Tokenize a recognized phrase and play all of it.
    PlayPhrase(String),
    /// Play an already-computed token list (the live-text diff).
    PlayTokens(Vec<String>),
}

/// Drive the sequencer from a command channel until it closes.
///
/// Requests are served one at a time, so clips from different requests can
/// never overlap.  Spawn as a tokio task from `main`.
pub async fn run_sequencer(
    sequencer: ClipSequencer,
    mut commands: mpsc::Receiver<SequencerCommand>,
    mut cancel: watch::Receiver<u64>,
) {
    while let Some(command) = commands.recv().await {
        let outcome = match command {
            SequencerCommand::PlayPhrase(phrase) => {
                log::debug!("playback: phrase {phrase:?}");
                sequencer.play_phrase(&phrase, &mut cancel).await
            }
            SequencerCommand::PlayTokens(tokens) => {
                log::debug!("playback: tokens {tokens:?}");
                sequencer.play_tokens(&tokens, &mut cancel).await
            }
        };
        if outcome == PlayOutcome::Cancelled {
            log::debug!("playback: sequence cancelled");
        }
    }

    log::info!("playback: command channel closed, sequencer shutting down");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
