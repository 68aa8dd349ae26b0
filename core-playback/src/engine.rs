//! # Player Engine
//!
//! Single owner of the live audio session and all observable playback state.
//!
//! ## Concurrency
//!
//! All state lives behind one async mutex; every command acquires it for the
//! full duration of its host-audio calls, so transitions are serialized in
//! call order and the exposed state never shows two tracks as current. The
//! engine unloads the previous session before loading the next one, keeping
//! at most one live audio resource at any time.
//!
//! ## Stale callbacks
//!
//! Each successful load yields a fresh [`SessionId`]. The status pump drops
//! any update whose session is not the current one, which is what keeps a
//! fast next/next double-tap from corrupting state when the superseded
//! load's callbacks straggle in.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bridge_traits::playback::{AudioOutput, AudioStatusUpdate, LoadRequest, SessionId};
use core_library::Track;
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{PlaybackError, Result};
use crate::state::{PlayerSnapshot, RepeatMode, Transport};

/// Mutable engine state, guarded by `Inner::state`.
#[derive(Default)]
struct EngineState {
    track: Option<Track>,
    queue: Vec<Track>,
    transport: Transport,
    position: Duration,
    duration: Option<Duration>,
    repeat: RepeatMode,
    is_favorite: bool,
    /// Live audio session, `None` whenever no resource is loaded.
    session: Option<SessionId>,
}

impl EngineState {
    /// Index of the current track within the queue, by track id.
    fn queue_index(&self) -> Option<usize> {
        let track = self.track.as_ref()?;
        self.queue.iter().position(|q| q.id == track.id)
    }

    fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            track: self.track.clone(),
            queue: self.queue.clone(),
            queue_index: self.queue_index(),
            transport: self.transport,
            position: self.position,
            duration: self.duration,
            repeat: self.repeat,
            is_favorite: self.is_favorite,
        }
    }

    /// Queue position next() would advance to, wrapping only on repeat-all.
    fn next_target(&self) -> Option<usize> {
        if self.queue.is_empty() {
            return None;
        }
        match self.queue_index() {
            Some(i) if i + 1 < self.queue.len() => Some(i + 1),
            _ if self.repeat == RepeatMode::All => Some(0),
            _ => None,
        }
    }

    /// Queue position previous() would move to, wrapping only on repeat-all.
    fn previous_target(&self) -> Option<usize> {
        if self.queue.is_empty() {
            return None;
        }
        match self.queue_index() {
            Some(i) if i > 0 => Some(i - 1),
            _ if self.repeat == RepeatMode::All => Some(self.queue.len() - 1),
            _ => None,
        }
    }
}

struct Inner {
    audio: Arc<dyn AudioOutput>,
    events: EventBus,
    state: Mutex<EngineState>,
    snapshot: watch::Sender<PlayerSnapshot>,
}

/// The playback engine.
///
/// Construct one per application via [`PlayerEngine::new`]; the UI layer
/// observes it through [`PlayerEngine::subscribe`] and drives it through the
/// command methods. Dropping the engine aborts the status pump and releases
/// any live session on a best-effort basis; hosts that can await should call
/// [`PlayerEngine::shutdown`] instead.
pub struct PlayerEngine {
    inner: Arc<Inner>,
    pump: JoinHandle<()>,
}

impl PlayerEngine {
    pub fn new(audio: Arc<dyn AudioOutput>, events: EventBus) -> Self {
        let (snapshot, _) = watch::channel(PlayerSnapshot::default());
        let inner = Arc::new(Inner {
            audio: audio.clone(),
            events,
            state: Mutex::new(EngineState::default()),
            snapshot,
        });

        // The pump holds only a weak handle so dropping the engine ends it.
        let weak = Arc::downgrade(&inner);
        let mut updates = audio.subscribe();
        let pump = tokio::spawn(async move {
            loop {
                match updates.recv().await {
                    Ok(update) => {
                        let Some(inner) = weak.upgrade() else { break };
                        inner.handle_status(update).await;
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(missed, "Status pump lagged behind the audio output");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Self { inner, pump }
    }

    /// Subscribe to state snapshots. The current snapshot is available
    /// immediately via `borrow()`.
    pub fn subscribe(&self) -> watch::Receiver<PlayerSnapshot> {
        self.inner.snapshot.subscribe()
    }

    /// The current state snapshot.
    pub fn snapshot(&self) -> PlayerSnapshot {
        self.inner.snapshot.borrow().clone()
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Load and play a track.
    ///
    /// A non-empty `queue` replaces the current queue; an empty one retains
    /// it. A track without a stream URL is rejected up front and leaves all
    /// state untouched.
    pub async fn play_track(&self, track: Track, queue: Vec<Track>) -> Result<()> {
        if !track.is_playable() {
            self.inner.emit(PlaybackEvent::Error {
                track_id: Some(track.id.clone()),
                message: "Track has no audio source".to_string(),
            });
            return Err(PlaybackError::NoAudioSource);
        }

        let mut state = self.inner.state.lock().await;
        let new_queue = (!queue.is_empty()).then_some(queue);
        self.inner
            .load_track(&mut state, track, new_queue, Duration::ZERO)
            .await
    }

    /// Toggle between playing and paused. A no-op while idle or loading.
    ///
    /// When paused without a live session (the aftermath of a failed load),
    /// the current track is reloaded at the saved position.
    pub async fn toggle_play_pause(&self) -> Result<()> {
        let mut state = self.inner.state.lock().await;
        match (state.transport, state.session) {
            (Transport::Playing, Some(session)) => {
                self.inner.audio.pause(session).await?;
                state.transport = Transport::Paused;
                if let Some(track) = &state.track {
                    self.inner.emit(PlaybackEvent::Paused {
                        track_id: track.id.clone(),
                    });
                }
                self.inner.publish(&state);
                Ok(())
            }
            (Transport::Paused, Some(session)) => {
                self.inner.audio.play(session).await?;
                state.transport = Transport::Playing;
                if let Some(track) = &state.track {
                    self.inner.emit(PlaybackEvent::Resumed {
                        track_id: track.id.clone(),
                    });
                }
                self.inner.publish(&state);
                Ok(())
            }
            (Transport::Paused, None) => {
                let Some(track) = state.track.clone() else {
                    return Ok(());
                };
                let start = state.position;
                self.inner.load_track(&mut state, track, None, start).await
            }
            _ => Ok(()),
        }
    }

    /// Seek to an absolute position, clamped to the known duration.
    ///
    /// Resolves once the audio output has acknowledged the seek. A no-op
    /// when no resource is loaded.
    pub async fn seek_to(&self, position: Duration) -> Result<()> {
        let mut state = self.inner.state.lock().await;
        let Some(session) = state.session else {
            return Ok(());
        };
        if !matches!(state.transport, Transport::Playing | Transport::Paused) {
            return Ok(());
        }

        let clamped = match state.duration {
            Some(duration) => position.min(duration),
            None => position,
        };
        self.inner.audio.seek(session, clamped).await?;
        state.position = clamped;
        self.inner.publish(&state);
        Ok(())
    }

    /// Advance to the next queue entry, wrapping only on repeat-all.
    /// A no-op at the end of the queue otherwise.
    pub async fn play_next(&self) -> Result<()> {
        let mut state = self.inner.state.lock().await;
        let Some(target) = state.next_target() else {
            return Ok(());
        };
        let track = state.queue[target].clone();
        self.play_from_queue(&mut state, track).await
    }

    /// Move to the previous queue entry, wrapping only on repeat-all.
    pub async fn play_previous(&self) -> Result<()> {
        let mut state = self.inner.state.lock().await;
        let Some(target) = state.previous_target() else {
            return Ok(());
        };
        let track = state.queue[target].clone();
        self.play_from_queue(&mut state, track).await
    }

    /// Flip the favorite flag of the current track. A no-op with no track.
    pub async fn toggle_favorite(&self) {
        let mut state = self.inner.state.lock().await;
        if state.track.is_none() {
            return;
        }
        state.is_favorite = !state.is_favorite;
        self.inner.publish(&state);
    }

    /// Cycle the repeat mode: off, repeat-all, repeat-one.
    pub async fn toggle_repeat(&self) {
        let mut state = self.inner.state.lock().await;
        state.repeat = state.repeat.cycled();
        self.inner.publish(&state);
    }

    /// Release the audio resource and clear the current track.
    ///
    /// The queue is preserved so a subsequent play can resume browsing
    /// context.
    pub async fn stop(&self) {
        let mut state = self.inner.state.lock().await;
        if let Some(session) = state.session.take() {
            if let Err(e) = self.inner.audio.unload(session).await {
                warn!(error = %e, "Failed to unload audio session on stop");
            }
        }
        state.track = None;
        state.transport = Transport::Idle;
        state.position = Duration::ZERO;
        state.duration = None;
        state.is_favorite = false;
        self.inner.emit(PlaybackEvent::Stopped);
        self.inner.publish(&state);
    }

    /// Tear the engine down: stop the status pump and release any live
    /// session. Safe to call more than once.
    pub async fn shutdown(&self) {
        self.pump.abort();
        let mut state = self.inner.state.lock().await;
        if let Some(session) = state.session.take() {
            self.inner.audio.unload(session).await.ok();
        }
        state.transport = Transport::Idle;
        self.inner.publish(&state);
    }

    async fn play_from_queue(
        &self,
        state: &mut EngineState,
        track: Track,
    ) -> Result<()> {
        if !track.is_playable() {
            self.inner.emit(PlaybackEvent::Error {
                track_id: Some(track.id.clone()),
                message: "Track has no audio source".to_string(),
            });
            return Err(PlaybackError::NoAudioSource);
        }
        self.inner
            .load_track(state, track, None, Duration::ZERO)
            .await
    }
}

impl Drop for PlayerEngine {
    fn drop(&mut self) {
        self.pump.abort();
        // Best-effort release of a live session; shutdown() is the reliable
        // path for hosts that can await.
        if let Ok(mut state) = self.inner.state.try_lock() {
            if let Some(session) = state.session.take() {
                let audio = self.inner.audio.clone();
                if let Ok(handle) = tokio::runtime::Handle::try_current() {
                    handle.spawn(async move {
                        audio.unload(session).await.ok();
                    });
                }
            }
        }
    }
}

impl std::fmt::Debug for PlayerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerEngine")
            .field("snapshot", &self.snapshot())
            .finish()
    }
}

impl Inner {
    fn publish(&self, state: &EngineState) {
        self.snapshot.send_replace(state.snapshot());
    }

    fn emit(&self, event: PlaybackEvent) {
        self.events.emit(CoreEvent::Playback(event)).ok();
    }

    /// Unload the previous session, then load `track` and start playing.
    ///
    /// On failure the engine never stays in `Loading`: with a prior track the
    /// exposed state is restored (paused, session gone, reload on resume),
    /// otherwise everything resets to idle.
    async fn load_track(
        &self,
        state: &mut EngineState,
        track: Track,
        new_queue: Option<Vec<Track>>,
        start: Duration,
    ) -> Result<()> {
        let prior_track = state.track.clone();
        let prior_transport = state.transport;
        let prior_position = state.position;
        let prior_duration = state.duration;
        let prior_favorite = state.is_favorite;

        if let Some(session) = state.session.take() {
            if let Err(e) = self.audio.unload(session).await {
                warn!(error = %e, "Failed to unload previous audio session");
            }
        }

        let track_changed = prior_track.as_ref().map_or(true, |t| t.id != track.id);

        state.transport = Transport::Loading;
        state.track = Some(track.clone());
        if let Some(queue) = new_queue {
            state.queue = queue;
        }
        state.position = start;
        state.duration = track.duration_secs.map(|s| Duration::from_secs(s.into()));
        if track_changed {
            state.is_favorite = false;
        }
        self.publish(state);

        let mut metadata = HashMap::new();
        metadata.insert("title".to_string(), track.title.clone());
        metadata.insert("artist".to_string(), track.artist.clone());
        let request = LoadRequest::new(track.audio_url.clone())
            .with_start_position(start)
            .with_metadata(metadata);

        match self.audio.load(request).await {
            Ok(session) => {
                info!(track_id = %track.id, session = %session, "Track loaded");
                state.session = Some(session);
                state.transport = Transport::Playing;
                self.emit(PlaybackEvent::Started {
                    track_id: track.id.clone(),
                });
                self.publish(state);
                Ok(())
            }
            Err(e) => {
                warn!(track_id = %track.id, error = %e, "Failed to load track");
                state.session = None;
                if prior_track.is_some() {
                    state.track = prior_track;
                    state.transport = Transport::Paused;
                    state.position = prior_position;
                    state.duration = prior_duration;
                    state.is_favorite = prior_favorite;
                } else {
                    debug!(prior = ?prior_transport, "No prior track, resetting to idle");
                    state.track = None;
                    state.transport = Transport::Idle;
                    state.position = Duration::ZERO;
                    state.duration = None;
                    state.is_favorite = false;
                }
                self.emit(PlaybackEvent::Error {
                    track_id: Some(track.id.clone()),
                    message: e.to_string(),
                });
                self.publish(state);
                Err(PlaybackError::LoadFailed {
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Apply one status update from the audio output.
    async fn handle_status(&self, update: AudioStatusUpdate) {
        let mut state = self.state.lock().await;
        if state.session != Some(update.session) {
            debug!(session = %update.session, "Dropping status update from a stale session");
            return;
        }

        state.position = update.position;
        if update.duration.is_some() {
            state.duration = update.duration;
        }

        if !update.did_just_finish {
            self.publish(&state);
            return;
        }

        if let Some(track) = &state.track {
            self.emit(PlaybackEvent::Completed {
                track_id: track.id.clone(),
            });
        }

        if state.repeat == RepeatMode::One {
            self.replay_current(&mut state, update.session).await;
            return;
        }

        // Off and repeat-all share the next() advance logic; off simply
        // finds no target at the end of the queue.
        match state.next_target() {
            Some(target) => {
                let track = state.queue[target].clone();
                if track.is_playable() {
                    self.load_track(&mut state, track, None, Duration::ZERO)
                        .await
                        .ok();
                } else {
                    self.settle_idle(&mut state).await;
                }
            }
            None => self.settle_idle(&mut state).await,
        }
    }

    /// Repeat-one: restart the finished track in place on the same session.
    async fn replay_current(&self, state: &mut EngineState, session: SessionId) {
        state.position = Duration::ZERO;
        let restarted = self.audio.seek(session, Duration::ZERO).await.is_ok()
            && self.audio.play(session).await.is_ok();
        if restarted {
            state.transport = Transport::Playing;
            if let Some(track) = &state.track {
                self.emit(PlaybackEvent::Started {
                    track_id: track.id.clone(),
                });
            }
        } else {
            warn!("Failed to restart track for repeat-one, releasing session");
            self.audio.unload(session).await.ok();
            state.session = None;
            state.transport = Transport::Idle;
        }
        self.publish(state);
    }

    /// Natural end with nothing to advance to: release the session and go
    /// idle, keeping the track and queue for display.
    async fn settle_idle(&self, state: &mut EngineState) {
        if let Some(session) = state.session.take() {
            self.audio.unload(session).await.ok();
        }
        state.transport = Transport::Idle;
        state.position = Duration::ZERO;
        self.publish(state);
    }
}
