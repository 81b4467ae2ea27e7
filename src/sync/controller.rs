//! Session controller: one narration at a time, polled into word indices.
//!
//! [`SyncController`] owns the single narration output slot.  `start`
//! prepares a narration with the configured [`TimingStrategy`], then a driver
//! task polls the narration's [`WordIndexResolver`] on a fixed cadence and
//! emits [`SyncEvent`]s.
//!
//! # Session flow
//!
//! ```text
//! start(text, words)
//!   ├─ active session? ──▶ stop it (Idle)
//!   ├─ generation += 1, Loading if the strategy prepares remotely
//!   └─▶ strategy.prepare(..).await         (lock released)
//!         ├─ generation moved on ──▶ cancel player, discard
//!         ├─ Err  ──▶ Error(msg), Errored
//!         └─ Ok   ──▶ player.play(), Playing, spawn driver
//!
//! driver (every poll interval, same generation only)
//!   ├─ Paused            ──▶ skip
//!   ├─ player Failed     ──▶ Error(msg), Errored
//!   ├─ player Finished   ──▶ last index, Completed
//!   └─ otherwise         ──▶ resolve → MonotonicIndex → WordIndexChanged
//! ```
//!
//! Every continuation re-checks the generation under the lock, and events are
//! sent while that lock is held, so nothing from a stopped or superseded
//! session is ever emitted.
//!
//! # Output slot
//!
//! Controllers share an [`OutputSlot`], by default the process-wide
//! [`OutputSlot::global`].  `start` claims the slot and stops whatever session
//! another controller is running in it, so at most one narration is audible
//! at a time.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use once_cell::sync::Lazy;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::{AppConfig, VoiceParams, MAX_POLL_INTERVAL_MS};
use crate::narration::{NarrationError, PlayerStatus, PreparedNarration, TimingStrategy};
use crate::playback::MonotonicIndex;
use crate::text::Chunk;

use super::state::{SyncEvent, SyncState};

// ---------------------------------------------------------------------------
// Shared session state
// ---------------------------------------------------------------------------

struct Session {
    words: Vec<String>,
    narration: PreparedNarration,
}

#[derive(Default)]
struct Inner {
    generation: u64,
    state: SyncState,
    index: MonotonicIndex,
    session: Option<Session>,
    driver: Option<JoinHandle<()>>,
}

struct Shared {
    inner: Mutex<Inner>,
    events: mpsc::UnboundedSender<SyncEvent>,
}

impl Shared {
    /// Lock the session.  Do **not** hold the guard across `.await` points.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: SyncEvent) {
        // A dropped receiver just means nobody is listening any more.
        let _ = self.events.send(event);
    }

    fn set_state(&self, inner: &mut Inner, state: SyncState) {
        if inner.state != state {
            log::debug!("sync: {} → {}", inner.state.label(), state.label());
            inner.state = state;
            self.emit(SyncEvent::StateChanged(state));
        }
    }

    fn advance_index(&self, inner: &mut Inner, resolved: Option<usize>) {
        if let Some(index) = inner.index.advance(resolved) {
            self.emit(SyncEvent::WordIndexChanged(index));
        }
    }

    /// Abort the driver, cancel the narration and go Idle.
    fn teardown(&self, inner: &mut Inner) {
        if let Some(driver) = inner.driver.take() {
            driver.abort();
        }
        if let Some(mut session) = inner.session.take() {
            session.narration.player.cancel();
        }
        inner.index.reset();
        self.set_state(inner, SyncState::Idle);
    }

    fn fail(&self, inner: &mut Inner, err: NarrationError) {
        log::error!("sync: {err}");
        inner.driver.take();
        if let Some(mut session) = inner.session.take() {
            session.narration.player.cancel();
        }
        inner.index.reset();
        self.emit(SyncEvent::Error(err.to_string()));
        self.set_state(inner, SyncState::Errored);
    }

    fn complete(&self, inner: &mut Inner) {
        if let Some(session) = inner.session.take() {
            log::info!("sync: narration of {} word(s) completed", session.words.len());
        }
        inner.driver.take();
        inner.index.reset();
        self.set_state(inner, SyncState::Completed);
    }

    /// One driver tick.  Returns `false` once the session is over.
    fn poll(&self, inner: &mut Inner) -> bool {
        if inner.state != SyncState::Playing {
            return inner.state == SyncState::Paused;
        }

        let (status, resolved) = {
            let Some(session) = inner.session.as_mut() else {
                return false;
            };
            let narration = &mut session.narration;
            let status = narration.player.status();
            let resolved = match status {
                PlayerStatus::Failed(_) => None,
                _ => narration
                    .resolver
                    .resolve(narration.player.position(), narration.player.duration()),
            };
            (status, resolved)
        };

        match status {
            PlayerStatus::Failed(reason) => {
                self.fail(inner, NarrationError::Playback(reason));
                false
            }
            PlayerStatus::Finished => {
                self.advance_index(inner, resolved);
                self.complete(inner);
                false
            }
            PlayerStatus::Ready | PlayerStatus::Playing | PlayerStatus::Paused => {
                self.advance_index(inner, resolved);
                true
            }
        }
    }
}

async fn drive(shared: Arc<Shared>, generation: u64, poll_interval: Duration) {
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let keep_going = {
            let mut inner = shared.lock();
            inner.generation == generation && shared.poll(&mut inner)
        };
        if !keep_going {
            break;
        }
    }
    log::debug!("sync: driver for generation {generation} finished");
}

// ---------------------------------------------------------------------------
// OutputSlot
// ---------------------------------------------------------------------------

static GLOBAL_SLOT: Lazy<OutputSlot> = Lazy::new(OutputSlot::new);

/// The narration output shared by a group of controllers.
///
/// Holds a weak reference to the controller that started last.  Lock order is
/// slot first, then the holder's session.
#[derive(Clone, Default)]
pub struct OutputSlot {
    holder: Arc<Mutex<Option<Weak<Shared>>>>,
}

impl OutputSlot {
    /// A slot private to the controllers built with it.
    pub fn new() -> Self {
        Self::default()
    }

    /// The slot every [`SyncController::new`] joins.
    pub fn global() -> Self {
        GLOBAL_SLOT.clone()
    }

    /// Take the slot for `shared`, stopping the previous holder's session.
    fn claim(&self, shared: &Arc<Shared>) {
        let mut holder = self.holder.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = holder.as_ref().and_then(Weak::upgrade);
        if let Some(previous) = previous.filter(|p| !Arc::ptr_eq(p, shared)) {
            let mut inner = previous.lock();
            if inner.state.is_active() {
                log::debug!(
                    "sync: output claimed, stopping {} session of another controller",
                    inner.state.label()
                );
                inner.generation += 1;
                previous.teardown(&mut inner);
            }
        }
        *holder = Some(Arc::downgrade(shared));
    }
}

// ---------------------------------------------------------------------------
// SyncController
// ---------------------------------------------------------------------------

/// Drives one narration session at a time.
///
/// Cheap to clone; clones control the same session.
///
/// ```rust,no_run
/// use reel_reader::config::AppConfig;
/// use reel_reader::narration::{build_strategy, Backends};
/// use reel_reader::sync::{SyncController, SyncEvent};
/// use reel_reader::text::tokenize;
///
/// # async fn example() {
/// let config = AppConfig::default();
/// let strategy = build_strategy(&config.narration, Backends::default());
/// let (controller, mut events) = SyncController::from_config(strategy, &config);
///
/// let text = "The quick brown fox.";
/// controller.start(text, tokenize(text)).await;
/// while let Some(event) = events.recv().await {
///     if let SyncEvent::WordIndexChanged(i) = event {
///         println!("word {i}");
///     }
/// }
/// # }
/// ```
#[derive(Clone)]
pub struct SyncController {
    shared: Arc<Shared>,
    slot: OutputSlot,
    strategy: Arc<dyn TimingStrategy>,
    voice: VoiceParams,
    poll_interval: Duration,
}

impl SyncController {
    /// Create a controller and the receiving end of its event channel.
    ///
    /// # Arguments
    ///
    /// * `strategy`      — narration back-end (see `narration::build_strategy`).
    /// * `voice`         — voice parameters handed to every `prepare`.
    /// * `poll_interval` — resolver polling cadence, clamped to
    ///   1..=[`MAX_POLL_INTERVAL_MS`] ms.
    ///
    /// The controller joins [`OutputSlot::global`].
    pub fn new(
        strategy: Arc<dyn TimingStrategy>,
        voice: VoiceParams,
        poll_interval: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<SyncEvent>) {
        Self::with_slot(strategy, voice, poll_interval, OutputSlot::global())
    }

    /// Like [`new`](Self::new), sharing `slot` instead of the global one.
    pub fn with_slot(
        strategy: Arc<dyn TimingStrategy>,
        voice: VoiceParams,
        poll_interval: Duration,
        slot: OutputSlot,
    ) -> (Self, mpsc::UnboundedReceiver<SyncEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let poll_interval = poll_interval.clamp(
            Duration::from_millis(1),
            Duration::from_millis(MAX_POLL_INTERVAL_MS),
        );
        let controller = Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner::default()),
                events,
            }),
            slot,
            strategy,
            voice,
            poll_interval,
        };
        (controller, rx)
    }

    /// Controller using the voice and polling cadence from `config`.
    pub fn from_config(
        strategy: Arc<dyn TimingStrategy>,
        config: &AppConfig,
    ) -> (Self, mpsc::UnboundedReceiver<SyncEvent>) {
        Self::new(
            strategy,
            config.voice.clone(),
            config.narration.poll_interval(),
        )
    }

    // -----------------------------------------------------------------------
    // Transport
    // -----------------------------------------------------------------------

    /// Narrate `text`, highlighting indices into `words`.
    ///
    /// Any active session is stopped first, including one another controller
    /// runs in the same [`OutputSlot`].  Returns the state once preparation
    /// has settled (`Playing`, `Errored`, or whatever a concurrent
    /// `stop`/`start` left behind when this call was superseded).
    pub async fn start(&self, text: &str, words: Vec<String>) -> SyncState {
        self.slot.claim(&self.shared);
        let generation = {
            let mut inner = self.shared.lock();
            if inner.state.is_active() {
                log::debug!("sync: superseding {} session", inner.state.label());
                self.shared.teardown(&mut inner);
            }
            inner.generation += 1;
            inner.index.reset();
            if self.strategy.needs_preparation() {
                self.shared.set_state(&mut inner, SyncState::Loading);
            }
            inner.generation
        };

        let prepared = self.strategy.prepare(text, &words, &self.voice).await;

        let mut inner = self.shared.lock();
        if inner.generation != generation {
            log::debug!(
                "sync: discarding preparation for stale generation {generation} (now {})",
                inner.generation
            );
            if let Ok(mut narration) = prepared {
                narration.player.cancel();
            }
            return inner.state;
        }

        match prepared {
            Err(err) => self.shared.fail(&mut inner, err),
            Ok(mut narration) => {
                log::debug!(
                    "sync: playing {} word(s) with {} timing",
                    words.len(),
                    narration.resolver.label()
                );
                narration.player.play();
                inner.session = Some(Session { words, narration });
                self.shared.set_state(&mut inner, SyncState::Playing);
                inner.driver = Some(tokio::spawn(drive(
                    Arc::clone(&self.shared),
                    generation,
                    self.poll_interval,
                )));
            }
        }
        inner.state
    }

    /// Narrate one chunk.
    pub async fn play_chunk(&self, chunk: &Chunk) -> SyncState {
        self.start(&chunk.text, chunk.words.clone()).await
    }

    /// Freeze audio and word index.  Only valid while Playing.
    pub fn pause(&self) -> bool {
        let mut inner = self.shared.lock();
        if inner.state != SyncState::Playing {
            return false;
        }
        if let Some(session) = inner.session.as_mut() {
            session.narration.player.pause();
        }
        self.shared.set_state(&mut inner, SyncState::Paused);
        true
    }

    /// Continue from the frozen word.  Only valid while Paused.
    pub fn resume(&self) -> bool {
        let mut inner = self.shared.lock();
        if inner.state != SyncState::Paused {
            return false;
        }
        let current = inner.index.current();
        if let Some(session) = inner.session.as_mut() {
            let narration = &mut session.narration;
            narration.player.resume();
            narration.resolver.resume(
                narration.player.position(),
                current,
                narration.player.duration(),
            );
        }
        self.shared.set_state(&mut inner, SyncState::Playing);
        true
    }

    /// End the session from any state.  Idempotent.
    pub fn stop(&self) {
        let mut inner = self.shared.lock();
        inner.generation += 1;
        self.shared.teardown(&mut inner);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn state(&self) -> SyncState {
        self.shared.lock().state
    }

    /// Index of the highlighted word; `None` when no word is active.
    pub fn current_word_index(&self) -> Option<usize> {
        self.shared.lock().index.current()
    }

    /// [`current_word_index`](Self::current_word_index) with `-1` for none.
    pub fn index_or_sentinel(&self) -> i64 {
        self.current_word_index()
            .and_then(|i| i64::try_from(i).ok())
            .unwrap_or(-1)
    }

    /// Counter bumped by every `start` and `stop`.
    pub fn generation(&self) -> u64 {
        self.shared.lock().generation
    }

    /// Effective resolver polling cadence.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
