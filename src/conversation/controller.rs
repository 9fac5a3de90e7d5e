//! Conversation Controller — runs the per-turn reaction pipeline.
//!
//! A turn goes: append user message → classify → (action mode) emit emote
//! → thinking delay → respond → append reply → speak. The controller is the
//! only writer of history, speaking, emotion and emote state; everything
//! else reads snapshots or subscribes to [`CompanionEvent`]s.
//!
//! Turns overlap freely. Replies are appended in submission order through a
//! sequence gate, and the speech driver guarantees only the newest reply is
//! audible.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use super::events::CompanionEvent;
use super::history::{History, Message};
use crate::ai::classifier::{classify_tag, Emote, Emotion, ReactionMode, Tag};
use crate::ai::persona::Persona;
use crate::ai::responder::respond;
use crate::ai::typing_sim::ThinkingDelay;
use crate::avatar::AvatarState;
use crate::config::CompanionConfig;
use crate::tts::{tone_for, SpeechCallbacks, SpeechDriver};

const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub persona: Persona,
    pub mode: ReactionMode,
    pub thinking_delay: ThinkingDelay,
    /// How long an emote stays on screen unless replaced.
    pub emote_clear_after: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            persona: Persona::default(),
            mode: ReactionMode::default(),
            thinking_delay: ThinkingDelay::default(),
            emote_clear_after: Duration::from_millis(1500),
        }
    }
}

impl From<&CompanionConfig> for ControllerSettings {
    fn from(config: &CompanionConfig) -> Self {
        Self {
            persona: config.persona,
            mode: config.mode,
            thinking_delay: config.thinking_delay,
            emote_clear_after: Duration::from_millis(config.emote_clear_ms),
        }
    }
}

struct State {
    history: History,
    persona: Persona,
    emotion: Emotion,
    emote: Option<Emote>,
    speaking: bool,
    /// Bumped on persona change; replies from an older session are dropped.
    session: u64,
    next_turn: u64,
    emote_generation: u64,
    pending_clear: Option<JoinHandle<()>>,
}

struct Inner {
    state: Mutex<State>,
    speech: SpeechDriver,
    mode: ReactionMode,
    thinking_delay: ThinkingDelay,
    emote_clear_after: Duration,
    events: broadcast::Sender<CompanionEvent>,
    /// Sequence number of the next turn allowed to append its reply.
    reply_gate: watch::Sender<u64>,
}

/// A submitted turn. Await [`Turn::reply`] to get the appended reply.
pub struct Turn {
    pub seq: u64,
    pub tag: Tag,
    handle: JoinHandle<Option<String>>,
}

impl Turn {
    /// The reply text, or `None` if the turn was discarded by a persona change.
    pub async fn reply(self) -> Option<String> {
        self.handle.await.ok().flatten()
    }
}

/// Cheap to clone; all clones drive the same conversation.
///
/// Methods that start timers or turns must be called from within a Tokio
/// runtime.
#[derive(Clone)]
pub struct ConversationController {
    inner: Arc<Inner>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ConversationController {
    pub fn new(settings: ControllerSettings, speech: SpeechDriver) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (reply_gate, _) = watch::channel(0);
        let state = State {
            history: History::seeded(settings.persona),
            persona: settings.persona,
            emotion: Emotion::Neutral,
            emote: None,
            speaking: false,
            session: 0,
            next_turn: 0,
            emote_generation: 0,
            pending_clear: None,
        };
        tracing::info!(
            "[Chat] Controller ready: persona={}, mode={:?}, speech={}",
            settings.persona,
            settings.mode,
            speech.engine_id()
        );
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(state),
                speech,
                mode: settings.mode,
                thinking_delay: settings.thinking_delay,
                emote_clear_after: settings.emote_clear_after,
                events,
                reply_gate,
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CompanionEvent> {
        self.inner.events.subscribe()
    }

    // ── Snapshots ──────────────────────────────────────

    pub fn messages(&self) -> Vec<Message> {
        lock(&self.inner.state).history.messages().to_vec()
    }

    pub fn persona(&self) -> Persona {
        lock(&self.inner.state).persona
    }

    pub fn mode(&self) -> ReactionMode {
        self.inner.mode
    }

    pub fn emotion(&self) -> Emotion {
        lock(&self.inner.state).emotion
    }

    pub fn emote(&self) -> Option<Emote> {
        lock(&self.inner.state).emote
    }

    pub fn is_speaking(&self) -> bool {
        lock(&self.inner.state).speaking
    }

    /// Everything the avatar renderer needs.
    pub fn avatar_state(&self) -> AvatarState {
        let state = lock(&self.inner.state);
        AvatarState {
            speaking: state.speaking,
            emotion: state.emotion,
            persona: state.persona,
        }
    }

    pub fn speech(&self) -> &SpeechDriver {
        &self.inner.speech
    }

    // ── Turns ──────────────────────────────────────────

    /// Submit user text. Whitespace-only input is ignored and returns `None`.
    pub fn submit(&self, text: &str) -> Option<Turn> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let tag = classify_tag(text, self.inner.mode);
        let (seq, session, persona) = {
            let mut state = lock(&self.inner.state);
            let index = state.history.push(Message::user(text));
            // Published under the lock so subscribers see appends in index order
            self.inner.emit(CompanionEvent::MessageAppended {
                index,
                message: Message::user(text),
            });
            let seq = state.next_turn;
            state.next_turn += 1;
            (seq, state.session, state.persona)
        };
        tracing::info!("[Chat] Turn {} classified as {:?}", seq, tag);

        // Emotes react before the reply exists
        if self.inner.mode == ReactionMode::Action {
            self.trigger_emote(tag.emote());
        }

        let inner = self.inner.clone();
        let text = text.to_string();
        let delay = self.inner.thinking_delay.sample();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let reply = respond(&text, persona, tag);

            let mut gate = inner.reply_gate.subscribe();
            if gate.wait_for(|next| *next == seq).await.is_err() {
                return None;
            }
            let appended = Inner::finish_turn(&inner, seq, session, persona, tag, reply);
            inner.reply_gate.send_modify(|next| *next += 1);
            appended
        });

        Some(Turn { seq, tag, handle })
    }

    /// Switch persona. History resets to the new persona's greeting, speech
    /// in flight is cancelled and pending replies of the old session are
    /// dropped. Selecting the current persona does nothing.
    pub fn set_persona(&self, persona: Persona) {
        {
            let mut state = lock(&self.inner.state);
            if state.persona == persona {
                return;
            }
            state.persona = persona;
            state.session += 1;
            state.emotion = Emotion::Neutral;
            state.history.reset(persona);
            let seed = state.history.messages()[0].clone();
            self.inner.emit(CompanionEvent::PersonaChanged { persona });
            self.inner.emit(CompanionEvent::HistoryReset { persona, seed });
            self.inner.emit(CompanionEvent::EmotionChanged {
                emotion: Emotion::Neutral,
            });
        }
        tracing::info!("[Chat] Persona switched to {}", persona);

        // Outside the lock: cancelling fires on_end, which takes it again
        self.inner.speech.cancel();
    }

    /// Show an emote on the scene, or clear it with `None`.
    ///
    /// Any pending auto-clear is cancelled; a new one is armed for the
    /// new emote.
    pub fn trigger_emote(&self, emote: Option<Emote>) {
        {
            let mut state = lock(&self.inner.state);
            if let Some(pending) = state.pending_clear.take() {
                pending.abort();
            }
            state.emote_generation += 1;
            state.emote = emote;

            if emote.is_some() {
                let generation = state.emote_generation;
                let weak = Arc::downgrade(&self.inner);
                let after = self.inner.emote_clear_after;
                state.pending_clear = Some(tokio::spawn(async move {
                    tokio::time::sleep(after).await;
                    if let Some(inner) = weak.upgrade() {
                        inner.expire_emote(generation);
                    }
                }));
            }
            self.inner.emit(CompanionEvent::EmoteChanged { emote });
        }
    }
}

impl Inner {
    fn emit(&self, event: CompanionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn finish_turn(
        inner: &Arc<Inner>,
        seq: u64,
        session: u64,
        persona: Persona,
        tag: Tag,
        reply: String,
    ) -> Option<String> {
        let emotion = tag.emotion();
        {
            let mut state = lock(&inner.state);
            if state.session != session {
                tracing::debug!("[Chat] Dropping reply for turn {} from an old session", seq);
                return None;
            }
            let index = state.history.push(Message::assistant(reply.clone()));
            inner.emit(CompanionEvent::MessageAppended {
                index,
                message: Message::assistant(reply.clone()),
            });
            if inner.mode == ReactionMode::Emotion {
                state.emotion = emotion;
                inner.emit(CompanionEvent::EmotionChanged { emotion });
            }
        }

        let on_start = Arc::downgrade(inner);
        let on_end = Arc::downgrade(inner);
        inner.speech.speak(
            &reply,
            tone_for(emotion),
            persona.voice_hint(),
            SpeechCallbacks::new()
                .on_start(move || Inner::set_speaking(&on_start, true))
                .on_end(move |end| {
                    tracing::debug!("[Chat] Speech for turn {} ended: {:?}", seq, end);
                    Inner::set_speaking(&on_end, false);
                }),
        );

        Some(reply)
    }

    fn set_speaking(weak: &Weak<Inner>, speaking: bool) {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        let mut state = lock(&inner.state);
        if state.speaking != speaking {
            state.speaking = speaking;
            inner.emit(CompanionEvent::SpeakingChanged { speaking });
        }
    }

    fn expire_emote(&self, generation: u64) {
        let mut state = lock(&self.state);
        if state.emote_generation != generation {
            return;
        }
        state.emote = None;
        state.pending_clear = None;
        self.emit(CompanionEvent::EmoteChanged { emote: None });
    }
}
