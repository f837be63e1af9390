use kiosk_core::{
    media_cue, Catalog, Command, DisplayEvent, DisplayState, MediaCue, TransitionKind,
};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::dispatcher::{route, route_token, InterceptPolicy};
use crate::media::{MediaClips, PlaybackId};
use crate::ports::{FrameSink, MediaPort, Subscription};
use crate::store::DisplayStore;
use crate::viewmodel::{frame, Frame};

/// Inputs serialized through the kernel queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayInput {
    Remote(String),
    MediaEnded { playback: PlaybackId },
}

#[derive(Debug, Clone, Default)]
pub struct DisplayOptions {
    pub policy: InterceptPolicy,
    pub clips: MediaClips,
}

/// One display: applies remote commands and clip completions in arrival order
/// and drives the media player and the screen from the resulting state.
pub struct DisplayKernel<M, F> {
    pub store: DisplayStore,
    catalog: Catalog,
    options: DisplayOptions,
    media: M,
    sink: F,
    playback: Option<PlaybackId>,
    finished: Option<oneshot::Receiver<()>>,
    last_frame: Option<Frame>,

    tx: mpsc::Sender<DisplayInput>,
    rx: mpsc::Receiver<DisplayInput>,
}

enum Wake {
    Stopped,
    Input(Option<DisplayInput>),
    ClipFinished(bool),
}

impl<M, F> DisplayKernel<M, F>
where
    M: MediaPort,
    F: FrameSink,
{
    pub fn new(
        store: DisplayStore,
        catalog: Catalog,
        media: M,
        sink: F,
        options: DisplayOptions,
    ) -> Self {
        let (tx, rx) = mpsc::channel(kiosk_config::EVENT_QUEUE_CAPACITY);
        let mut kernel = Self {
            store,
            catalog,
            options,
            media,
            sink,
            playback: None,
            finished: None,
            last_frame: None,
            tx,
            rx,
        };
        let slide_count = kernel.catalog.len();
        kernel.apply(DisplayEvent::CatalogLoaded { slide_count });
        kernel
    }

    pub fn state(&self) -> DisplayState {
        self.store.state()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Queue handle for inputs produced off the kernel task. Remote tokens
    /// and external clip completions go through it in arrival order.
    pub fn sender(&self) -> mpsc::Sender<DisplayInput> {
        self.tx.clone()
    }

    pub fn handle_token(&mut self, token: &str) {
        let state = self.store.state();
        if let Some(ev) = route_token(&state, token, self.options.policy) {
            self.apply(ev);
        }
    }

    pub fn handle_command(&mut self, command: Command) {
        let state = self.store.state();
        let ev = route(&state, command, self.options.policy);
        self.apply(ev);
    }

    pub fn handle_input(&mut self, input: DisplayInput) {
        match input {
            DisplayInput::Remote(token) => self.handle_token(&token),
            DisplayInput::MediaEnded { playback } => {
                if self.playback != Some(playback) {
                    debug!(%playback, "ignoring completion of a superseded clip");
                    return;
                }
                self.clip_ended();
            }
        }
    }

    /// Apply everything already queued, then pick up a finished clip, without
    /// waiting. Needs no async runtime.
    pub fn tick(&mut self) {
        while let Ok(input) = self.rx.try_recv() {
            self.handle_input(input);
        }

        let Some(finished) = self.finished.as_mut() else {
            return;
        };
        match finished.try_recv() {
            Ok(()) => self.clip_ended(),
            Err(oneshot::error::TryRecvError::Empty) => {}
            Err(oneshot::error::TryRecvError::Closed) => self.finished = None,
        }
    }

    /// Forward subscription tokens into the input queue and process it until
    /// `shutdown` fires or the subscription ends. Returns the final state.
    pub async fn run(
        mut self,
        subscription: Subscription,
        shutdown: CancellationToken,
    ) -> DisplayState {
        let stop = shutdown.child_token();
        let forwarder = tokio::spawn(forward_tokens(subscription, self.tx.clone(), stop.clone()));

        loop {
            let wake = tokio::select! {
                _ = stop.cancelled() => Wake::Stopped,
                input = self.rx.recv() => Wake::Input(input),
                ended = clip_finished(&mut self.finished) => Wake::ClipFinished(ended),
            };

            match wake {
                Wake::Stopped | Wake::Input(None) => break,
                Wake::Input(Some(input)) => self.handle_input(input),
                Wake::ClipFinished(ended) => {
                    self.finished = None;
                    if ended {
                        self.clip_ended();
                    }
                }
            }
        }

        info!("display shutting down");
        stop.cancel();
        let _ = forwarder.await;
        self.media.stop();
        self.playback = None;
        self.finished = None;
        self.store.state()
    }

    fn clip_ended(&mut self) {
        self.playback = None;
        self.finished = None;
        self.apply(DisplayEvent::MediaEnded);
    }

    fn apply(&mut self, ev: DisplayEvent) {
        let (before, after) = self.store.apply(ev);
        if before == after {
            debug!(?ev, phase = ?after.phase(), "event left display unchanged");
        } else {
            info!(?ev, phase = ?after.phase(), "display state changed");
        }

        match media_cue(&before, ev, &after) {
            Some(MediaCue::Play(kind)) => {
                self.render();
                self.start_clip(kind);
            }
            Some(MediaCue::Stop) => {
                self.media.stop();
                self.playback = None;
                self.finished = None;
                self.render();
            }
            None => {
                if !after.is_transitioning() {
                    self.playback = None;
                    self.finished = None;
                }
                self.render();
            }
        }
    }

    fn start_clip(&mut self, kind: TransitionKind) {
        let clip = self.options.clips.for_transition(kind).to_owned();
        match self.media.play(&clip) {
            Ok(finished) => {
                let playback = PlaybackId::new_v4();
                debug!(%playback, %clip, "clip started");
                self.playback = Some(playback);
                self.finished = Some(finished);
            }
            Err(e) => {
                warn!(%clip, error = %e, "failed to play clip; finishing transition");
                self.clip_ended();
            }
        }
    }

    fn render(&mut self) {
        let next = frame(&self.store.state(), &self.catalog, &self.options.clips);
        if self.last_frame.as_ref() == Some(&next) {
            return;
        }
        self.sink.show(&next);
        self.last_frame = Some(next);
    }
}

async fn clip_finished(finished: &mut Option<oneshot::Receiver<()>>) -> bool {
    match finished {
        Some(finished) => finished.await.is_ok(),
        None => std::future::pending().await,
    }
}

async fn forward_tokens(
    mut subscription: Subscription,
    tx: mpsc::Sender<DisplayInput>,
    stop: CancellationToken,
) {
    loop {
        let token = tokio::select! {
            _ = stop.cancelled() => break,
            token = subscription.recv() => token,
        };
        match token {
            Some(token) => {
                if tx.send(DisplayInput::Remote(token)).await.is_err() {
                    break;
                }
            }
            None => {
                warn!("broadcast subscription closed");
                stop.cancel();
                break;
            }
        }
    }
    subscription.unsubscribe();
}
