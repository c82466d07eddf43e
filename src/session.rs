//! The owned overlay session: one receive loop serializing every transition.

use anyhow::Result;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::caret::mapper::CoordinateMapper;
use crate::caret::source::{TrackerProcess, OBSERVATION_BUFFER};
use crate::caret::types::CaretObservation;
use crate::display::DisplayLayout;
use crate::kernel::effect::SideEffect;
use crate::kernel::event::{CaretUpdate, Event, UserAction};
use crate::kernel::reactor::Reactor;
use crate::kernel::state::SessionState;
use crate::services::clipboard;
use crate::services::insert::Inserter;
use crate::services::llm::PromptAnalyzer;

const EVENT_BUFFER: usize = 100;

/// Presentation-side handle: push actions in, watch state out.
#[derive(Clone)]
pub struct SessionHandle {
    events: mpsc::Sender<Event>,
    observations: mpsc::Sender<CaretObservation>,
    state: watch::Receiver<SessionState>,
    shutdown: CancellationToken,
}

impl SessionHandle {
    pub async fn send(&self, action: UserAction) -> Result<()> {
        self.events
            .send(Event::Action(action))
            .await
            .map_err(|_| anyhow::anyhow!("session has ended"))
    }

    /// For non-async callers such as a stdin thread.
    pub fn blocking_send(&self, action: UserAction) -> Result<()> {
        self.events
            .blocking_send(Event::Action(action))
            .map_err(|_| anyhow::anyhow!("session has ended"))
    }

    /// Feed a raw observation, as an external watcher adapter would.
    pub async fn observe(&self, observation: CaretObservation) -> Result<()> {
        self.observations
            .send(observation)
            .await
            .map_err(|_| anyhow::anyhow!("session has ended"))
    }

    pub fn state(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    /// Stop the session without a Quit action.
    pub fn cancel(&self) {
        self.shutdown.cancel();
    }
}

pub struct Session<A: PromptAnalyzer> {
    id: Uuid,
    reactor: Reactor,
    mapper: CoordinateMapper,
    displays: DisplayLayout,
    analyzer: A,
    inserter: Inserter,

    events_tx: mpsc::Sender<Event>,
    events_rx: mpsc::Receiver<Event>,
    observations_tx: mpsc::Sender<CaretObservation>,
    observations_rx: mpsc::Receiver<CaretObservation>,
    tracker: Option<TrackerProcess>,
    tracker_rx: Option<mpsc::Receiver<CaretObservation>>,
    state_tx: watch::Sender<SessionState>,
    shutdown: CancellationToken,

    analysis_task: Option<JoinHandle<()>>,
    translation_task: Option<JoinHandle<()>>,
    background: Vec<JoinHandle<()>>,
}

impl<A: PromptAnalyzer> Session<A> {
    pub fn new(mapper: CoordinateMapper, displays: DisplayLayout, analyzer: A, inserter: Inserter) -> Self {
        let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
        let (observations_tx, observations_rx) = mpsc::channel(OBSERVATION_BUFFER);
        let reactor = Reactor::new();
        let (state_tx, _) = watch::channel(reactor.state.clone());
        let id = Uuid::new_v4();
        info!("Session {} created", id);

        Self {
            id,
            reactor,
            mapper,
            displays,
            analyzer,
            inserter,
            events_tx,
            events_rx,
            observations_tx,
            observations_rx,
            tracker: None,
            tracker_rx: None,
            state_tx,
            shutdown: CancellationToken::new(),
            analysis_task: None,
            translation_task: None,
            background: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            events: self.events_tx.clone(),
            observations: self.observations_tx.clone(),
            state: self.state_tx.subscribe(),
            shutdown: self.shutdown.clone(),
        }
    }

    /// Take ownership of a running watcher; it is killed on dispose.
    pub fn attach_tracker(&mut self, tracker: TrackerProcess, observations: mpsc::Receiver<CaretObservation>) {
        info!("Tracker attached (pid {:?})", tracker.id());
        self.tracker = Some(tracker);
        self.tracker_rx = Some(observations);
    }

    /// Receive loop. Returns after Quit or cancellation, once disposed.
    pub async fn run(mut self) -> Result<()> {
        info!("Session {} running", self.id);

        loop {
            let event = tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("Session cancelled");
                    break;
                }
                Some(event) = self.events_rx.recv() => event,
                Some(observation) = self.observations_rx.recv() => self.map_observation(observation),
                observation = recv_optional(&mut self.tracker_rx) => match observation {
                    Some(observation) => self.map_observation(observation),
                    None => {
                        warn!("Tracker stream closed; keeping last known position");
                        self.tracker_rx = None;
                        continue;
                    }
                },
            };

            let effects = self.reactor.step(event);
            self.state_tx.send_replace(self.reactor.state.clone());

            if self.execute(effects) {
                info!("Quit requested");
                break;
            }
        }

        self.dispose().await;
        Ok(())
    }

    fn map_observation(&self, observation: CaretObservation) -> Event {
        let position = self.mapper.map(&observation, &self.displays);
        debug!("Caret at ({:.1}, {:.1}) h={:.1}", position.x, position.y, position.height);
        Event::Caret(CaretUpdate {
            position,
            process_id: observation.process_id(),
        })
    }

    /// Runs side effects. Returns true when the session should stop.
    fn execute(&mut self, effects: Vec<SideEffect>) -> bool {
        let mut quit = false;

        for effect in effects {
            match effect {
                SideEffect::RequestAnalysis { request, prompt } => {
                    // Cancel-and-replace: the superseded answer is stale anyway
                    if let Some(task) = self.analysis_task.take() {
                        task.abort();
                    }
                    let analyzer = self.analyzer.clone();
                    let tx = self.events_tx.clone();
                    self.analysis_task = Some(tokio::spawn(async move {
                        let outcome = analyzer.analyze(prompt).await.map_err(|e| e.to_string());
                        let _ = tx.send(Event::AnalysisFinished { request, outcome }).await;
                    }));
                }

                SideEffect::RequestTranslation { request, text } => {
                    if let Some(task) = self.translation_task.take() {
                        task.abort();
                    }
                    let analyzer = self.analyzer.clone();
                    let tx = self.events_tx.clone();
                    self.translation_task = Some(tokio::spawn(async move {
                        let outcome = analyzer.translate(text).await.map_err(|e| e.to_string());
                        let _ = tx.send(Event::TranslationFinished { request, outcome }).await;
                    }));
                }

                SideEffect::CopyToClipboard(text) => {
                    self.background.push(tokio::spawn(async move {
                        match tokio::task::spawn_blocking(move || clipboard::copy_text(&text)).await {
                            Ok(Ok(())) => info!("Copied to clipboard"),
                            Ok(Err(e)) => error!("Failed to copy to clipboard: {:#}", e),
                            Err(e) => error!("Clipboard task failed: {}", e),
                        }
                    }));
                }

                SideEffect::InsertText { process_id, text } => {
                    let inserter = self.inserter.clone();
                    self.background.push(tokio::spawn(async move {
                        if let Err(e) = inserter.insert(process_id, &text).await {
                            error!("Insert failed: {:#}", e);
                        }
                    }));
                }

                SideEffect::Quit => quit = true,
            }
        }

        self.background.retain(|task| !task.is_finished());
        quit
    }

    /// Abort outstanding work and stop the watcher.
    async fn dispose(mut self) {
        self.shutdown.cancel();
        if let Some(task) = self.analysis_task.take() {
            task.abort();
        }
        if let Some(task) = self.translation_task.take() {
            task.abort();
        }
        for task in self.background.drain(..) {
            task.abort();
        }
        self.tracker_rx = None;
        if let Some(tracker) = self.tracker.take() {
            tracker.shutdown().await;
        }
        info!("Session {} disposed", self.id);
    }
}

async fn recv_optional<T>(rx: &mut Option<mpsc::Receiver<T>>) -> Option<T> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
