//! The engine: one game in progress and every operation a host can invoke
//! on it.
//!
//! The engine owns the world, the history, the navigation gates, the
//! scheduler and the action resolver, and passes them explicitly to
//! whatever needs them. At most one driver task runs scripts at a time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde_json::Value;
use talespin_content::domain::pack::ContentPack;
use talespin_core::clock::Clock;
use talespin_core::config::EngineConfig;
use talespin_core::error::DomainError;
use talespin_core::interrupt::{Interrupt, ScriptOutcome};
use talespin_core::presentation::{ActionSummary, Presentation, Presenter};
use talespin_core::repository::{SaveRepository, SaveSlot, SaveSummary};
use talespin_core::script::{Bookmark, ScriptRef};
use talespin_core::sync::lock;
use talespin_core::world::{StateHandle, WorldState};
use talespin_narrative::application::navigation::{ForwardOutcome, NavigationController};
use talespin_narrative::domain::history::{HistoryData, HistoryStore};
use talespin_world_state::application::action_resolver::ActionResolver;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::scheduler::{EventScheduler, Launch, ScriptContext};
use crate::domain::snapshot::{EngineSnapshot, EngineStatus, SaveRecord};

/// Read-only summary of the engine for hosts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineView {
    /// The current game session, if a game was started or loaded.
    pub session_id: Option<Uuid>,
    /// Lifecycle state.
    pub status: EngineStatus,
    /// Position in the running script.
    pub bookmark: Bookmark,
    /// Whether a script is running.
    pub script_running: bool,
    /// Whether there is an entry to go back to.
    pub can_go_back: bool,
    /// Whether there is an entry to redo.
    pub can_go_forward: bool,
    /// Whether fast-forward is on.
    pub skipping: bool,
    pub background: Option<String>,
    pub foreground: Option<String>,
}

struct EngineInner {
    config: EngineConfig,
    initial_state: WorldState,
    state: StateHandle,
    history: Arc<Mutex<HistoryStore>>,
    navigation: NavigationController,
    scheduler: EventScheduler,
    actions: Mutex<ActionResolver>,
    snapshot: Arc<Mutex<EngineSnapshot>>,
    repository: Arc<dyn SaveRepository>,
    clock: Arc<dyn Clock>,
    driver: Mutex<Option<JoinHandle<()>>>,
    driver_epoch: AtomicU64,
    session_id: Mutex<Option<Uuid>>,
}

/// Engine context. Cloning shares the same game.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

impl Engine {
    /// Assembles an engine for `pack`, running its location linker.
    ///
    /// # Errors
    ///
    /// Returns the linker's error if the location graph cannot be built.
    pub fn new(
        pack: ContentPack,
        config: EngineConfig,
        repository: Arc<dyn SaveRepository>,
        clock: Arc<dyn Clock>,
        presenter: Arc<dyn Presenter>,
    ) -> Result<Self, DomainError> {
        let ContentPack {
            events,
            global_actions,
            locations,
            linker,
            initial_state,
        } = pack;

        let mut actions = ActionResolver::new(global_actions, locations);
        if let Some(linker) = linker {
            actions.link_locations(linker.as_ref())?;
        }
        let action_presenter = Arc::clone(&presenter);
        actions.on_update(move |summaries| {
            action_presenter.present(Presentation::Actions {
                actions: summaries.to_vec(),
            });
        });

        let history = Arc::new(Mutex::new(HistoryStore::new(config.max_history_size)));
        let navigation = NavigationController::new(Arc::clone(&history), config.skip_delay);
        let state = StateHandle::default();
        let snapshot = Arc::new(Mutex::new(EngineSnapshot::default()));
        let scheduler = EventScheduler::new(
            Arc::new(events),
            ScriptContext {
                navigation: navigation.clone(),
                state: state.clone(),
                snapshot: Arc::clone(&snapshot),
                presenter,
            },
        );

        Ok(Self {
            inner: Arc::new(EngineInner {
                config,
                initial_state,
                state,
                history,
                navigation,
                scheduler,
                actions: Mutex::new(actions),
                snapshot,
                repository,
                clock,
                driver: Mutex::new(None),
                driver_epoch: AtomicU64::new(0),
                session_id: Mutex::new(None),
            }),
        })
    }

    /// Starts a new game from the content pack's initial world.
    ///
    /// Returns the event that was started, if any was eligible.
    pub fn new_game(&self) -> Option<ScriptRef> {
        self.new_game_with(self.inner.initial_state.clone())
    }

    /// Starts a new game from `initial`.
    #[instrument(skip(self, initial))]
    pub fn new_game_with(&self, initial: WorldState) -> Option<ScriptRef> {
        self.stop();
        lock(&self.inner.history).reset_history();
        self.inner.state.replace(initial);
        *lock(&self.inner.snapshot) = EngineSnapshot {
            state: EngineStatus::Running,
            ..EngineSnapshot::default()
        };
        let session_id = self.begin_session();
        info!(%session_id, "new game started");

        self.refresh_actions();
        self.start_first_eligible()
    }

    /// Starts the root script of event `id`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Lookup` if the event is unknown, or
    /// `DomainError::InvalidOperation` if a script is already running.
    #[instrument(skip(self))]
    pub fn start_event(&self, id: &str) -> Result<(), DomainError> {
        let target = ScriptRef::event(id);
        self.inner.scheduler.registry().resolve(&target)?;
        if self.is_script_running() {
            return Err(DomainError::InvalidOperation(format!(
                "cannot start {id} while another script is running"
            )));
        }
        self.spawn_driver(Launch::fresh(target, self.inner.state.snapshot()));
        Ok(())
    }

    /// Advances the narrative.
    #[instrument(skip(self))]
    pub fn go_forward(&self) -> ForwardOutcome {
        let outcome = self.inner.navigation.go_forward();
        info!(?outcome, "forward");
        outcome
    }

    /// Rewinds one history entry. If no script is running, the script of
    /// the entry rewound to is resumed.
    #[instrument(skip(self))]
    pub fn go_back(&self) -> bool {
        let moved = self.inner.navigation.go_back();
        info!(moved, "back");
        if moved && !self.driver_active() {
            let launch = lock(&self.inner.history).present().map(Launch::from_entry);
            if let Some(launch) = launch {
                self.spawn_driver(launch);
            }
        }
        moved
    }

    /// Picks a choice. Returns `false` if no choice is pending.
    #[instrument(skip(self))]
    pub fn choose(&self, choice_id: &str) -> bool {
        self.inner.navigation.choose(choice_id)
    }

    /// Completes a custom interaction. Returns `false` if none is pending.
    #[instrument(skip(self, value))]
    pub fn resolve_action(&self, value: Value) -> bool {
        self.inner.navigation.resolve_action(value)
    }

    pub fn enable_skip_mode(&self) {
        self.inner.navigation.enable_skip_mode();
    }

    pub fn disable_skip_mode(&self) {
        self.inner.navigation.disable_skip_mode();
    }

    /// Runs a player action, then starts the first event that became
    /// eligible, if any.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidOperation` while a script is running or
    /// if the action is no longer unlocked, and `DomainError::Lookup` if the
    /// action does not exist here.
    #[instrument(skip(self))]
    pub fn execute_action(&self, id: &str) -> Result<Option<ScriptRef>, DomainError> {
        if self.is_script_running() {
            return Err(DomainError::InvalidOperation(format!(
                "cannot run action {id} while a script is running"
            )));
        }

        {
            let actions = lock(&self.inner.actions);
            self.inner
                .state
                .update(|state| actions.execute_action(id, state))?;
        }
        info!(action = id, "action executed");

        self.refresh_actions();
        Ok(self.start_first_eligible())
    }

    /// Saves the game to `slot`.
    ///
    /// Mid-script, the saved world is the one the running script started
    /// from; loading replays the script up to the saved step.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the save cannot be encoded or
    /// written.
    #[instrument(skip(self))]
    pub async fn save(&self, slot: u32, name: &str) -> Result<SaveSummary, DomainError> {
        let game_state = self
            .inner
            .scheduler
            .checkpoint()
            .unwrap_or_else(|| self.inner.state.snapshot());
        let snapshot = lock(&self.inner.snapshot).clone();
        // Until replay reaches it, the loaded bookmark is the resume point.
        let bookmark = if snapshot.state == EngineStatus::Loading {
            snapshot.bookmark.clone()
        } else {
            self.inner.scheduler.bookmark()
        };
        let engine_state = EngineSnapshot {
            state: EngineStatus::Running,
            bookmark,
            ..snapshot
        };
        let record = SaveRecord {
            name: name.to_owned(),
            timestamp: self.inner.clock.now(),
            game_state,
            engine_state,
            history_state: lock(&self.inner.history).history_data(),
        };

        let key = self.slot(slot);
        self.inner
            .repository
            .store_save(&key, &record.to_stored()?)
            .await?;
        info!(
            script = ?record.engine_state.bookmark.current_event,
            step = record.engine_state.bookmark.current_step,
            "game saved"
        );

        Ok(SaveSummary {
            slot,
            name: record.name,
            timestamp: record.timestamp,
        })
    }

    /// Loads the game saved at `slot` and resumes it.
    ///
    /// The engine is `Loading` until the saved step is presented again.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if the slot is empty,
    /// `DomainError::Infrastructure` if it cannot be read or decoded, and
    /// `DomainError::Lookup` if the saved script no longer exists. The
    /// current game is left untouched in every error case.
    #[instrument(skip(self))]
    pub async fn load(&self, slot: u32) -> Result<(), DomainError> {
        let key = self.slot(slot);
        let stored = self
            .inner
            .repository
            .load_save(&key)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                project_id: key.project_id.clone(),
                slot,
            })?;
        let record = SaveRecord::from_stored(stored)?;

        let launch = Launch::from_bookmark(
            record.engine_state.bookmark.clone(),
            record.game_state.clone(),
        );
        if let Some(launch) = &launch {
            self.inner.scheduler.registry().resolve(&launch.target)?;
        }

        self.stop();
        lock(&self.inner.history).load_history_data(record.history_state);
        self.inner.state.replace(record.game_state);
        *lock(&self.inner.snapshot) = EngineSnapshot {
            state: if launch.is_some() {
                EngineStatus::Loading
            } else {
                EngineStatus::Running
            },
            ..record.engine_state
        };
        let session_id = self.begin_session();
        info!(%session_id, name = %record.name, "game loaded");

        self.refresh_actions();
        if let Some(launch) = launch {
            self.spawn_driver(launch);
        }
        Ok(())
    }

    /// Lists the occupied save slots of this project.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the saves cannot be read.
    pub async fn list_saves(&self) -> Result<Vec<SaveSummary>, DomainError> {
        self.inner
            .repository
            .list_saves(&self.inner.config.project_id)
            .await
    }

    /// Deletes the save at `slot`. Deleting an empty slot succeeds.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the save cannot be removed.
    #[instrument(skip(self))]
    pub async fn delete_save(&self, slot: u32) -> Result<(), DomainError> {
        self.inner.repository.delete_save(&self.slot(slot)).await
    }

    /// Deep copy of the world.
    #[must_use]
    pub fn world(&self) -> WorldState {
        self.inner.state.snapshot()
    }

    #[must_use]
    pub fn bookmark(&self) -> Bookmark {
        self.inner.scheduler.bookmark()
    }

    #[must_use]
    pub fn status(&self) -> EngineStatus {
        lock(&self.inner.snapshot).state
    }

    #[must_use]
    pub fn history_data(&self) -> HistoryData {
        lock(&self.inner.history).history_data()
    }

    /// Actions from the last recomputation.
    #[must_use]
    pub fn accessible_actions(&self) -> Vec<ActionSummary> {
        lock(&self.inner.actions).summaries()
    }

    #[must_use]
    pub fn is_script_running(&self) -> bool {
        self.inner.scheduler.is_running()
    }

    #[must_use]
    pub fn session_id(&self) -> Option<Uuid> {
        *lock(&self.inner.session_id)
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn view(&self) -> EngineView {
        let snapshot = lock(&self.inner.snapshot).clone();
        let (can_go_back, can_go_forward) = {
            let history = lock(&self.inner.history);
            (history.can_go_back(), history.can_go_forward())
        };
        EngineView {
            session_id: self.session_id(),
            status: snapshot.state,
            bookmark: self.bookmark(),
            script_running: self.is_script_running(),
            can_go_back,
            can_go_forward,
            skipping: self.inner.navigation.is_skipping(),
            background: snapshot.background,
            foreground: snapshot.foreground,
        }
    }

    fn slot(&self, slot: u32) -> SaveSlot {
        SaveSlot::new(self.inner.config.project_id.clone(), slot)
    }

    fn begin_session(&self) -> Uuid {
        let session_id = Uuid::new_v4();
        *lock(&self.inner.session_id) = Some(session_id);
        session_id
    }

    fn refresh_actions(&self) {
        let world = self.inner.state.snapshot();
        lock(&self.inner.actions).update_accessible(&world);
    }

    fn start_first_eligible(&self) -> Option<ScriptRef> {
        let world = self.inner.state.snapshot();
        let target = ScriptRef::event(
            self.inner
                .scheduler
                .registry()
                .first_eligible(&world)?
                .id(),
        );
        self.spawn_driver(Launch::fresh(target.clone(), world));
        Some(target)
    }

    /// Stops the driver and abandons the running script.
    fn stop(&self) {
        self.inner.driver_epoch.fetch_add(1, Ordering::SeqCst);
        if let Some(driver) = lock(&self.inner.driver).take() {
            driver.abort();
        }
        self.inner.navigation.reject_waiters();
        self.inner.scheduler.reset();
    }

    fn driver_active(&self) -> bool {
        lock(&self.inner.driver)
            .as_ref()
            .is_some_and(|driver| !driver.is_finished())
    }

    fn spawn_driver(&self, launch: Launch) {
        let epoch = self.inner.driver_epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let handle = tokio::spawn(self.clone().drive(epoch, launch));
        if let Some(previous) = lock(&self.inner.driver).replace(handle) {
            previous.abort();
        }
    }

    fn is_current_driver(&self, epoch: u64) -> bool {
        self.inner.driver_epoch.load(Ordering::SeqCst) == epoch
    }

    /// Runs scripts until one completes or nothing is left to resume.
    async fn drive(self, epoch: u64, mut launch: Launch) {
        loop {
            let outcome = self.inner.scheduler.run(launch).await;
            if !self.is_current_driver(epoch) {
                return;
            }

            let next = match outcome {
                Ok(ScriptOutcome::Completed) => None,
                Ok(ScriptOutcome::Interrupted(Interrupt::Jump(target))) => {
                    info!(%target, "jumping");
                    Some(Launch::fresh(target, self.inner.state.snapshot()))
                }
                Ok(ScriptOutcome::Interrupted(Interrupt::Navigation)) => {
                    lock(&self.inner.history).present().map(Launch::from_entry)
                }
                Err(error) => {
                    error!(%error, "script launch failed");
                    None
                }
            };

            match next {
                Some(resume) => launch = resume,
                None => break,
            }
        }

        {
            let mut snapshot = lock(&self.inner.snapshot);
            if snapshot.state == EngineStatus::Loading {
                warn!("script ended before the saved position was reached");
                snapshot.state = EngineStatus::Running;
            }
        }
        self.refresh_actions();
    }
}
