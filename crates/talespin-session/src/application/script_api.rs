//! The script API handed to running scripts.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use talespin_content::domain::script::ScriptApi;
use talespin_core::interrupt::{Interrupt, ScriptResult};
use talespin_core::presentation::{Choice, Presentation};
use talespin_core::script::ScriptRef;
use talespin_core::sync::lock;
use talespin_core::world::StateHandle;
use talespin_narrative::domain::gate::SuspensionGate;
use talespin_narrative::domain::history::{HistoryEntry, HistoryKind};
use tracing::{debug, info};

use super::scheduler::{Cursor, ScriptContext};
use crate::domain::snapshot::EngineStatus;

/// Conversion between a gate's value and the reply recorded for replay.
trait Reply: Sized {
    fn from_reply(reply: &Value) -> Self;
    fn to_reply(&self) -> Value;
}

impl Reply for () {
    fn from_reply(_reply: &Value) -> Self {}

    fn to_reply(&self) -> Value {
        Value::Null
    }
}

impl Reply for String {
    fn from_reply(reply: &Value) -> Self {
        reply.as_str().unwrap_or_default().to_owned()
    }

    fn to_reply(&self) -> Value {
        Value::String(self.clone())
    }
}

impl Reply for Value {
    fn from_reply(reply: &Value) -> Self {
        reply.clone()
    }

    fn to_reply(&self) -> Value {
        self.clone()
    }
}

enum Step {
    Replayed(Value),
    Live { script: ScriptRef, step: u32 },
}

/// Script API bound to one run of one script.
///
/// Once the scheduler moves on (new launch or reset) or the script has been
/// interrupted, every suspension call fails with [`Interrupt::Navigation`].
pub(crate) struct LiveScriptApi {
    run_id: u64,
    cursor: Arc<Mutex<Cursor>>,
    context: ScriptContext,
}

impl LiveScriptApi {
    pub(crate) fn new(run_id: u64, cursor: Arc<Mutex<Cursor>>, context: ScriptContext) -> Self {
        Self {
            run_id,
            cursor,
            context,
        }
    }

    fn is_current(&self, cursor: &Cursor) -> bool {
        cursor.run_id == self.run_id && cursor.abandoned.is_none()
    }

    /// Starts a suspension call: replays it, or reports where it goes live.
    fn begin(&self) -> ScriptResult<Step> {
        let mut cursor = lock(&self.cursor);
        if !self.is_current(&cursor) {
            return Err(Interrupt::Navigation);
        }
        let Some(script) = cursor.script.clone() else {
            return Err(Interrupt::Navigation);
        };

        if cursor.replaying() {
            let reply = cursor.recorded_reply();
            debug!(%script, step = cursor.step, "replaying step");
            cursor.complete(reply.clone());
            return Ok(Step::Replayed(reply));
        }

        Ok(Step::Live {
            script,
            step: cursor.step,
        })
    }

    /// Completes a live suspension call.
    fn complete(&self, reply: Value) -> ScriptResult<()> {
        let mut cursor = lock(&self.cursor);
        if !self.is_current(&cursor) {
            return Err(Interrupt::Navigation);
        }
        cursor.complete(reply);
        Ok(())
    }

    fn abandon(&self, interrupt: &Interrupt) {
        let mut cursor = lock(&self.cursor);
        if cursor.run_id == self.run_id && cursor.abandoned.is_none() {
            cursor.abandoned = Some(interrupt.clone());
        }
    }

    /// Commits a history entry for a live step, unless this run was resumed
    /// from the present entry or redid its way onto it.
    ///
    /// The present entry only counts as this run's own if it shares the
    /// run's checkpoint and reply prefix, so a later run of the same script
    /// always gets an entry of its own.
    fn record(&self, kind: HistoryKind, script: &ScriptRef, step: u32, payload: Value) {
        let (replies, checkpoint) = {
            let cursor = lock(&self.cursor);
            (cursor.replies.clone(), cursor.checkpoint.clone())
        };

        let mut history = lock(self.context.navigation.history());
        let resumed = history.present().is_some_and(|entry| {
            entry.is_at(script, step) && entry.checkpoint == checkpoint && entry.replies == replies
        });
        if resumed {
            return;
        }
        history.push(HistoryEntry {
            kind,
            target: script.clone(),
            step,
            payload,
            replies,
            checkpoint,
        });
    }

    fn mark_running(&self) {
        let mut snapshot = lock(&self.context.snapshot);
        if snapshot.state == EngineStatus::Loading {
            snapshot.state = EngineStatus::Running;
            info!("saved position reached, engine running");
        }
    }

    async fn suspend<T>(
        &self,
        kind: HistoryKind,
        payload: Value,
        gate: &SuspensionGate<T>,
        presentation: impl FnOnce(ScriptRef, u32) -> Presentation + Send,
    ) -> ScriptResult<T>
    where
        T: Reply + Default + Send + 'static,
    {
        let (script, step) = match self.begin()? {
            Step::Replayed(reply) => return Ok(T::from_reply(&reply)),
            Step::Live { script, step } => (script, step),
        };

        self.record(kind, &script, step, payload);
        self.mark_running();
        let waiter = gate.wait();
        self.context.presenter.present(presentation(script, step));

        match waiter.await {
            Ok(value) => {
                self.complete(value.to_reply())?;
                Ok(value)
            }
            Err(interrupt) => {
                self.abandon(&interrupt);
                Err(interrupt)
            }
        }
    }

    fn is_live(&self) -> bool {
        self.is_current(&lock(&self.cursor))
    }
}

#[async_trait]
impl ScriptApi for LiveScriptApi {
    async fn show_text(&self, speaker: Option<&str>, text: &str) -> ScriptResult<()> {
        let payload = json!({ "speaker": speaker, "text": text });
        let gate = self.context.navigation.continue_gate();
        self.suspend(HistoryKind::Text, payload, gate, |script, step| {
            Presentation::Text {
                script,
                step,
                speaker: speaker.map(str::to_owned),
                text: text.to_owned(),
            }
        })
        .await
    }

    async fn show_choices(&self, choices: Vec<Choice>) -> ScriptResult<String> {
        let payload = serde_json::to_value(&choices).unwrap_or_default();
        let gate = self.context.navigation.choice_gate();
        self.suspend(HistoryKind::Choice, payload, gate, |script, step| {
            Presentation::Choices {
                script,
                step,
                choices,
            }
        })
        .await
    }

    async fn run_custom_logic(&self, name: &str, payload: Value) -> ScriptResult<Value> {
        let entry = json!({ "name": name, "payload": payload });
        let gate = self.context.navigation.action_gate();
        self.suspend(HistoryKind::Action, entry, gate, |script, step| {
            Presentation::CustomLogic {
                script,
                step,
                name: name.to_owned(),
                payload,
            }
        })
        .await
    }

    async fn jump(&self, target: ScriptRef) -> ScriptResult<()> {
        if let Step::Live { .. } = self.begin()? {
            self.complete(Value::Null)?;
        }
        let interrupt = Interrupt::Jump(target);
        self.abandon(&interrupt);
        Err(interrupt)
    }

    fn set_background(&self, image: &str) {
        if !self.is_live() {
            return;
        }
        lock(&self.context.snapshot).background = Some(image.to_owned());
        self.context.presenter.present(Presentation::Background {
            image: image.to_owned(),
        });
    }

    fn set_foreground(&self, image: Option<&str>) {
        if !self.is_live() {
            return;
        }
        let image = image.map(str::to_owned);
        lock(&self.context.snapshot).foreground.clone_from(&image);
        self.context
            .presenter
            .present(Presentation::Foreground { image });
    }

    fn state(&self) -> StateHandle {
        self.context.state.clone()
    }
}
