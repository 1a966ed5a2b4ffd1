//! The API surface handed to authored scripts, and the script function type.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use talespin_core::interrupt::ScriptResult;
use talespin_core::presentation::Choice;
use talespin_core::script::ScriptRef;
use talespin_core::world::StateHandle;

/// Boxed future a script body returns.
pub type ScriptFuture = Pin<Box<dyn Future<Output = ScriptResult<()>> + Send + 'static>>;

/// An executable script: the root of an event or one of its branches.
pub type ScriptFn = Arc<dyn Fn(Arc<dyn ScriptApi>) -> ScriptFuture + Send + Sync>;

/// Wraps an async closure as a [`ScriptFn`].
pub fn script<F, Fut>(execute: F) -> ScriptFn
where
    F: Fn(Arc<dyn ScriptApi>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ScriptResult<()>> + Send + 'static,
{
    Arc::new(move |api: Arc<dyn ScriptApi>| -> ScriptFuture { Box::pin(execute(api)) })
}

/// Operations available to an authored script.
///
/// The four async operations each count as one step. They return
/// `Err(Interrupt)` when the script is being abandoned; scripts must pass it
/// on with `?` and never swallow it.
#[async_trait]
pub trait ScriptApi: Send + Sync {
    /// Shows a line of text and waits for the player to continue.
    async fn show_text(&self, speaker: Option<&str>, text: &str) -> ScriptResult<()>;

    /// Offers `choices` and returns the id of the one picked. An empty id
    /// means the wait was skipped.
    async fn show_choices(&self, choices: Vec<Choice>) -> ScriptResult<String>;

    /// Hands a blocking interaction to the host and returns its result.
    async fn run_custom_logic(&self, name: &str, payload: Value) -> ScriptResult<Value>;

    /// Abandons this script in favour of `target`. Never returns `Ok`.
    async fn jump(&self, target: ScriptRef) -> ScriptResult<()>;

    /// Changes the background. Does not count as a step.
    fn set_background(&self, image: &str);

    /// Changes or clears the foreground overlay. Does not count as a step.
    fn set_foreground(&self, image: Option<&str>);

    /// The world the script operates on.
    fn state(&self) -> StateHandle;
}
