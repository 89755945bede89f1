//! Form interpreter for Formwright.
//!
//! Turns an attached [`Form`] plus a [`formwright_store::ValueStore`] into the
//! list of fields a presentation layer should render, and routes edits back
//! into the store.
//!
//! # Architecture
//!
//! - [`Form::attach`] checks a schema tree once; afterwards nothing about its
//!   structure can fail
//! - [`flow::resolve`] decides which keys of a form are shown, in order
//! - [`visibility::is_visible`] evaluates field predicates, failing open
//! - [`render()`] walks both into a tree of [`RenderNode`]s
//! - [`FormSession`] owns one value being edited: the edit path, after-change
//!   hooks, array editing, and the `Clean → Dirty → Saving` lifecycle
//!
//! Persistence and dialogs are collaborators behind async traits
//! ([`Persistence`], [`Dialogs`]).

mod collaborators;
mod config;
mod error;
mod form;
mod hooks;
mod render;
mod session;

pub mod flow;
pub mod visibility;

pub use collaborators::{mock, Dialogs, InMemoryPersistence, Persistence, PromptOutcome};
pub use config::SessionConfig;
pub use error::{DialogError, IoError, SessionError, SessionResult};
pub use form::{Form, Located};
pub use hooks::EditReport;
pub use render::{collect_errors, render, Children, RenderElement, RenderNode};
pub use session::{FormSession, SessionState};
