// src/bindings.rs
//! Maps raw UI events onto controller operations.

use crate::controller::{FormController, SubmitOutcome};
use crate::transport::ExecuteTransport;

/// Line feed, sent by some platforms for Ctrl+Return.
pub const KEY_LINE_FEED: u32 = 10;
pub const KEY_ENTER: u32 = 13;

/// Inputs of the execute form that can hold keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormInput {
    Template,
    DataModel,
    OutputFormat,
    Locale,
    TimeZone,
    TagSyntax,
    InterpolationSyntax,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key_code: u32,
    pub ctrl: bool,
    /// Form input holding focus, `None` when focus is elsewhere on the page.
    pub focus: Option<FormInput>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    PageLoad,
    ExecuteClicked,
    KeyDown(KeyPress),
}

impl KeyPress {
    /// Ctrl+Enter (or Ctrl+LF) inside any input of the form.
    pub fn is_submit_shortcut(&self) -> bool {
        self.ctrl
            && matches!(self.key_code, KEY_LINE_FEED | KEY_ENTER)
            && self.focus.is_some()
    }
}

impl<T: ExecuteTransport> FormController<T> {
    /// Dispatches one UI event. Returns the submit outcome when the event
    /// triggered a submission, `None` otherwise.
    pub async fn handle(&self, event: UiEvent) -> Option<SubmitOutcome> {
        match event {
            UiEvent::PageLoad => {
                self.init();
                None
            }
            UiEvent::ExecuteClicked => Some(self.submit_if_ready().await),
            UiEvent::KeyDown(key) if key.is_submit_shortcut() => {
                Some(self.submit_if_ready().await)
            }
            UiEvent::KeyDown(_) => None,
        }
    }
}
