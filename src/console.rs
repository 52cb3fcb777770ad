// src/console.rs
//! Terminal stand-ins for the browser widgets, used by the binary.

use std::io::Write;
use std::sync::Mutex;
use tokio::task::JoinHandle;

use crate::config::OverlayTimings;
use crate::view::{Autosize, BlockingOverlay, FormReader, ResultView};

/// Form values collected from the command line and files.
#[derive(Debug, Clone, Default)]
pub struct ConsoleForm {
    pub template: String,
    pub data_model: String,
    pub output_format: String,
    pub locale: String,
    pub time_zone: String,
    pub tag_syntax: Option<String>,
    pub interpolation_syntax: Option<String>,
}

impl FormReader for ConsoleForm {
    fn template(&self) -> String {
        self.template.clone()
    }

    fn data_model(&self) -> String {
        self.data_model.clone()
    }

    fn output_format(&self) -> String {
        self.output_format.clone()
    }

    fn locale(&self) -> String {
        self.locale.clone()
    }

    fn time_zone(&self) -> String {
        self.time_zone.clone()
    }

    fn tag_syntax(&self) -> Option<String> {
        self.tag_syntax.clone()
    }

    fn interpolation_syntax(&self) -> Option<String> {
        self.interpolation_syntax.clone()
    }
}

#[derive(Debug, Default)]
struct Panel {
    is_error: bool,
    content: String,
    visible: bool,
}

/// Prints the result panel: output on stdout, errors on stderr.
#[derive(Debug, Default)]
pub struct ConsoleView {
    panel: Mutex<Panel>,
}

impl ConsoleView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the last rendered result carried error styling.
    pub fn is_error(&self) -> bool {
        self.panel.lock().map(|p| p.is_error).unwrap_or(true)
    }

    pub fn content(&self) -> String {
        self.panel
            .lock()
            .map(|p| p.content.clone())
            .unwrap_or_default()
    }

    pub fn is_visible(&self) -> bool {
        self.panel.lock().map(|p| p.visible).unwrap_or(false)
    }
}

impl ResultView for ConsoleView {
    fn set_error_state(&self, is_error: bool) {
        if let Ok(mut panel) = self.panel.lock() {
            panel.is_error = is_error;
        }
    }

    fn set_content(&self, text: &str) {
        if let Ok(mut panel) = self.panel.lock() {
            panel.content = text.to_string();
        }
    }

    fn show_container(&self) {
        let Ok(mut panel) = self.panel.lock() else {
            return;
        };
        panel.visible = true;
        if panel.is_error {
            eprintln!("❌ {}", panel.content);
        } else {
            let mut out = std::io::stdout().lock();
            let _ = writeln!(out, "{}", panel.content);
        }
    }

    fn hide_error(&self) {
        if let Ok(mut panel) = self.panel.lock() {
            if panel.is_error {
                panel.visible = false;
            }
        }
    }
}

impl Autosize for ConsoleView {
    fn update(&self) {
        log::debug!("Result panel now {} lines", self.content().lines().count());
    }
}

/// Prints a "busy" notice once a request has been pending for the fade-in time.
#[derive(Debug, Default)]
pub struct ConsoleOverlay {
    timings: Mutex<OverlayTimings>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl ConsoleOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_blocked(&self) -> bool {
        self.pending
            .lock()
            .map(|p| p.is_some())
            .unwrap_or(false)
    }
}

impl BlockingOverlay for ConsoleOverlay {
    fn configure(&self, timings: OverlayTimings) {
        if let Ok(mut current) = self.timings.lock() {
            *current = timings;
        }
    }

    fn block(&self) {
        let fade_in = self.timings.lock().map(|t| t.fade_in).unwrap_or_default();
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            log::info!("⏳ Waiting for the template service...");
            return;
        };
        let task = handle.spawn(async move {
            tokio::time::sleep(fade_in).await;
            log::info!("⏳ Waiting for the template service...");
        });
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(previous) = pending.replace(task) {
                previous.abort();
            }
        }
    }

    fn unblock(&self) {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(task) = pending.take() {
                task.abort();
            }
        }
    }
}
