// src/view.rs
//! Seams between the controller and whatever toolkit draws the form.

use crate::config::OverlayTimings;

/// Reads the current values of the form inputs.
pub trait FormReader: Send + Sync {
    fn template(&self) -> String;
    fn data_model(&self) -> String;
    fn output_format(&self) -> String;
    fn locale(&self) -> String;
    fn time_zone(&self) -> String;

    fn tag_syntax(&self) -> Option<String> {
        None
    }

    fn interpolation_syntax(&self) -> Option<String> {
        None
    }
}

/// The result panel plus the separate error banner above the form.
pub trait ResultView: Send + Sync {
    /// Adds or removes the error styling on the result field.
    fn set_error_state(&self, is_error: bool);

    fn set_content(&self, text: &str);

    /// Makes the result container visible.
    fn show_container(&self);

    /// Hides the error banner left over from an earlier submission.
    fn hide_error(&self);
}

/// Recomputes the result field height after its content changed.
pub trait Autosize: Send + Sync {
    fn update(&self);
}

/// Modal "busy" overlay shown while a request is in flight.
pub trait BlockingOverlay: Send + Sync {
    fn configure(&self, timings: OverlayTimings);
    fn block(&self);
    fn unblock(&self);
}
