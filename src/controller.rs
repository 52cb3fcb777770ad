// src/controller.rs
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::OverlayTimings;
use crate::errors::TesterError;
use crate::models::{
    ErrorBody, ExecutionRequest, ExecutionResult, EMPTY_TEMPLATE_MESSAGE,
    SERVICE_UNAVAILABLE_MESSAGE,
};
use crate::transport::ExecuteTransport;
use crate::view::{Autosize, BlockingOverlay, FormReader, ResultView};

/// The UI pieces the controller talks to.
#[derive(Clone)]
pub struct Widgets {
    pub form: Arc<dyn FormReader>,
    pub view: Arc<dyn ResultView>,
    pub overlay: Arc<dyn BlockingOverlay>,
    pub autosize: Arc<dyn Autosize>,
}

/// What a call to [`FormController::submit_if_ready`] ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Another request was already in flight; nothing happened.
    Ignored,
    /// The form failed validation; the message was rendered, nothing was sent.
    Rejected(String),
    /// The request went out and its result was rendered.
    Completed(ExecutionResult),
}

/// Drives the validate → submit → render cycle of the execute form.
///
/// At most one request is in flight per controller. Triggers that arrive
/// while one is pending are dropped, not queued.
pub struct FormController<T> {
    transport: T,
    widgets: Widgets,
    overlay_timings: OverlayTimings,
    in_flight: AtomicBool,
}

impl<T: ExecuteTransport> FormController<T> {
    pub fn new(transport: T, widgets: Widgets, overlay_timings: OverlayTimings) -> Self {
        Self {
            transport,
            widgets,
            overlay_timings,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// One-time page setup.
    pub fn init(&self) {
        self.widgets.overlay.configure(self.overlay_timings);
    }

    pub async fn submit_if_ready(&self) -> SubmitOutcome {
        if self.is_in_flight() {
            log::debug!("Execute request already pending, trigger ignored");
            return SubmitOutcome::Ignored;
        }

        let template = self.widgets.form.template();
        if template.trim().is_empty() {
            self.show_result(EMPTY_TEMPLATE_MESSAGE, true);
            return SubmitOutcome::Rejected(EMPTY_TEMPLATE_MESSAGE.to_string());
        }

        let request = self.read_request(template);

        let Some(_guard) = InFlightGuard::acquire(&self.in_flight, self.widgets.overlay.as_ref())
        else {
            return SubmitOutcome::Ignored;
        };
        self.widgets.view.hide_error();

        let result = self.execute(&request).await;
        self.show_result(result.text(), result.is_error());

        SubmitOutcome::Completed(result)
    }

    /// Sends `request` and folds every answer, good or bad, into a result.
    pub async fn execute(&self, request: &ExecutionRequest) -> ExecutionResult {
        match self.transport.execute(request).await {
            Ok(response) => {
                if response.truncated_result {
                    log::warn!("⚠️  Service truncated the template output");
                }
                response.into_result()
            }
            Err(e) => {
                log::error!("❌ Execute request failed: {}", e);
                ExecutionResult::Failure {
                    message: failure_message(&e),
                }
            }
        }
    }

    pub fn show_result(&self, text: &str, is_error: bool) {
        let view = &self.widgets.view;
        view.set_error_state(is_error);
        view.set_content(text);
        view.show_container();
        self.widgets.autosize.update();
    }

    fn read_request(&self, template: String) -> ExecutionRequest {
        let form = &self.widgets.form;
        ExecutionRequest {
            template,
            data_model: form.data_model(),
            output_format: form.output_format(),
            locale: form.locale(),
            time_zone: form.time_zone(),
            tag_syntax: form.tag_syntax(),
            interpolation_syntax: form.interpolation_syntax(),
        }
    }
}

fn failure_message(err: &TesterError) -> String {
    match err {
        TesterError::ApiError { body, .. } => ErrorBody::parse(body)
            .map(|b| b.message())
            .unwrap_or_else(|| SERVICE_UNAVAILABLE_MESSAGE.to_string()),
        _ => SERVICE_UNAVAILABLE_MESSAGE.to_string(),
    }
}

/// Holds the in-flight flag and the overlay for the lifetime of one request.
/// Dropping it releases both, whether the request finished, the future was
/// dropped or rendering panicked.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
    overlay: &'a dyn BlockingOverlay,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool, overlay: &'a dyn BlockingOverlay) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        overlay.block();
        Some(Self { flag, overlay })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
        self.overlay.unblock();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::errors::Result;
    use crate::models::ExecuteResponse;
    use futures::FutureExt;
    use std::panic::AssertUnwindSafe;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Event {
        ErrorState(bool),
        Content(String),
        ShowContainer,
        HideError,
        Autosize,
        Configure(OverlayTimings),
        Block,
        Unblock,
    }

    /// Records every collaborator call in order.
    #[derive(Default)]
    pub struct Recorder {
        pub events: Mutex<Vec<Event>>,
        pub panic_on_content: bool,
    }

    impl Recorder {
        pub fn events(&self) -> Vec<Event> {
            self.events.lock().unwrap().clone()
        }

        pub fn count(&self, event: &Event) -> usize {
            self.events().iter().filter(|e| *e == event).count()
        }

        fn push(&self, event: Event) {
            self.events.lock().unwrap().push(event);
        }
    }

    impl ResultView for Recorder {
        fn set_error_state(&self, is_error: bool) {
            self.push(Event::ErrorState(is_error));
        }
        fn set_content(&self, text: &str) {
            self.push(Event::Content(text.to_string()));
            if self.panic_on_content {
                panic!("render blew up");
            }
        }
        fn show_container(&self) {
            self.push(Event::ShowContainer);
        }
        fn hide_error(&self) {
            self.push(Event::HideError);
        }
    }

    impl Autosize for Recorder {
        fn update(&self) {
            self.push(Event::Autosize);
        }
    }

    impl BlockingOverlay for Recorder {
        fn configure(&self, timings: OverlayTimings) {
            self.push(Event::Configure(timings));
        }
        fn block(&self) {
            self.push(Event::Block);
        }
        fn unblock(&self) {
            self.push(Event::Unblock);
        }
    }

    #[derive(Default)]
    pub struct StaticForm {
        pub template: String,
        pub data_model: String,
    }

    impl FormReader for StaticForm {
        fn template(&self) -> String {
            self.template.clone()
        }
        fn data_model(&self) -> String {
            self.data_model.clone()
        }
        fn output_format(&self) -> String {
            String::new()
        }
        fn locale(&self) -> String {
            String::new()
        }
        fn time_zone(&self) -> String {
            String::new()
        }
    }

    enum Reply {
        Ok(ExecuteResponse),
        Api { status: u16, body: String },
        Broken,
    }

    pub struct FakeTransport {
        reply: Reply,
        calls: Arc<AtomicUsize>,
        requests: Arc<Mutex<Vec<ExecutionRequest>>>,
        gate: Option<Arc<Notify>>,
    }

    impl FakeTransport {
        fn new(reply: Reply) -> Self {
            Self {
                reply,
                calls: Arc::new(AtomicUsize::new(0)),
                requests: Arc::new(Mutex::new(Vec::new())),
                gate: None,
            }
        }
    }

    impl ExecuteTransport for FakeTransport {
        async fn execute(&self, request: &ExecutionRequest) -> Result<ExecuteResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request.clone());
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            match &self.reply {
                Reply::Ok(resp) => Ok(resp.clone()),
                Reply::Api { status, body } => Err(TesterError::ApiError {
                    status: *status,
                    body: body.clone(),
                }),
                Reply::Broken => Err(TesterError::JsonParse(
                    serde_json::from_str::<ExecuteResponse>("not json").unwrap_err(),
                )),
            }
        }
    }

    fn controller(
        template: &str,
        transport: FakeTransport,
        recorder: Arc<Recorder>,
    ) -> FormController<FakeTransport> {
        let widgets = Widgets {
            form: Arc::new(StaticForm {
                template: template.to_string(),
                data_model: String::new(),
            }),
            view: recorder.clone(),
            overlay: recorder.clone(),
            autosize: recorder,
        };
        FormController::new(transport, widgets, OverlayTimings::default())
    }

    /// A controller whose transport always answers with `result`, plus its
    /// recorder and call counter.
    pub fn recording_controller(
        template: &str,
        result: &str,
    ) -> (FormController<FakeTransport>, Arc<Recorder>, Arc<AtomicUsize>) {
        let recorder = Arc::new(Recorder::default());
        let transport = FakeTransport::new(success(result));
        let calls = transport.calls.clone();
        (controller(template, transport, recorder.clone()), recorder, calls)
    }

    fn success(result: &str) -> Reply {
        Reply::Ok(ExecuteResponse {
            result: Some(result.to_string()),
            ..Default::default()
        })
    }

    fn rendered(recorder: &Recorder) -> Vec<(String, bool)> {
        let mut out = Vec::new();
        let mut error = false;
        for event in recorder.events() {
            match event {
                Event::ErrorState(e) => error = e,
                Event::Content(text) => out.push((text, error)),
                _ => {}
            }
        }
        out
    }

    #[tokio::test]
    async fn test_blank_template_is_rejected_without_network_call() {
        let recorder = Arc::new(Recorder::default());
        let transport = FakeTransport::new(success("unused"));
        let calls = transport.calls.clone();
        let ctl = controller(" \n\t ", transport, recorder.clone());

        let outcome = ctl.submit_if_ready().await;

        assert_eq!(outcome, SubmitOutcome::Rejected(EMPTY_TEMPLATE_MESSAGE.to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            rendered(&recorder),
            vec![(EMPTY_TEMPLATE_MESSAGE.to_string(), true)]
        );
        assert_eq!(recorder.count(&Event::Block), 0);
        assert!(!ctl.is_in_flight());
    }

    #[tokio::test]
    async fn test_success_renders_result_and_releases_overlay() {
        let recorder = Arc::new(Recorder::default());
        let ctl = controller("${x}", FakeTransport::new(success("OK")), recorder.clone());

        let outcome = ctl.submit_if_ready().await;

        assert_eq!(
            outcome,
            SubmitOutcome::Completed(ExecutionResult::Success {
                text: "OK".to_string()
            })
        );
        assert_eq!(
            recorder.events(),
            vec![
                Event::Block,
                Event::HideError,
                Event::ErrorState(false),
                Event::Content("OK".to_string()),
                Event::ShowContainer,
                Event::Autosize,
                Event::Unblock,
            ]
        );
        assert!(!ctl.is_in_flight());
    }

    #[tokio::test]
    async fn test_first_problem_is_rendered_as_error() {
        let recorder = Arc::new(Recorder::default());
        let resp: ExecuteResponse = serde_json::from_value(serde_json::json!({
            "problems": [{"field": "template", "message": "bad syntax"}]
        }))
        .unwrap();
        let ctl = controller("<#if>", FakeTransport::new(Reply::Ok(resp)), recorder.clone());

        ctl.submit_if_ready().await;

        assert_eq!(rendered(&recorder), vec![("bad syntax".to_string(), true)]);
        assert_eq!(recorder.count(&Event::Unblock), 1);
    }

    #[tokio::test]
    async fn test_structured_failure_body_is_formatted() {
        let recorder = Arc::new(Recorder::default());
        let transport = FakeTransport::new(Reply::Api {
            status: 500,
            body: r#"{"errorCode":"E1","errorDescription":"boom"}"#.to_string(),
        });
        let ctl = controller("x", transport, recorder.clone());

        ctl.submit_if_ready().await;

        assert_eq!(rendered(&recorder), vec![("E1: boom".to_string(), true)]);
        assert_eq!(recorder.count(&Event::Unblock), 1);
        assert!(!ctl.is_in_flight());
    }

    #[tokio::test]
    async fn test_unstructured_failures_use_generic_message() {
        for reply in [
            Reply::Api {
                status: 400,
                body: "Empty Template & data".to_string(),
            },
            Reply::Broken,
        ] {
            let recorder = Arc::new(Recorder::default());
            let ctl = controller("x", FakeTransport::new(reply), recorder.clone());

            ctl.submit_if_ready().await;

            assert_eq!(
                rendered(&recorder),
                vec![(SERVICE_UNAVAILABLE_MESSAGE.to_string(), true)]
            );
            assert_eq!(recorder.count(&Event::Block), 1);
            assert_eq!(recorder.count(&Event::Unblock), 1);
            assert!(!ctl.is_in_flight());
        }
    }

    #[tokio::test]
    async fn test_trigger_while_in_flight_is_dropped() {
        let recorder = Arc::new(Recorder::default());
        let gate = Arc::new(Notify::new());
        let mut transport = FakeTransport::new(success("done"));
        transport.gate = Some(gate.clone());
        let calls = transport.calls.clone();
        let ctl = controller("x", transport, recorder.clone());

        let first = ctl.submit_if_ready();
        let second = async {
            tokio::task::yield_now().await;
            assert!(ctl.is_in_flight());
            let before = recorder.events();
            let outcome = ctl.submit_if_ready().await;
            assert_eq!(recorder.events(), before);
            gate.notify_one();
            outcome
        };
        let (first, second) = tokio::join!(first, second);

        assert!(matches!(first, SubmitOutcome::Completed(_)));
        assert_eq!(second, SubmitOutcome::Ignored);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(recorder.count(&Event::Block), 1);
        assert_eq!(recorder.count(&Event::Unblock), 1);

        // the controller is usable again once the first request settled
        gate.notify_one();
        assert!(matches!(ctl.submit_if_ready().await, SubmitOutcome::Completed(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_panicking_render_still_releases_in_flight_state() {
        let recorder = Arc::new(Recorder {
            panic_on_content: true,
            ..Default::default()
        });
        let ctl = controller("x", FakeTransport::new(success("OK")), recorder.clone());

        let result = AssertUnwindSafe(ctl.submit_if_ready()).catch_unwind().await;

        assert!(result.is_err());
        assert!(!ctl.is_in_flight());
        assert_eq!(recorder.count(&Event::Unblock), 1);
    }

    #[tokio::test]
    async fn test_request_carries_all_form_fields() {
        let recorder = Arc::new(Recorder::default());
        let transport = FakeTransport::new(success(""));
        let requests = transport.requests.clone();
        let widgets = Widgets {
            form: Arc::new(StaticForm {
                template: "  ${user}  ".to_string(),
                data_model: "user=Big Joe".to_string(),
            }),
            view: recorder.clone(),
            overlay: recorder.clone(),
            autosize: recorder.clone(),
        };
        let ctl = FormController::new(transport, widgets, OverlayTimings::default());

        ctl.submit_if_ready().await;

        let sent = requests.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        // the template goes out untrimmed
        assert_eq!(sent[0].template, "  ${user}  ");
        assert_eq!(sent[0].data_model, "user=Big Joe");
    }

    #[test]
    fn test_init_configures_overlay_timings() {
        let recorder = Arc::new(Recorder::default());
        let ctl = controller("x", FakeTransport::new(success("")), recorder.clone());

        ctl.init();

        assert_eq!(
            recorder.events(),
            vec![Event::Configure(OverlayTimings::default())]
        );
    }
}
