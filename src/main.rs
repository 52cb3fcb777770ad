use clap::Parser;
use online_tester::banner;
use online_tester::bindings::UiEvent;
use online_tester::cli::Cli;
use online_tester::config::ClientConfig;
use online_tester::console::{ConsoleOverlay, ConsoleView};
use online_tester::controller::{FormController, SubmitOutcome, Widgets};
use online_tester::transport::HttpTransport;
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    banner::print_banner();

    if let Err(e) = dotenvy::dotenv() {
        log::debug!("No .env file loaded: {}", e);
    }

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let mut config = match ClientConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            return ExitCode::FAILURE;
        }
    };
    cli.apply_to(&mut config);

    let form = match cli.read_form(&config.defaults) {
        Ok(form) => form,
        Err(e) => {
            eprintln!("❌ {}", e);
            return ExitCode::FAILURE;
        }
    };

    let view = Arc::new(ConsoleView::new());
    let widgets = Widgets {
        form: Arc::new(form),
        view: view.clone(),
        overlay: Arc::new(ConsoleOverlay::new()),
        autosize: view.clone(),
    };
    let transport = HttpTransport::new(reqwest::Client::new(), &config);
    log::info!("🚀 Executing against {}", transport.url());

    let controller = FormController::new(transport, widgets, config.overlay);
    controller.handle(UiEvent::PageLoad).await;

    match controller.handle(UiEvent::ExecuteClicked).await {
        Some(SubmitOutcome::Completed(result)) if !result.is_error() => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}
