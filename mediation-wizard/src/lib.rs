// Mediation request wizard
// Library entry point

pub mod api;
pub mod error;
pub mod i18n;
pub mod models;
mod tui;
pub mod utils;
pub mod wizard;

use api::mediation::{DryRunMediationApi, HttpMediationApi, MediationApi};
use i18n::Language;
use log::{error, info, warn};
use models::state::{
    AssistiveTechnology, OrganizationInfo, ProblemDescription, StepData, Urgency, UserInfo,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use utils::config::WizardConfig;
use wizard::controller::{FormContainer, WizardContext};
use wizard::router::{MemoryHistory, Router};
use wizard::steps::ROOT_PATH;
use wizard::store::{FormStore, MemoryStorage, SessionFileStorage, StateStorage, STORAGE_KEY};

/// Initialize logging with dual format (JSON + human-readable)
fn init_logging(
    with_stdout: bool,
    log_dir: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = utils::path_resolver::resolve_log_folder(log_dir)?;

    let timestamp = chrono::Utc::now().format("%Y-%m-%d-%H%M%S");
    let json_log_file = log_dir.join(format!("mediation-wizard-{}.log", timestamp));
    let txt_log_file = log_dir.join(format!("mediation-wizard-{}.txt", timestamp));

    // stdout stays off while the TUI owns the terminal
    let mut dispatch = fern::Dispatch::new().level(log::LevelFilter::Debug);

    if with_stdout {
        dispatch = dispatch.chain(
            fern::Dispatch::new()
                .format(move |out, message, record| {
                    let timestamp_local = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
                    let message_str = format!("{}", message);
                    let (phase, step, cleaned_message) =
                        utils::logging::parse_log_metadata(&message_str);
                    let txt_line = utils::logging::format_human_readable_log(
                        &timestamp_local.to_string(),
                        record.level(),
                        record.target(),
                        &cleaned_message,
                        phase.as_deref(),
                        step.as_deref(),
                    );
                    out.finish(format_args!("{}", txt_line));
                })
                .level(log::LevelFilter::Info)
                .chain(std::io::stdout()),
        );
    }

    dispatch = dispatch
        .chain(
            fern::Dispatch::new()
                .format(move |out, message, record| {
                    let timestamp_utc = chrono::Utc::now().to_rfc3339();
                    let message_str = format!("{}", message);
                    let (phase, step, cleaned_message) =
                        utils::logging::parse_log_metadata(&message_str);
                    let json_line = utils::logging::format_json_log(
                        &timestamp_utc,
                        record.level(),
                        record.target(),
                        &cleaned_message,
                        phase.as_deref(),
                        step.as_deref(),
                        None,
                    );
                    out.finish(format_args!("{}\n", json_line));
                })
                .chain(fern::log_file(json_log_file)?),
        )
        .chain(
            fern::Dispatch::new()
                .format(move |out, message, record| {
                    let timestamp_local = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
                    let message_str = format!("{}", message);
                    let (phase, step, cleaned_message) =
                        utils::logging::parse_log_metadata(&message_str);
                    let txt_line = utils::logging::format_human_readable_log(
                        &timestamp_local.to_string(),
                        record.level(),
                        record.target(),
                        &cleaned_message,
                        phase.as_deref(),
                        step.as_deref(),
                    );
                    out.finish(format_args!("{}\n", txt_line));
                })
                .chain(fern::log_file(txt_log_file)?),
        );

    dispatch.apply()?;

    log::info!(
        "[PHASE: initialization] Logging initialized, log directory: {:?}",
        log_dir
    );
    Ok(())
}

fn load_config_or_exit(config_path: Option<&Path>) -> WizardConfig {
    match WizardConfig::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Mediation wizard: invalid configuration: {}", e);
            std::process::exit(2);
        }
    }
}

/// Fetch the organization app when slugs are configured. A failed fetch falls back to the
/// standalone wizard.
fn resolve_context(config: &WizardConfig, api: &dyn MediationApi) -> WizardContext {
    let context = match config.organization_context() {
        None => WizardContext::standalone(),
        Some((organization_slug, application_slug)) => {
            info!(
                "[PHASE: startup] [STEP: organization_app] Loading organization app {}/{}",
                organization_slug, application_slug
            );
            let fetched = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(error::WizardError::from)
                .and_then(|rt| {
                    rt.block_on(api.fetch_organization_app(organization_slug, application_slug))
                });
            match fetched {
                Ok(app) => {
                    info!(
                        "[PHASE: startup] [STEP: organization_app] Filing requests for app {} ({})",
                        app.id,
                        app.name.display(config.language)
                    );
                    WizardContext::for_organization_app(organization_slug, application_slug, app)
                }
                Err(e) => {
                    warn!(
                        "[PHASE: startup] [STEP: organization_app] Organization app unavailable, running standalone: {}",
                        e
                    );
                    WizardContext::standalone()
                }
            }
        }
    };
    context.with_user_id(config.user_id.clone())
}

fn new_container<S: StateStorage>(
    storage: S,
    context: WizardContext,
) -> FormContainer<S, MemoryHistory> {
    let start = context
        .layout()
        .path_for_step(0)
        .unwrap_or_else(|| ROOT_PATH.to_string());
    FormContainer::new(FormStore::open(storage), MemoryHistory::new(&start), context)
}

fn launch_tui(config: &WizardConfig) -> anyhow::Result<()> {
    let api = Arc::new(HttpMediationApi::new(
        &config.backend_base_url,
        Duration::from_secs(config.request_timeout_secs),
    )?);
    info!(
        "[PHASE: initialization] [STEP: backend] Backend: {}",
        api.base_url()
    );
    let context = resolve_context(config, api.as_ref());

    let session_dir = utils::path_resolver::resolve_session_folder(config.session_dir.as_deref())?;
    info!(
        "[PHASE: initialization] [STEP: session] Session folder: {:?}",
        session_dir
    );
    let container = new_container(SessionFileStorage::new(session_dir), context);

    tui::run(container, api, config.vertical_breakpoint, config.language)
}

/// Interactive terminal wizard. `language` overrides the configured one.
pub fn run_tui(config_path: Option<PathBuf>, language: Option<Language>) {
    let mut config = load_config_or_exit(config_path.as_deref());
    if let Some(language) = language {
        config.language = language;
    }

    // no stdout to avoid corrupting the TUI
    if let Err(e) = init_logging(false, config.log_dir.as_deref()) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    info!(
        "[PHASE: initialization] Mediation wizard starting at {}",
        chrono::Utc::now()
    );

    if let Err(e) = launch_tui(&config) {
        error!("[PHASE: tui] [STEP: fatal] TUI exited with error: {:?}", e);
        eprintln!("Mediation wizard error: {}", e);
        std::process::exit(1);
    }
}

/// Non-interactive TUI smoke mode (for automated checks).
/// Renders a single frame into an in-memory backend and exits.
pub fn run_tui_smoke(target: Option<String>, language: Option<Language>) {
    if let Err(e) = init_logging(false, None) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    info!(
        "[PHASE: initialization] TUI smoke starting at {}",
        chrono::Utc::now()
    );

    let target = target.as_deref().unwrap_or("user-info");
    if let Err(e) = tui::smoke(target, language.unwrap_or_default()) {
        error!(
            "[PHASE: tui] [STEP: smoke] TUI smoke exited with error: {:?}",
            e
        );
        eprintln!("Mediation wizard error: {}", e);
        std::process::exit(1);
    }
}

fn smoke_user_info() -> StepData {
    StepData::UserInfo(UserInfo {
        first_name: "Bill".to_string(),
        email: "bluebill@koena.net".to_string(),
        phone_number: "+33 6 12 34 56 78".to_string(),
        assistive_technology_used: vec![AssistiveTechnology::ScreenReaderVocalSynthesis],
        technology_name: "NVDA".to_string(),
        ..UserInfo::default()
    })
}

fn smoke_problem_description() -> StepData {
    StepData::ProblemDescription(ProblemDescription {
        urgency: Some(Urgency::ModeratelyUrgent),
        issue_description: "The sign-up button cannot be reached with the keyboard".to_string(),
        url: "https://example.org/sign-up".to_string(),
        ..ProblemDescription::default()
    })
}

/// Walk the wizard from the first step to a submitted request.
async fn walk_and_submit(context: WizardContext, api: &dyn MediationApi) -> anyhow::Result<()> {
    let mut container = new_container(MemoryStorage::new(), context);
    container.mount();

    container.next(smoke_user_info())?;
    container.next(smoke_problem_description())?;
    if !container.layout().has_organization_app() {
        container.next(StepData::OrganizationInfo(OrganizationInfo {
            name: "Example Org".to_string(),
            email: "contact@example.org".to_string(),
            ..OrganizationInfo::default()
        }))?;
    }
    if !container.is_recap() {
        anyhow::bail!(
            "summary not reached, wizard is at {}",
            container.router().current_path()
        );
    }

    if !container.submit(api).await {
        anyhow::bail!("submission was rejected");
    }
    if !container.state().is_empty() || container.active_step() != 0 {
        anyhow::bail!("wizard was not reset after a successful submission");
    }
    if container.store().storage().get(STORAGE_KEY).is_some() {
        anyhow::bail!("session state survived the reset");
    }
    Ok(())
}

fn submit_smoke() -> anyhow::Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    rt.block_on(async {
        let api = DryRunMediationApi;

        info!("[PHASE: smoke] [STEP: standalone] Walking the standalone wizard");
        walk_and_submit(WizardContext::standalone(), &api).await?;

        info!("[PHASE: smoke] [STEP: organization_app] Walking the organization app wizard");
        let app = api.fetch_organization_app("koena", "koena-connect").await?;
        let context = WizardContext::for_organization_app("koena", "koena-connect", app)
            .with_user_id(Some("smoke-user".to_string()));
        walk_and_submit(context, &api).await?;

        Ok::<(), anyhow::Error>(())
    })
}

/// Non-interactive end-to-end run of the controller against a dry-run backend.
pub fn run_submit_smoke() {
    if let Err(e) = init_logging(true, None) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match submit_smoke() {
        Ok(()) => info!("[PHASE: smoke] [STEP: done] Submit smoke passed"),
        Err(e) => {
            error!("[PHASE: smoke] [STEP: done] Submit smoke failed: {:?}", e);
            eprintln!("Submit smoke failed: {}", e);
            std::process::exit(1);
        }
    }
}

/// Forget the answers persisted for the session.
pub fn reset_session(config_path: Option<PathBuf>) {
    let config = load_config_or_exit(config_path.as_deref());
    if let Err(e) = init_logging(true, config.log_dir.as_deref()) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let result = utils::path_resolver::resolve_session_folder(config.session_dir.as_deref())
        .and_then(|dir| {
            SessionFileStorage::new(&dir).clear(STORAGE_KEY)?;
            Ok(dir)
        });
    match result {
        Ok(dir) => info!(
            "[PHASE: session] [STEP: reset] Cleared saved answers in {:?}",
            dir
        ),
        Err(e) => {
            error!("[PHASE: session] [STEP: reset] Failed to clear saved answers: {:?}", e);
            eprintln!("Mediation wizard error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Write a commented default configuration file.
pub fn write_default_config(path: Option<PathBuf>) {
    let path = path.unwrap_or_else(utils::path_resolver::resolve_config_file);
    match utils::config::write_default(&path) {
        Ok(()) => println!("Default configuration written to {}", path.display()),
        Err(e) => {
            eprintln!("Failed to write {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }
}
