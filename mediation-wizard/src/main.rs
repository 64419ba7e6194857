use mediation_wizard::i18n::Language;
use std::path::PathBuf;

/// Value of `--name=value` or `--name value`.
fn flag_value(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    args.iter()
        .enumerate()
        .find_map(|(i, a)| {
            if let Some(v) = a.strip_prefix(&prefix) {
                Some(v.to_string())
            } else if a == name {
                args.get(i + 1).filter(|v| !v.starts_with("--")).cloned()
            } else {
                None
            }
        })
        .filter(|v| !v.trim().is_empty())
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let config_path = flag_value(&args, "--config").map(PathBuf::from);
    let language = match flag_value(&args, "--lang").map(|v| v.parse::<Language>()) {
        Some(Ok(language)) => Some(language),
        Some(Err(e)) => {
            eprintln!("Mediation wizard: {}", e);
            std::process::exit(2);
        }
        None => None,
    };

    // Writes a commented config file (default location or the given path) and exits.
    if args
        .iter()
        .any(|a| a == "--write-default-config" || a.starts_with("--write-default-config="))
    {
        mediation_wizard::write_default_config(
            flag_value(&args, "--write-default-config").map(PathBuf::from),
        );
        return;
    }

    // Clears the answers saved for the session and exits.
    if args.iter().any(|a| a == "--reset") {
        mediation_wizard::reset_session(config_path);
        return;
    }

    // Non-interactive controller run against the dry-run backend. Exits 0/1.
    if args.iter().any(|a| a == "--submit-smoke") {
        mediation_wizard::run_submit_smoke();
        return;
    }

    // Non-interactive TUI smoke test mode (for automated checks).
    // Renders a single frame for a specific step and exits 0.
    // Usage: --tui-smoke or --tui-smoke=user-info|problem|organization|recap|errors|reset-modal|vertical
    if let Some(arg) = args
        .iter()
        .find(|a| a.as_str() == "--tui-smoke" || a.starts_with("--tui-smoke="))
    {
        let target = arg
            .split_once('=')
            .map(|(_, v)| v.to_string())
            .filter(|v| !v.trim().is_empty());
        mediation_wizard::run_tui_smoke(target, language);
        return;
    }

    mediation_wizard::run_tui(config_path, language);
}
