use std::io;
use std::process::ExitCode;

use splitview::config::{self, BorderStyle, PaneCommand, Settings, SplitViewConfig};
use splitview::shortcuts;
use splitview::split_view::{spawn_input_reader, SplitViewManager};
use splitview::tui::terminal_guard::install_panic_hook;
use splitview::tui::TerminalGuard;

mod logging;

const USAGE: &str = "\
Usage: splitview [OPTIONS]

Options:
  --no-split           Run the dashboard alone, full screen
  --assistant <CMD>    Assistant command line (left pane)
  --dashboard <CMD>    Dashboard command line (right pane)
  --ratio <F>          Left pane share of the width, between 0 and 1
  --min-width <N>      Narrowest pane before the view collapses to one pane
  --border <STYLE>     single, rounded, double or heavy
  --keys               Print the key bindings and exit
  -h, --help           Print this help and exit";

#[derive(Debug, Default)]
struct CliArgs {
    no_split: bool,
    overrides: Settings,
    print_keys: bool,
    print_help: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<CliArgs, String> {
    let mut out = CliArgs::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--no-split" => out.no_split = true,
            "--keys" => out.print_keys = true,
            "-h" | "--help" => out.print_help = true,
            "--assistant" => out.overrides.assistant = Some(value(&mut args, &arg)?),
            "--dashboard" => out.overrides.dashboard = Some(value(&mut args, &arg)?),
            "--ratio" => {
                let raw = value(&mut args, &arg)?;
                let ratio: f64 = raw
                    .parse()
                    .map_err(|_| format!("invalid --ratio value: {raw}"))?;
                if !(ratio > 0.0 && ratio < 1.0) {
                    return Err(format!("--ratio must be between 0 and 1, got {raw}"));
                }
                out.overrides.split_ratio = Some(ratio);
            }
            "--min-width" => {
                let raw = value(&mut args, &arg)?;
                let width = raw
                    .parse()
                    .map_err(|_| format!("invalid --min-width value: {raw}"))?;
                out.overrides.min_pane_width = Some(width);
            }
            "--border" => {
                let raw = value(&mut args, &arg)?;
                let style = BorderStyle::parse(&raw)
                    .ok_or_else(|| format!("unknown border style: {raw}"))?;
                out.overrides.border_style = Some(style);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
    }
    Ok(out)
}

fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, String> {
    args.next()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| format!("{flag} needs a value"))
}

fn main() -> ExitCode {
    let cli = match parse_args(std::env::args().skip(1)) {
        Ok(cli) => cli,
        Err(msg) => {
            eprintln!("splitview: {msg}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };
    if cli.print_help {
        println!("{USAGE}\n\n{}", shortcuts::full_help());
        return ExitCode::SUCCESS;
    }
    if cli.print_keys {
        println!("{}", shortcuts::full_help());
        return ExitCode::SUCCESS;
    }

    let logging = logging::init();

    if let Err(e) = config::ensure_settings_file() {
        tracing::warn!(error = %e, "could not create settings file");
    }
    let settings = config::load_settings()
        .unwrap_or_default()
        .merge(cli.overrides);
    let config = SplitViewConfig::from_settings(&settings, cli.no_split);
    tracing::info!(
        assistant = %describe(&config.left),
        dashboard = %describe(&config.right),
        split_ratio = config.split_ratio,
        min_pane_width = config.min_pane_width,
        single_pane = config.single_pane,
        "starting split view"
    );

    match run(config) {
        Ok(code) => ExitCode::from(code.clamp(0, 255) as u8),
        Err(e) => {
            tracing::error!(error = %e, "split view failed");
            match logging.as_ref() {
                Some(guard) => eprintln!("splitview: {e} (logs in {})", guard.log_dir().display()),
                None => eprintln!("splitview: {e}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(config: SplitViewConfig) -> Result<i32, Box<dyn std::error::Error>> {
    let guard = TerminalGuard::new()?;
    install_panic_hook(guard.restorer());

    let size = crossterm::terminal::size()?;
    let mut manager = SplitViewManager::new(config, io::stdout(), size);

    #[cfg(unix)]
    splitview::tui::terminal_guard::install_signal_handlers(guard.restorer(), manager.sender())?;
    spawn_input_reader(manager.sender())?;

    let result = manager.run();
    drop(manager);
    drop(guard);

    let reason = result?;
    tracing::info!(reason = ?reason, "split view stopped");
    Ok(reason.exit_code())
}

fn describe(command: &PaneCommand) -> String {
    std::iter::once(command.program.as_str())
        .chain(command.args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
#[path = "../tests/unit/cli.rs"]
mod tests;
