use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use serde::Deserialize;
use tracing::{info, warn};
use trellis_wm::bus::record::{Record, replay};
use trellis_wm::bus::sink::LogSink;
use trellis_wm::bus::{Bus, Command};
use trellis_wm::common::config::Config;
use trellis_wm::common::log;
use trellis_wm::model::geometry::Rect;
use trellis_wm::model::server::{self, TreeData};
use trellis_wm::sys::screen::ScreenInfo;
use trellis_wm::sys::window::WindowHandle;

#[derive(Parser)]
#[command(version, about = "Drive the trellis layout engine from a scenario file")]
struct Cli {
    /// Scenario to run (RON).
    scenario: Option<PathBuf>,

    /// Config file to use instead of the default location.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Re-run a saved command record instead of a scenario.
    #[arg(long, conflicts_with = "scenario")]
    replay: Option<PathBuf>,

    /// Save every dispatched command to this file.
    #[arg(long)]
    record: Option<PathBuf>,

    /// Print the final state as JSON.
    #[arg(long)]
    json: bool,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Deserialize, Debug)]
struct Scenario {
    monitors: Vec<ScreenInfo>,
    #[serde(default)]
    steps: Vec<Step>,
}

#[derive(Deserialize, Debug)]
enum Step {
    Open {
        handle: u64,
        #[serde(default)]
        floating: Option<Rect>,
    },
    Close(u64),
    Foreground(Option<u64>),
    Focus(String),
    MoveTo(String),
    Float { handle: u64, floating: bool },
}

fn main() -> anyhow::Result<()> {
    let opt = Cli::parse();
    log::init_logging(opt.verbose);

    let config = load_config(opt.config.as_ref())?;
    let record = match &opt.record {
        Some(path) => Record::to_file(path.clone()),
        None => Record::disabled(),
    };
    let mut bus = Bus::new(config, Box::new(LogSink)).with_record(record);

    match (&opt.scenario, &opt.replay) {
        (Some(path), _) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading scenario {}", path.display()))?;
            let scenario: Scenario = ron::from_str(&text)?;
            run_scenario(&mut bus, scenario);
        }
        (None, Some(path)) => replay(&mut bus, &Record::load(path)?),
        (None, None) => bail!("either a scenario or --replay is required"),
    }
    bus.record().save()?;

    let tree = TreeData::build(bus.state());
    if opt.json {
        let out = serde_json::json!({
            "tree": tree,
            "workspaces": server::workspaces(bus.state()),
            "monitors": server::monitors(bus.state()),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print!("{}", tree.render()?);
    }
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    if let Some(path) = path {
        return Config::read(path);
    }
    match Config::default_path() {
        Some(path) if path.exists() => Config::read(&path),
        _ => {
            info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}

fn run_scenario(bus: &mut Bus, scenario: Scenario) {
    for monitor in scenario.monitors {
        dispatch(bus, Command::AddMonitor(monitor));
    }
    for step in scenario.steps {
        let command = match step {
            Step::Open { handle, floating } => {
                let handle = WindowHandle::new(handle);
                dispatch(bus, Command::ManageWindow { handle, floating });
                Command::ForegroundChanged { handle: Some(handle) }
            }
            Step::Close(handle) => Command::UnmanageWindow { handle: WindowHandle::new(handle) },
            Step::Foreground(handle) => {
                Command::ForegroundChanged { handle: handle.map(WindowHandle::new) }
            }
            Step::Focus(workspace) => Command::FocusWorkspace { workspace },
            Step::MoveTo(workspace) => Command::MoveFocusedWindowToWorkspace { workspace },
            Step::Float { handle, floating } => {
                let Some(container) = bus.state().containers().by_handle(WindowHandle::new(handle))
                else {
                    warn!(handle, "No such window");
                    continue;
                };
                Command::SetWindowFloating { container, floating }
            }
        };
        dispatch(bus, command);
    }
}

fn dispatch(bus: &mut Bus, command: Command) {
    let name = command.name();
    if let Err(err) = bus.invoke(command) {
        warn!(command = name, %err, "Command failed");
    }
}
