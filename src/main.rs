use anyhow::{Context, bail};
use log::info;

use display_helper::{DisplayConfigApi, DisplayQuery, SwitchOutcome, Topology, TopologyId};

const USAGE: &str = "usage: display-helper <command>

commands:
  topology            print the current topology
  set <topology>      apply a topology (internal, clone, extend, external)
  switch <topology>   apply only if different, then confirm
  count               print the number of active displays
  list                list enumerated display devices";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Topology,
    Set(Topology),
    Switch(Topology),
    Count,
    List,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Command> {
    let Some(name) = args.next() else {
        bail!("missing command\n\n{USAGE}");
    };

    let mut target = || -> anyhow::Result<Topology> {
        let value = args
            .next()
            .with_context(|| format!("`{name}` needs a topology\n\n{USAGE}"))?;
        Ok(value.parse::<Topology>()?)
    };

    let command = match name.as_str() {
        "topology" => Command::Topology,
        "set" => Command::Set(target()?),
        "switch" => Command::Switch(target()?),
        "count" => Command::Count,
        "list" => Command::List,
        other => bail!("unknown command `{other}`\n\n{USAGE}"),
    };
    Ok(command)
}

#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
fn run<A: DisplayConfigApi>(query: &DisplayQuery<A>, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Topology => {
            let mut id = TopologyId::UNSET;
            query
                .read_topology(&mut id)
                .context("failed to read the current topology")?;
            match Topology::try_from(id) {
                Ok(topology) => println!("{topology}"),
                Err(_) => println!("unknown ({id})"),
            }
        }
        Command::Set(topology) => {
            query
                .apply_topology(topology.id())
                .with_context(|| format!("failed to apply {topology} topology"))?;
            info!("applied {topology} topology");
        }
        Command::Switch(topology) => {
            let outcome = query
                .switch_to(topology)
                .with_context(|| format!("failed to switch to {topology} topology"))?;
            match outcome {
                SwitchOutcome::Unchanged => println!("already {topology}"),
                SwitchOutcome::Switched => println!("switched to {topology}"),
            }
        }
        Command::Count => println!("{}", query.count_displays()),
        Command::List => {
            for report in query.devices() {
                let verdict = if report.mirroring {
                    "mirroring driver"
                } else if report.viable {
                    "active"
                } else {
                    "no modes"
                };
                println!(
                    "{:>2}  {:<24} {:#010x}  {verdict}",
                    report.index,
                    report.device.name,
                    report.device.state.bits()
                );
            }
        }
    }
    Ok(())
}

#[cfg(target_os = "windows")]
fn run_on_system(command: Command) -> anyhow::Result<()> {
    let query = DisplayQuery::new(display_helper::WinDisplayConfig::new());
    run(&query, command)
}

#[cfg(not(target_os = "windows"))]
fn run_on_system(_command: Command) -> anyhow::Result<()> {
    bail!("display topology control is only available on Windows")
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let command = parse_args(std::env::args().skip(1))?;
    run_on_system(command)
}
