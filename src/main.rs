use clap::{arg, command, Command};
use tracing::{error, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use vpntoggle::config::{ConfigStore, DEFAULT_CONFIG_PATH};
use vpntoggle::console::{Console, TerminalConsole};
use vpntoggle::query::{get_status, list_interfaces, StatusReport};
use vpntoggle::setup::{first_run, select_interface};
use vpntoggle::toggle::{show_status, toggle_managed};
use vpntoggle::{drivers, RouterTarget, SshExecutor};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = command!()
        .about("Switch a router's VPN interface on or off over SSH")
        .arg(
            arg!(config: -c --config <PATH> "configuration file")
                .default_value(DEFAULT_CONFIG_PATH)
        )
        .arg(
            arg!(driver: -d --driver <NAME> "router command line dialect")
                .default_value("keenetic")
        )
        .arg(arg!(verbose: -v --verbose "log every router command"))
        .subcommand(Command::new("toggle").about("Switch the managed interface (default)"))
        .subcommand(Command::new("status").about("Show link and state of the managed interface"))
        .subcommand(Command::new("list").about("List VPN interfaces on the router"))
        .subcommand(Command::new("select").about("Choose another interface to manage"))
        .subcommand(Command::new("setup").about("Run first-time setup again"))
        .get_matches();

    let level = if args.get_flag("verbose") {
        Level::DEBUG
    } else {
        Level::INFO
    };
    // RUST_LOG, when set, takes precedence over --verbose.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = args
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or(DEFAULT_CONFIG_PATH);
    let driver_name = args
        .get_one::<String>("driver")
        .map(String::as_str)
        .unwrap_or("keenetic");
    let driver = drivers::by_name(driver_name)?;
    let store = ConfigStore::new(config_path);
    let mut console = TerminalConsole;

    let command = args.subcommand_name().unwrap_or("toggle");
    let existing = if command == "setup" { None } else { store.load()? };
    let (mut config, target) = match existing {
        Some(config) => {
            console.say(&format!(
                "Connecting to {} as {}",
                config.router_ip, config.username
            ));
            let password = console.ask_secret("Password: ")?;
            let target = RouterTarget::from_config(&config, &password);
            (config, target)
        }
        None => match first_run(&mut console, driver.as_ref(), &store, SshExecutor::new).await? {
            Some(done) => done,
            None => {
                error!("Setup did not produce a usable configuration");
                std::process::exit(1);
            }
        },
    };

    let mut executor = SshExecutor::new(target);
    match command {
        "setup" => {}
        "status" => {
            let interface = config.vpn_interface.clone();
            match get_status(&mut executor, driver.as_ref(), &interface).await {
                StatusReport::Available(status) => show_status(&mut console, &interface, &status),
                StatusReport::Unparsable => console.say(&format!(
                    "Could not determine the status of interface {}.",
                    interface
                )),
                StatusReport::Unreachable(e) => {
                    console.say(&format!("Could not reach the router: {}", e))
                }
            }
        }
        "list" => match list_interfaces(&mut executor, driver.as_ref()).await {
            Some(found) if found.is_empty() => console.say("No VPN interfaces found on the router."),
            Some(found) => {
                for iface in found {
                    let marker = if iface.name == config.vpn_interface { "*" } else { " " };
                    console.say(&format!(
                        "{} {} ({}) {}",
                        marker, iface.name, iface.vpn_type, iface.description
                    ));
                }
            }
            None => console.say("Could not get the interface list from the router."),
        },
        "select" => {
            select_interface(&mut executor, driver.as_ref(), &mut console, &mut config, &store)
                .await?;
        }
        _ => {
            toggle_managed(&mut executor, driver.as_ref(), &mut console, &mut config, &store)
                .await?;
        }
    }

    Ok(())
}
