//! First-run setup and interface selection.

use tracing::info;

use crate::config::{Config, ConfigStore, DEFAULT_PORT};
use crate::console::Console;
use crate::drivers::{InterfaceDescriptor, RouterDriver};
use crate::error::RouterError;
use crate::query::list_interfaces;
use crate::{CommandExecutor, RouterTarget};

pub const MAX_SETUP_ATTEMPTS: usize = 3;
pub const DEFAULT_ROUTER_IP: &str = "192.168.0.254";
pub const DEFAULT_USERNAME: &str = "admin";

fn ask_with_default(
    console: &mut dyn Console,
    question: &str,
    default: &str,
) -> Result<String, RouterError> {
    let answer = console.ask(&format!("{} [{}]: ", question, default))?;
    let answer = answer.trim();
    if answer.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(answer.to_string())
    }
}

/// Prints a numbered list and asks until a valid number is entered.
pub fn choose_interface<'a>(
    console: &mut dyn Console,
    interfaces: &'a [InterfaceDescriptor],
) -> Result<&'a InterfaceDescriptor, RouterError> {
    console.say("VPN interfaces on the router:");
    for (i, iface) in interfaces.iter().enumerate() {
        if iface.description.is_empty() {
            console.say(&format!("  {}. {} ({})", i + 1, iface.name, iface.vpn_type));
        } else {
            console.say(&format!(
                "  {}. {} ({}) - {}",
                i + 1,
                iface.name,
                iface.vpn_type,
                iface.description
            ));
        }
    }
    loop {
        let answer = console.ask(&format!("Select interface [1-{}]: ", interfaces.len()))?;
        match answer.trim().parse::<usize>() {
            Ok(n) if n >= 1 && n <= interfaces.len() => return Ok(&interfaces[n - 1]),
            _ => console.say("Please enter one of the listed numbers."),
        }
    }
}

/// Lets the user pick a different managed interface and saves it.
/// Returns `false` if the router could not offer any.
pub async fn select_interface(
    executor: &mut dyn CommandExecutor,
    driver: &dyn RouterDriver,
    console: &mut dyn Console,
    config: &mut Config,
    store: &ConfigStore,
) -> Result<bool, RouterError> {
    let interfaces = match list_interfaces(executor, driver).await {
        Some(found) if !found.is_empty() => found,
        Some(_) => {
            console.say("No VPN interfaces found on the router.");
            return Ok(false);
        }
        None => {
            console.say("Could not get the interface list from the router.");
            return Ok(false);
        }
    };
    let chosen = choose_interface(console, &interfaces)?;
    config.vpn_interface = chosen.name.clone();
    store.save(config)?;
    info!("Managed interface set to {}", config.vpn_interface);
    console.say(&format!("Now managing {}.", config.vpn_interface));
    Ok(true)
}

/// Collects router credentials, picks an interface and writes the config.
/// Gives up with `Ok(None)` after [`MAX_SETUP_ATTEMPTS`] failed attempts.
pub async fn first_run<E, F>(
    console: &mut dyn Console,
    driver: &dyn RouterDriver,
    store: &ConfigStore,
    mut connect: F,
) -> Result<Option<(Config, RouterTarget)>, RouterError>
where
    E: CommandExecutor,
    F: FnMut(RouterTarget) -> E,
{
    for attempt in 1..=MAX_SETUP_ATTEMPTS {
        let host = ask_with_default(console, "Router address", DEFAULT_ROUTER_IP)?;
        let username = ask_with_default(console, "Username", DEFAULT_USERNAME)?;
        let password = console.ask_secret("Password: ")?;
        let target = RouterTarget::new(&host, DEFAULT_PORT, &username, &password);

        let mut executor = connect(target.clone());
        let interfaces = match list_interfaces(&mut executor, driver).await {
            Some(found) if !found.is_empty() => found,
            Some(_) => {
                console.say("No VPN interfaces found on the router.");
                continue;
            }
            None => {
                console.say(&format!(
                    "Could not connect to {} (attempt {} of {}). Check the address and credentials.",
                    target.address(),
                    attempt,
                    MAX_SETUP_ATTEMPTS
                ));
                continue;
            }
        };

        let chosen = choose_interface(console, &interfaces)?;
        let config = Config::new(&host, &username, &chosen.name);
        store.save(&config)?;
        console.say(&format!("Configuration saved to {}.", store.path().display()));
        return Ok(Some((config, target)));
    }
    console.say("Setup abandoned.");
    Ok(None)
}
