//! Flipping a VPN interface after the user agrees.
//!
//! Each run walks `Idle -> StatusQueried -> Aborted | AwaitingConfirmation`, and from
//! there ends `Cancelled` or `Executed`. Nothing carries over between runs.

use tracing::info;

use crate::config::{Config, ConfigStore};
use crate::console::{Confirmation, Console};
use crate::drivers::{Action, InterfaceStatus, RouterDriver};
use crate::error::RouterError;
use crate::query::{get_status, StatusReport};
use crate::setup::select_interface;
use crate::CommandExecutor;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AbortReason {
    Unreachable,
    Unparsable,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ToggleOutcome {
    Aborted(AbortReason),
    Cancelled,
    Executed { command: String },
}

enum Step {
    Finished(ToggleOutcome),
    ChangeRequested,
}

pub fn show_status(console: &mut dyn Console, interface: &str, status: &InterfaceStatus) {
    console.say(&format!("Interface {} status:", interface));
    console.say(&format!("   link:  {}", status.link));
    console.say(&format!("   state: {}", status.state));
}

async fn attempt(
    executor: &mut dyn CommandExecutor,
    driver: &dyn RouterDriver,
    console: &mut dyn Console,
    interface: &str,
    allow_change: bool,
) -> Result<Step, RouterError> {
    let status = match get_status(executor, driver, interface).await {
        StatusReport::Available(status) => status,
        StatusReport::Unparsable => {
            console.say(&format!(
                "Could not determine the status of interface {}.",
                interface
            ));
            return Ok(Step::Finished(ToggleOutcome::Aborted(AbortReason::Unparsable)));
        }
        StatusReport::Unreachable(e) => {
            console.say(&format!("Could not reach the router: {}", e));
            return Ok(Step::Finished(ToggleOutcome::Aborted(AbortReason::Unreachable)));
        }
    };

    show_status(console, interface, &status);
    let action = Action::decide(&status);
    let choices = if allow_change { "y/n/c" } else { "y/n" };
    let answer = console.ask(&format!(
        "Do you want to {} interface {}? ({}): ",
        action.describe(),
        interface,
        choices
    ))?;

    match Confirmation::parse(&answer, allow_change) {
        Confirmation::Yes => {}
        Confirmation::Change => return Ok(Step::ChangeRequested),
        Confirmation::No => {
            console.say("Operation cancelled.");
            return Ok(Step::Finished(ToggleOutcome::Cancelled));
        }
    }

    let command = driver.switch_command(interface, action);
    console.say(&format!("Running: {}", command));
    if let Err(e) = executor.execute(&command).await {
        console.say(&format!("Could not reach the router: {}", e));
        return Ok(Step::Finished(ToggleOutcome::Aborted(AbortReason::Unreachable)));
    }
    info!("Sent '{}'", command);
    console.say("Done.");
    Ok(Step::Finished(ToggleOutcome::Executed { command }))
}

/// Queries `interface`, asks for confirmation and switches it. The router is never
/// touched unless its status was read and the user answered `y`.
pub async fn toggle(
    executor: &mut dyn CommandExecutor,
    driver: &dyn RouterDriver,
    console: &mut dyn Console,
    interface: &str,
) -> Result<ToggleOutcome, RouterError> {
    match attempt(executor, driver, console, interface, false).await? {
        Step::Finished(outcome) => Ok(outcome),
        Step::ChangeRequested => Ok(ToggleOutcome::Cancelled),
    }
}

/// [`toggle`] on the configured interface, where `c` switches to another interface
/// (saved immediately) and starts over.
pub async fn toggle_managed(
    executor: &mut dyn CommandExecutor,
    driver: &dyn RouterDriver,
    console: &mut dyn Console,
    config: &mut Config,
    store: &ConfigStore,
) -> Result<ToggleOutcome, RouterError> {
    loop {
        let interface = config.vpn_interface.clone();
        match attempt(executor, driver, console, &interface, true).await? {
            Step::Finished(outcome) => return Ok(outcome),
            Step::ChangeRequested => {
                select_interface(executor, driver, console, config, store).await?;
            }
        }
    }
}
