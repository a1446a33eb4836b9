//! Read-only questions asked of the router.

use tracing::debug;

use crate::drivers::{InterfaceDescriptor, InterfaceStatus, RouterDriver};
use crate::error::RouterError;
use crate::CommandExecutor;

#[derive(Debug)]
pub enum StatusReport {
    Available(InterfaceStatus),
    /// The router answered, but without both `link` and `state`.
    Unparsable,
    Unreachable(RouterError),
}

/// `None` means the router could not be reached; `Some(vec![])` means it has no VPN interfaces.
pub async fn list_interfaces(
    executor: &mut dyn CommandExecutor,
    driver: &dyn RouterDriver,
) -> Option<Vec<InterfaceDescriptor>> {
    let output = executor.safe_execute(&driver.list_command()).await?;
    let found = driver.parse_interfaces(&output);
    debug!("Router reported {} VPN interface(s)", found.len());
    Some(found)
}

pub async fn get_status(
    executor: &mut dyn CommandExecutor,
    driver: &dyn RouterDriver,
    interface: &str,
) -> StatusReport {
    let output = match executor.execute(&driver.status_command(interface)).await {
        Ok(output) => output,
        Err(e) => return StatusReport::Unreachable(e),
    };
    match driver.parse_status(&output) {
        Some(status) => StatusReport::Available(status),
        None => {
            debug!("No link/state for {} in: {:?}", interface, output);
            StatusReport::Unparsable
        }
    }
}
