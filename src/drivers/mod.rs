pub mod keenetic;

use std::fmt;

use crate::drivers::keenetic::Keenetic;
use crate::error::RouterError;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LinkState {
    Up,
    Down,
}

impl LinkState {
    /// Case-insensitive; only the literal words `up` and `down` are accepted.
    pub fn parse(word: &str) -> Option<Self> {
        match word.to_lowercase().as_str() {
            "up" => Some(LinkState::Up),
            "down" => Some(LinkState::Down),
            _ => None,
        }
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LinkState::Up => write!(f, "up"),
            LinkState::Down => write!(f, "down"),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct InterfaceStatus {
    pub link: LinkState,
    pub state: LinkState,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum VpnType {
    OpenVpn,
    Pptp,
    L2tp,
    IpSec,
}

impl VpnType {
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "OpenVPN" => Some(VpnType::OpenVpn),
            "PPTP" => Some(VpnType::Pptp),
            "L2TP" => Some(VpnType::L2tp),
            "IPSec" => Some(VpnType::IpSec),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VpnType::OpenVpn => "OpenVPN",
            VpnType::Pptp => "PPTP",
            VpnType::L2tp => "L2TP",
            VpnType::IpSec => "IPSec",
        }
    }
}

impl fmt::Display for VpnType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct InterfaceDescriptor {
    pub name: String,
    pub vpn_type: VpnType,
    pub description: String,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    BringUp,
    BringDown,
}

impl Action {
    /// An interface only counts as running when both link and state read up.
    pub fn decide(status: &InterfaceStatus) -> Self {
        if status.link == LinkState::Up && status.state == LinkState::Up {
            Action::BringDown
        } else {
            Action::BringUp
        }
    }

    /// CLI word for the switch command. It follows the decided action, not the
    /// observed link, so a link-up/state-down interface gets `up`.
    pub fn word(&self) -> &'static str {
        match self {
            Action::BringUp => "up",
            Action::BringDown => "down",
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Action::BringUp => "bring up",
            Action::BringDown => "bring down",
        }
    }
}

/// Vendor CLI dialect: the commands to send and how to read their output.
pub trait RouterDriver {
    fn name(&self) -> &'static str;
    fn list_command(&self) -> String;
    fn status_command(&self, interface: &str) -> String;
    fn switch_command(&self, interface: &str, action: Action) -> String;
    fn parse_interfaces(&self, output: &str) -> Vec<InterfaceDescriptor>;
    fn parse_status(&self, output: &str) -> Option<InterfaceStatus>;
}

pub fn by_name(driver: &str) -> Result<Box<dyn RouterDriver>, RouterError> {
    match driver.to_lowercase().as_str() {
        "keenetic" => Ok(Box::new(Keenetic::new()?)),
        _ => Err(RouterError::UnknownDriver(driver.to_string())),
    }
}
