use regex::Regex;

use crate::drivers::{Action, InterfaceDescriptor, InterfaceStatus, LinkState, RouterDriver, VpnType};
use crate::error::RouterError;

/// Keenetic NDMS command line.
pub struct Keenetic {
    block_separator: Regex,
    name: Regex,
    kind: Regex,
    description: Regex,
    link: Regex,
    state: Regex,
}

impl Keenetic {
    const ESCAPE: char = '\u{1b}';

    pub fn new() -> Result<Self, RouterError> {
        Ok(Self {
            block_separator: Regex::new(r"\n[ \t]*\n")?,
            name: Regex::new(r"(?m)^\s*interface-name:\s*(\S+)")?,
            kind: Regex::new(r"(?m)^\s*type:\s*(\S+)")?,
            description: Regex::new(r"(?m)^\s*description:[ \t]*(.*)$")?,
            link: Regex::new(r"(?i)\blink:\s+(up|down)\b")?,
            state: Regex::new(r"(?i)\bstate:\s+(up|down)\b")?,
        })
    }

    /// Drops carriage returns and CSI escape sequences some firmwares emit.
    fn clean_output(&self, input: &str) -> String {
        let mut escape = false;
        let mut csi = false;
        let mut result = String::with_capacity(input.len());
        for c in input.chars() {
            match c {
                Keenetic::ESCAPE => {
                    escape = true;
                }
                '[' if escape && !csi => {
                    csi = true;
                    escape = false;
                }
                '\u{40}'..='\u{7e}' if csi => {
                    csi = false;
                }
                _ if csi => {}
                '\r' => {}
                _ => {
                    escape = false;
                    result.push(c);
                }
            }
        }
        result
    }

    fn parse_block(&self, block: &str) -> Option<InterfaceDescriptor> {
        let name = self.name.captures(block)?.get(1)?.as_str();
        let label = self.kind.captures(block)?.get(1)?.as_str();
        let vpn_type = VpnType::from_label(label)?;
        let description = self
            .description
            .captures(block)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();
        Some(InterfaceDescriptor {
            name: name.to_string(),
            vpn_type,
            description,
        })
    }

    fn capture_state(pattern: &Regex, output: &str) -> Option<LinkState> {
        let word = pattern.captures(output)?.get(1)?.as_str();
        LinkState::parse(word)
    }
}

impl RouterDriver for Keenetic {
    fn name(&self) -> &'static str {
        "keenetic"
    }

    fn list_command(&self) -> String {
        String::from("show interface")
    }

    fn status_command(&self, interface: &str) -> String {
        format!("show interface {}", interface)
    }

    fn switch_command(&self, interface: &str, action: Action) -> String {
        format!("interface {} {}", interface, action.word())
    }

    fn parse_interfaces(&self, output: &str) -> Vec<InterfaceDescriptor> {
        let output = self.clean_output(output);
        self.block_separator
            .split(&output)
            .filter_map(|block| self.parse_block(block))
            .collect()
    }

    fn parse_status(&self, output: &str) -> Option<InterfaceStatus> {
        let output = self.clean_output(output);
        let link = Keenetic::capture_state(&self.link, &output)?;
        let state = Keenetic::capture_state(&self.state, &output)?;
        Some(InterfaceStatus { link, state })
    }
}

#[cfg(test)]
mod tests {
    use super::Keenetic;
    use crate::drivers::{Action, InterfaceDescriptor, LinkState, RouterDriver, VpnType};

    const LISTING: &str = "\
Interface, name = \"GigabitEthernet0\":
               id: GigabitEthernet0
   interface-name: GigabitEthernet0
             type: GigabitEthernet
             link: up

Interface, name = \"OpenVPN0\":
               id: OpenVPN0
   interface-name: vpn0
             type: OpenVPN
      description: Home
             link: up
            state: up

Interface, name = \"Wireguard0\":
   interface-name: Wireguard0
             type: WireGuard
      description: Office

Interface, name = \"L2TP0\":
   interface-name: L2TP0
             type: L2TP
            state: down
";

    #[test]
    fn listing_keeps_vpn_blocks_in_order() {
        let driver = Keenetic::new().unwrap();
        let found = driver.parse_interfaces(LISTING);
        assert_eq!(
            found,
            vec![
                InterfaceDescriptor {
                    name: "vpn0".to_string(),
                    vpn_type: VpnType::OpenVpn,
                    description: "Home".to_string(),
                },
                InterfaceDescriptor {
                    name: "L2TP0".to_string(),
                    vpn_type: VpnType::L2tp,
                    description: String::new(),
                },
            ]
        );
    }

    #[test]
    fn listing_without_vpn_is_empty() {
        let driver = Keenetic::new().unwrap();
        assert!(driver
            .parse_interfaces("interface-name: Bridge0\ntype: Bridge\n")
            .is_empty());
        assert!(driver.parse_interfaces("").is_empty());
    }

    #[test]
    fn listing_handles_crlf_output() {
        let driver = Keenetic::new().unwrap();
        let output = "interface-name: PPTP0\r\ntype: PPTP\r\n\r\ninterface-name: IPSec0\r\ntype: IPSec\r\ndescription: Branch\r\n";
        let found = driver.parse_interfaces(output);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].vpn_type, VpnType::Pptp);
        assert_eq!(found[1].name, "IPSec0");
        assert_eq!(found[1].description, "Branch");
    }

    #[test]
    fn status_is_read_in_any_case() {
        let driver = Keenetic::new().unwrap();
        let status = driver
            .parse_status("id: OpenVPN0\nLink: UP\nconnected: yes\nSTATE: Down\n")
            .unwrap();
        assert_eq!(status.link, LinkState::Up);
        assert_eq!(status.state, LinkState::Down);
    }

    #[test]
    fn status_requires_both_fields() {
        let driver = Keenetic::new().unwrap();
        assert!(driver.parse_status("link: up\nconnected: yes\n").is_none());
        assert!(driver.parse_status("state: up\n").is_none());
        assert!(driver.parse_status("link: pending\nstate: up\n").is_none());
    }

    #[test]
    fn escape_sequences() {
        let driver = Keenetic::new().unwrap();
        let cleaned = driver.clean_output("link:\u{001b}[1m up\u{001b}[0m\r\nstate: down");
        assert_eq!(cleaned, "link: up\nstate: down");
        let status = driver.parse_status("link:\u{001b}[32m up\nstate:\u{001b}[2001l down").unwrap();
        assert_eq!(status.link, LinkState::Up);
        assert_eq!(status.state, LinkState::Down);
    }

    #[test]
    fn commands() {
        let driver = Keenetic::new().unwrap();
        assert_eq!(driver.list_command(), "show interface");
        assert_eq!(driver.status_command("OpenVPN0"), "show interface OpenVPN0");
        assert_eq!(driver.switch_command("OpenVPN0", Action::BringUp), "interface OpenVPN0 up");
        assert_eq!(driver.switch_command("OpenVPN0", Action::BringDown), "interface OpenVPN0 down");
    }
}
