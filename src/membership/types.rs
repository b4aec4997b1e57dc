use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// The static replica roster, identical on every replica.
///
/// Built once at startup from the `VIEW` environment variable; the order of
/// addresses in `VIEW` defines vector-clock slot assignment, and the
/// position of `SOCKET_ADDRESS` in that list is the local slot index.
#[derive(Debug, Clone)]
pub struct Roster {
    addrs: Vec<String>,
    self_index: usize,
}

impl Roster {
    /// Builds the roster from the replica's own address and the
    /// comma-separated fleet listing.
    pub fn new(socket_address: &str, view: &str) -> Result<Self> {
        let addrs: Vec<String> = view
            .split(',')
            .map(|addr| addr.trim().to_string())
            .filter(|addr| !addr.is_empty())
            .collect();
        if addrs.is_empty() {
            bail!("VIEW does not name any replica");
        }

        let socket_address = socket_address.trim();
        let self_index = match addrs.iter().position(|addr| addr == socket_address) {
            Some(index) => index,
            None => bail!(
                "SOCKET_ADDRESS {} does not appear in VIEW {:?}",
                socket_address,
                addrs
            ),
        };

        Ok(Self { addrs, self_index })
    }

    /// Reads `SOCKET_ADDRESS` and `VIEW` from the process environment.
    pub fn from_env() -> Result<Self> {
        let socket_address =
            std::env::var("SOCKET_ADDRESS").context("SOCKET_ADDRESS is not set")?;
        let view = std::env::var("VIEW").context("VIEW is not set")?;
        Self::new(&socket_address, &view)
    }

    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }

    pub fn addrs(&self) -> &[String] {
        &self.addrs
    }

    /// This replica's vector-clock slot.
    pub fn self_index(&self) -> usize {
        self.self_index
    }

    pub fn self_addr(&self) -> &str {
        &self.addrs[self.self_index]
    }

    /// Every roster address except this replica's own.
    pub fn peers(&self) -> impl Iterator<Item = &str> {
        let own = self.self_addr();
        self.addrs
            .iter()
            .map(String::as_str)
            .filter(move |addr| *addr != own)
    }

    /// The port component of the local address, which the HTTP listener
    /// binds on all interfaces.
    pub fn self_port(&self) -> Result<u16> {
        let addr = self.self_addr();
        let port = addr
            .rsplit_once(':')
            .map(|(_, port)| port)
            .with_context(|| format!("SOCKET_ADDRESS {} has no port", addr))?;
        port.parse()
            .with_context(|| format!("SOCKET_ADDRESS {} has an invalid port", addr))
    }
}

/// Result of adding an address to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
}

/// Result of removing an address from the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Deleted,
    NotPresent,
}

/// The live membership set: the subset of the roster this replica
/// currently believes reachable, in insertion order.
#[derive(Debug, Clone)]
pub struct View {
    members: Vec<String>,
}

impl View {
    /// The startup view: every roster member is assumed reachable until the
    /// failure detector says otherwise.
    pub fn full(roster: &Roster) -> Self {
        Self {
            members: roster.addrs().to_vec(),
        }
    }

    pub fn add(&mut self, addr: &str) -> AddOutcome {
        if self.contains(addr) {
            return AddOutcome::AlreadyPresent;
        }
        self.members.push(addr.to_string());
        AddOutcome::Added
    }

    pub fn remove(&mut self, addr: &str) -> RemoveOutcome {
        match self.members.iter().position(|member| member == addr) {
            Some(index) => {
                self.members.remove(index);
                RemoveOutcome::Deleted
            }
            None => RemoveOutcome::NotPresent,
        }
    }

    pub fn contains(&self, addr: &str) -> bool {
        self.members.iter().any(|member| member == addr)
    }

    /// Current members in insertion order.
    pub fn list(&self) -> Vec<String> {
        self.members.clone()
    }

    /// Current members except `own`, the target set for one broadcast.
    pub fn peers_of(&self, own: &str) -> Vec<String> {
        self.members
            .iter()
            .filter(|member| member.as_str() != own)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

// --- /view wire shapes ---

/// Body of `PUT /view` and `DELETE /view`: the address being announced or
/// reported down.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewChange {
    #[serde(rename = "socket-address")]
    pub socket_address: String,
}

/// Result or error envelope for view mutations.
#[derive(Debug, Serialize, Deserialize)]
pub struct ViewReply {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ViewReply {
    pub fn result(result: &str) -> Self {
        Self {
            result: Some(result.to_string()),
            error: None,
        }
    }

    pub fn error(error: &str) -> Self {
        Self {
            result: None,
            error: Some(error.to_string()),
        }
    }
}

/// Body of `GET /view`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ViewListing {
    pub view: Vec<String>,
}
