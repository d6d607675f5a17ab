/// Network access policy carried through to a sandboxed child.
///
/// This crate does not itself enforce the policy (per spec: enforcement is a
/// downstream concern — a connect-time filter in the child or an
/// iptables-like mechanism). It is a plain data contract: a conforming
/// caller MUST block outbound connections when `allow_outbound` is false and
/// SHOULD restrict to `allowed_hosts`/`allowed_ports` when outbound is
/// allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkPolicy {
    pub allow_outbound: bool,
    pub allow_inbound: bool,
    pub allowed_hosts: Vec<String>,
    pub allowed_ports: Vec<u16>,
}

impl NetworkPolicy {
    /// Deny-everything policy; the common default for tool sandboxes.
    pub fn deny_all() -> Self {
        Self::default()
    }

    pub fn host_is_allowed(&self, host: &str) -> bool {
        self.allow_outbound && (self.allowed_hosts.is_empty() || self.allowed_hosts.iter().any(|h| h == host))
    }

    pub fn port_is_allowed(&self, port: u16) -> bool {
        self.allow_outbound && (self.allowed_ports.is_empty() || self.allowed_ports.contains(&port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deny_all_blocks_everything() {
        let policy = NetworkPolicy::deny_all();
        assert!(!policy.host_is_allowed("example.com"));
        assert!(!policy.port_is_allowed(443));
    }

    #[test]
    fn empty_allowlist_with_outbound_allows_any() {
        let policy = NetworkPolicy {
            allow_outbound: true,
            ..Default::default()
        };
        assert!(policy.host_is_allowed("anything.example"));
        assert!(policy.port_is_allowed(8080));
    }

    #[test]
    fn explicit_allowlist_restricts() {
        let policy = NetworkPolicy {
            allow_outbound: true,
            allowed_hosts: vec!["api.example.com".to_string()],
            allowed_ports: vec![443],
            ..Default::default()
        };
        assert!(policy.host_is_allowed("api.example.com"));
        assert!(!policy.host_is_allowed("other.example.com"));
        assert!(policy.port_is_allowed(443));
        assert!(!policy.port_is_allowed(80));
    }
}
