use std::{net::IpAddr, str::FromStr, sync::OnceLock};

use actix_web::HttpRequest;
use log::{debug, info, trace, warn};
use regex::Regex;

fn forwarded_for_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"(?i)for="?\[?(?P<ip>[0-9a-f.:]+?)\]?(:\d+)?"?(;|,|$)"#).ok()).as_ref()
}

/// Get the remote IP address from the request. It uses 3 sources to determine the IP address, in decreasing order
/// of preference:
/// 1. The first entry of the `X-Forwarded-For` header, iif `use_x_forwarded_for` is set to true in the configuration.
/// 2. The first `for=` entry of the `Forwarded` header, iif `use_forwarded` is set to true in the configuration.
/// 3. The peer address from the connection info.
pub fn get_remote_ip(req: &HttpRequest, use_x_forwarded_for: bool, use_forwarded: bool) -> Option<IpAddr> {
    let mut result = None;
    if use_x_forwarded_for {
        trace!("Checking X-Forwarded-For header");
        result = req
            .headers()
            .get("X-Forwarded-For")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| IpAddr::from_str(s.trim()).ok());
        if let Some(ip) = result {
            debug!("Using X-Forwarded-For header for remote address: {ip}");
        }
    }
    if use_forwarded && result.is_none() {
        trace!("Checking Forwarded header");
        result = req
            .headers()
            .get("Forwarded")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_forwarded_for);
        if let Some(ip) = result {
            debug!("Using Forwarded header for remote address: {ip}");
        }
    }
    result.or_else(|| {
        let peer_addr = req.peer_addr().map(|a| a.ip());
        trace!("Using Peer address for remote address: {:?}", peer_addr);
        peer_addr
    })
}

/// Checks a request's remote address against an optional whitelist. With no whitelist configured, every address is
/// accepted. With one, a request whose address cannot be determined is refused.
pub fn is_whitelisted(peer_ip: Option<IpAddr>, whitelist: Option<&[IpAddr]>) -> bool {
    match (peer_ip, whitelist) {
        (Some(ip), Some(whitelist)) => {
            info!("💻️ Payment webhook delivery from {ip}");
            whitelist.contains(&ip)
        },
        (_, None) => true,
        (None, Some(_)) => {
            warn!("💻️ No IP address found in payment webhook request, denying access.");
            false
        },
    }
}

/// Extracts the client address from a `Forwarded` header value, e.g. `for=192.0.2.60;proto=http;by=203.0.113.43`.
pub fn parse_forwarded_for(header: &str) -> Option<IpAddr> {
    forwarded_for_pattern()?
        .captures(header)
        .and_then(|caps| caps.name("ip"))
        .and_then(|m| IpAddr::from_str(m.as_str()).ok())
}

#[cfg(test)]
mod test {
    use actix_web::test::TestRequest;

    use super::*;

    #[test]
    fn forwarded_header() {
        assert_eq!(parse_forwarded_for("for=192.0.2.60;proto=http;by=203.0.113.43"), "192.0.2.60".parse().ok());
        assert_eq!(parse_forwarded_for("For=\"[2001:db8:cafe::17]:4711\""), "2001:db8:cafe::17".parse().ok());
        assert_eq!(parse_forwarded_for("for=192.0.2.43, for=198.51.100.17"), "192.0.2.43".parse().ok());
        assert_eq!(parse_forwarded_for("proto=https"), None);
    }

    #[test]
    fn whitelist_checks() {
        let allowed: Vec<IpAddr> = vec!["3.18.12.63".parse().unwrap()];
        assert!(is_whitelisted("3.18.12.63".parse().ok(), Some(&allowed)));
        assert!(!is_whitelisted("10.0.0.1".parse().ok(), Some(&allowed)));
        assert!(!is_whitelisted(None, Some(&allowed)));
        assert!(!is_whitelisted("3.18.12.63".parse().ok(), Some(&[])));
        assert!(is_whitelisted(None, None));
        assert!(is_whitelisted("10.0.0.1".parse().ok(), None));
    }

    #[test]
    fn remote_ip_preference() {
        let req = TestRequest::default()
            .peer_addr("10.0.0.1:5555".parse().unwrap())
            .insert_header(("X-Forwarded-For", "54.187.174.169, 10.0.0.2"))
            .insert_header(("Forwarded", "for=54.187.205.235"))
            .to_http_request();
        assert_eq!(get_remote_ip(&req, true, true), "54.187.174.169".parse().ok());
        assert_eq!(get_remote_ip(&req, false, true), "54.187.205.235".parse().ok());
        assert_eq!(get_remote_ip(&req, false, false), "10.0.0.1".parse().ok());
    }
}
