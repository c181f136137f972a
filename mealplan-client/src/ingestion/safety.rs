//! Refuse URLs that would make the fetcher reach into private networks.

use std::net::{Ipv4Addr, Ipv6Addr};
use url::{Host, Url};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UnsafeUrl {
    #[error("Only HTTP and HTTPS URLs are allowed")]
    Scheme,
    #[error("missing domain")]
    MissingHost,
    #[error("Loopback addresses are not allowed")]
    Loopback,
    #[error("Private IP addresses are not allowed")]
    Private,
    #[error("Link-local addresses are not allowed")]
    LinkLocal,
    #[error("Internal hostnames are not allowed")]
    InternalHost,
}

impl UnsafeUrl {
    pub fn user_message(&self) -> String {
        format!("Invalid URL: {self}")
    }
}

const INTERNAL_HOSTNAMES: [&str; 2] = ["localhost", "metadata.google.internal"];
const INTERNAL_SUFFIXES: [&str; 3] = [".localhost", ".internal", ".local"];

pub fn check_url(raw: &str) -> Result<Url, UnsafeUrl> {
    let url = match Url::parse(raw.trim()) {
        Ok(url) => url,
        Err(url::ParseError::EmptyHost) => return Err(UnsafeUrl::MissingHost),
        Err(_) => return Err(UnsafeUrl::Scheme),
    };
    if !matches!(url.scheme(), "http" | "https") {
        return Err(UnsafeUrl::Scheme);
    }
    match url.host() {
        None => Err(UnsafeUrl::MissingHost),
        Some(Host::Domain(domain)) => check_domain(domain),
        Some(Host::Ipv4(ip)) => check_ipv4(ip),
        Some(Host::Ipv6(ip)) => check_ipv6(ip),
    }?;
    Ok(url)
}

fn check_domain(domain: &str) -> Result<(), UnsafeUrl> {
    let domain = domain.trim_end_matches('.').to_ascii_lowercase();
    if domain.is_empty() {
        return Err(UnsafeUrl::MissingHost);
    }
    if INTERNAL_HOSTNAMES.contains(&domain.as_str())
        || INTERNAL_SUFFIXES.iter().any(|suffix| domain.ends_with(suffix))
    {
        return Err(UnsafeUrl::InternalHost);
    }
    Ok(())
}

fn check_ipv4(ip: Ipv4Addr) -> Result<(), UnsafeUrl> {
    let shared = ip.octets()[0] == 100 && (ip.octets()[1] & 0xc0) == 64;
    if ip.is_loopback() {
        Err(UnsafeUrl::Loopback)
    } else if ip.is_link_local() {
        Err(UnsafeUrl::LinkLocal)
    } else if ip.is_private() || ip.is_unspecified() || ip.is_broadcast() || shared {
        Err(UnsafeUrl::Private)
    } else {
        Ok(())
    }
}

fn check_ipv6(ip: Ipv6Addr) -> Result<(), UnsafeUrl> {
    if let Some(mapped) = ip.to_ipv4_mapped() {
        return check_ipv4(mapped);
    }
    let first = ip.segments()[0];
    if ip.is_loopback() {
        Err(UnsafeUrl::Loopback)
    } else if first & 0xffc0 == 0xfe80 {
        Err(UnsafeUrl::LinkLocal)
    } else if first & 0xfe00 == 0xfc00 || ip.is_unspecified() {
        Err(UnsafeUrl::Private)
    } else {
        Ok(())
    }
}
