/*
** This file is a part of Iksemel (XML parser for Jabber/XMPP)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Iksemel is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

mod error;

use std::fmt::Display;
use std::hash::Hash;
use std::hash::Hasher;
use std::num::NonZeroUsize;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::LazyLock;

use lru::LruCache;
use parking_lot::Mutex;

pub use error::BadJid;
use error::description;

const MAX_PART_SIZE: usize = 1023;

const CACHE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(256) {
    Some(capacity) => capacity,
    None => panic!("cache capacity must be positive"),
};

static CACHE: LazyLock<Mutex<LruCache<String, Jid>>> =
    LazyLock::new(|| Mutex::new(LruCache::new(CACHE_CAPACITY)));

struct JidParts<'a> {
    local: Option<&'a str>,
    domain: &'a str,
    resource: Option<&'a str>,
}

impl<'a> JidParts<'a> {
    fn new(jid: &'a str) -> Result<JidParts<'a>, BadJid> {
        let at_pos = jid.find('@');
        let slash_pos = match at_pos {
            Some(pos) => jid[pos + 1..].find('/').map(|slash| slash + pos + 1),
            None => jid.find('/'),
        };
        let domain = match (at_pos, slash_pos) {
            (None, None) => jid,
            (Some(pos), None) => &jid[pos + 1..],
            (None, Some(pos)) => &jid[..pos],
            (Some(pos), Some(pos2)) => &jid[pos + 1..pos2],
        };
        let local = at_pos.map(|pos| &jid[..pos]);
        let resource = slash_pos.map(|pos| &jid[pos + 1..]);
        JidParts::checked(local, domain, resource)
    }

    fn checked(
        local: Option<&'a str>,
        domain: &'a str,
        resource: Option<&'a str>,
    ) -> Result<JidParts<'a>, BadJid> {
        if domain.is_empty() {
            return Err(BadJid(description::DOMAIN_EMPTY));
        }
        if domain.len() > MAX_PART_SIZE {
            return Err(BadJid(description::DOMAIN_TOO_LONG));
        }
        // Remove final dot as per RFC 7622 section 3.2
        let domain = domain.strip_suffix('.').unwrap_or(domain);
        if domain.is_empty() {
            return Err(BadJid(description::DOMAIN_EMPTY));
        }
        if let Some(local) = local {
            if local.is_empty() {
                return Err(BadJid(description::LOCAL_EMPTY));
            }
            if local.len() > MAX_PART_SIZE {
                return Err(BadJid(description::LOCAL_TOO_LONG));
            }
        }
        if let Some(resource) = resource {
            check_resource(resource)?;
        }
        Ok(JidParts {
            local,
            domain,
            resource,
        })
    }
}

fn check_resource(resource: &str) -> Result<(), BadJid> {
    if resource.is_empty() {
        return Err(BadJid(description::RESOURCE_EMPTY));
    }
    if resource.len() > MAX_PART_SIZE {
        return Err(BadJid(description::RESOURCE_TOO_LONG));
    }
    Ok(())
}

#[derive(Debug)]
struct JidInner {
    full: String,
    at_pos: Option<usize>,
    slash_pos: Option<usize>,
}

/// The address of an entity in the XMPP protocol.
///
/// Each JID has three parts:
/// - Local part: Optionally identifies a local entity on the domain.
/// - Domain part: Identifies an XMPP server or a component.
/// - Resource part: Optionally identifies a service or an object.
///
/// More details can be found in [RFC7622](https://datatracker.ietf.org/doc/rfc7622/)
///
/// Values are immutable and share their storage, so cloning is cheap.
/// Parsed JIDs are kept in a process wide cache of the most recently used
/// 256 addresses.
#[derive(Debug, Clone)]
pub struct Jid {
    inner: Arc<JidInner>,
}

impl Jid {
    fn from_jid_parts(parts: &JidParts) -> Jid {
        let mut size = parts.domain.len();
        if let Some(local) = parts.local {
            size += local.len() + 1;
        }
        if let Some(resource) = parts.resource {
            size += resource.len() + 1;
        }
        let mut full = String::with_capacity(size);
        let mut at_pos = None;
        let mut slash_pos = None;
        if let Some(local) = parts.local {
            full.push_str(local);
            at_pos = Some(full.len());
            full.push('@');
        }
        full.push_str(parts.domain);
        if let Some(resource) = parts.resource {
            slash_pos = Some(full.len());
            full.push('/');
            full.push_str(resource);
        }
        Jid {
            inner: Arc::new(JidInner {
                full,
                at_pos,
                slash_pos,
            }),
        }
    }

    fn install(self) -> Jid {
        CACHE.lock().put(self.inner.full.clone(), self.clone());
        self
    }

    /// Create a JID from a string, or return the cached one.
    pub fn new(jid: &str) -> Result<Self, BadJid> {
        let mut cache = CACHE.lock();
        if let Some(cached) = cache.get(jid) {
            return Ok(cached.clone());
        }
        let parsed = Jid::from_jid_parts(&JidParts::new(jid)?);
        cache.put(parsed.inner.full.clone(), parsed.clone());
        Ok(parsed)
    }

    /// Create a JID from its parts.
    pub fn from_parts(
        domain: &str,
        local: Option<&str>,
        resource: Option<&str>,
    ) -> Result<Self, BadJid> {
        let parts = JidParts::checked(local, domain, resource)?;
        Ok(Jid::from_jid_parts(&parts).install())
    }

    /// Full form of the JID with all the components.
    pub fn full(&self) -> &str {
        &self.inner.full
    }

    pub fn as_str(&self) -> &str {
        &self.inner.full
    }

    fn bare_str(&self) -> &str {
        match self.inner.slash_pos {
            Some(pos) => &self.inner.full[..pos],
            None => &self.inner.full,
        }
    }

    /// Bare form of the JID without the resource part.
    pub fn bare(&self) -> Jid {
        if self.is_bare() {
            return self.clone();
        }
        Jid {
            inner: Arc::new(JidInner {
                full: self.bare_str().to_string(),
                at_pos: self.inner.at_pos,
                slash_pos: None,
            }),
        }
        .install()
    }

    /// Only the local part of the JID.
    pub fn localpart(&self) -> Option<&str> {
        self.inner.at_pos.map(|pos| &self.inner.full[..pos])
    }

    /// Only the domain part of the JID.
    pub fn domainpart(&self) -> &str {
        let start = match self.inner.at_pos {
            Some(pos) => pos + 1,
            None => 0,
        };
        let end = self.inner.slash_pos.unwrap_or(self.inner.full.len());
        &self.inner.full[start..end]
    }

    /// Only the resource part of the JID.
    pub fn resourcepart(&self) -> Option<&str> {
        self.inner.slash_pos.map(|pos| &self.inner.full[pos + 1..])
    }

    /// True if the JID does not contain a resource part.
    pub fn is_bare(&self) -> bool {
        self.inner.slash_pos.is_none()
    }

    /// Compares the local and domain parts only.
    pub fn equals_bare(&self, other: &Jid) -> bool {
        self.bare_str() == other.bare_str()
    }

    /// Creates another JID by overriding the resource part.
    pub fn with_resource(&self, resource: &str) -> Result<Jid, BadJid> {
        check_resource(resource)?;
        let bare = self.bare_str();
        let mut full = String::with_capacity(bare.len() + 1 + resource.len());
        full.push_str(bare);
        full.push('/');
        full.push_str(resource);
        Ok(Jid {
            inner: Arc::new(JidInner {
                full,
                at_pos: self.inner.at_pos,
                slash_pos: Some(bare.len()),
            }),
        }
        .install())
    }
}

pub(crate) fn cache_len() -> usize {
    CACHE.lock().len()
}

impl Display for Jid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.inner.full)
    }
}

impl FromStr for Jid {
    type Err = BadJid;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Jid::new(s)
    }
}

impl PartialEq for Jid {
    fn eq(&self, other: &Jid) -> bool {
        self.inner.full == other.inner.full
    }
}

impl Eq for Jid {}

impl PartialOrd for Jid {
    fn partial_cmp(&self, other: &Jid) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Jid {
    fn cmp(&self, other: &Jid) -> std::cmp::Ordering {
        self.inner.full.cmp(&other.inner.full)
    }
}

impl Hash for Jid {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.full.hash(state)
    }
}
