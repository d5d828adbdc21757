//! Directory manifest entries: relative name + 4-digit permission.

use crate::error::{Result, SiteError};

/// Permission string of exactly 4 octal digits: `<special><owner><group><other>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Perm {
    digits: [u8; 4],
}

impl Perm {
    pub fn parse(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 4 {
            return Err(SiteError::InvalidPerm(s.to_string()));
        }
        let mut digits = [0u8; 4];
        for (slot, b) in digits.iter_mut().zip(bytes) {
            if !(b'0'..=b'7').contains(b) {
                return Err(SiteError::InvalidPerm(s.to_string()));
            }
            *slot = b - b'0';
        }
        Ok(Self { digits })
    }

    /// Numeric mode, e.g. `2775` -> `0o2775`
    pub fn mode(&self) -> u32 {
        self.digits.iter().fold(0u32, |acc, d| acc * 8 + *d as u32)
    }

    /// Leading special-bit digit (2 = setgid)
    pub fn special(&self) -> u8 {
        self.digits[0]
    }

    /// True when the owner/group/other bits are `775` or `777`
    pub fn group_writable(&self) -> bool {
        matches!(&self.digits[1..], [7, 7, 5] | [7, 7, 7])
    }

    /// Setgid: children inherit the group
    pub fn inherits(&self) -> bool {
        self.special() == 2
    }
}

impl std::fmt::Display for Perm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for d in self.digits {
            write!(f, "{}", d)?;
        }
        Ok(())
    }
}

/// One subdirectory in an entity's manifest.
///
/// An empty `name` means the entity directory itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub perm: Perm,
}

impl DirEntry {
    pub fn new(name: &str, perm: &str) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            perm: Perm::parse(perm)?,
        })
    }
}

/// Build a manifest from `(name, perm)` literals
pub fn manifest(entries: &[(&str, &str)]) -> Result<Vec<DirEntry>> {
    entries.iter().map(|(n, p)| DirEntry::new(n, p)).collect()
}
