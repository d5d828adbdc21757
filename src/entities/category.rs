//! Category - the two parallel sub-hierarchies under a show.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::SiteError;

/// `asset` or `shot`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Asset,
    Shot,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Asset, Category::Shot];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Asset => "asset",
            Category::Shot => "shot",
        }
    }

    /// Display label for groups of this category
    pub fn group_label(&self) -> &'static str {
        match self {
            Category::Asset => "group",
            Category::Shot => "sequence",
        }
    }

    /// Display label for units of this category
    pub fn unit_label(&self) -> &'static str {
        match self {
            Category::Asset => "asset",
            Category::Shot => "shot",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = SiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asset" => Ok(Category::Asset),
            "shot" => Ok(Category::Shot),
            other => Err(SiteError::InvalidCategory(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_category() {
        assert_eq!("asset".parse::<Category>().unwrap(), Category::Asset);
        assert_eq!("shot".parse::<Category>().unwrap(), Category::Shot);
        let err = "sequence".parse::<Category>().unwrap_err();
        assert!(matches!(err, SiteError::InvalidCategory(ref c) if c == "sequence"));
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Category::Shot).unwrap();
        assert_eq!(json, "\"shot\"");
        let back: Category = serde_json::from_str("\"asset\"").unwrap();
        assert_eq!(back, Category::Asset);
    }
}
