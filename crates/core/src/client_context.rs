//! Client-type and client-region multipliers.
//!
//! Both dimensions are closed enums; the context multiplier is the product
//! of the two dimension multipliers.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Client type
// ---------------------------------------------------------------------------

/// The kind of organization the freelancer is billing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientType {
    Startup,
    Sme,
    Corporate,
    Ngo,
    Government,
}

impl ClientType {
    /// Parse a client-type string from the database or client input.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "startup" => Ok(Self::Startup),
            "sme" => Ok(Self::Sme),
            "corporate" => Ok(Self::Corporate),
            "ngo" => Ok(Self::Ngo),
            "government" => Ok(Self::Government),
            _ => Err(CoreError::Validation(format!(
                "Invalid client type '{s}'. Must be one of: startup, sme, corporate, ngo, government"
            ))),
        }
    }

    /// Convert to a database-compatible string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Sme => "sme",
            Self::Corporate => "corporate",
            Self::Ngo => "ngo",
            Self::Government => "government",
        }
    }

    /// Rate multiplier for this client type.
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Startup => 0.9,
            Self::Sme => 1.0,
            Self::Corporate => 1.2,
            Self::Ngo => 0.85,
            Self::Government => 1.1,
        }
    }
}

// ---------------------------------------------------------------------------
// Client region
// ---------------------------------------------------------------------------

/// Geographic reach of the client relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientRegion {
    Local,
    Regional,
    Global,
}

impl ClientRegion {
    /// Parse a region string from the database or client input.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "local" => Ok(Self::Local),
            "regional" => Ok(Self::Regional),
            "global" => Ok(Self::Global),
            _ => Err(CoreError::Validation(format!(
                "Invalid client region '{s}'. Must be one of: local, regional, global"
            ))),
        }
    }

    /// Convert to a database-compatible string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Regional => "regional",
            Self::Global => "global",
        }
    }

    /// Rate multiplier for this region.
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Local => 1.0,
            Self::Regional => 1.15,
            Self::Global => 1.3,
        }
    }
}

// ---------------------------------------------------------------------------
// Combined context
// ---------------------------------------------------------------------------

/// A validated client context producing one multiplicative factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClientContext {
    pub client_type: ClientType,
    pub client_region: ClientRegion,
}

impl ClientContext {
    pub fn new(client_type: ClientType, client_region: ClientRegion) -> Self {
        Self {
            client_type,
            client_region,
        }
    }

    /// Parse a context from raw strings, validating both dimensions.
    pub fn from_strings(client_type: &str, client_region: &str) -> Result<Self, CoreError> {
        Ok(Self {
            client_type: ClientType::from_str_db(client_type)?,
            client_region: ClientRegion::from_str_db(client_region)?,
        })
    }

    /// Combined context multiplier: type multiplier × region multiplier.
    pub fn multiplier(&self) -> f64 {
        self.client_type.multiplier() * self.client_region.multiplier()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_multipliers() {
        assert_eq!(ClientType::Startup.multiplier(), 0.9);
        assert_eq!(ClientType::Sme.multiplier(), 1.0);
        assert_eq!(ClientType::Corporate.multiplier(), 1.2);
        assert_eq!(ClientType::Ngo.multiplier(), 0.85);
        assert_eq!(ClientType::Government.multiplier(), 1.1);
    }

    #[test]
    fn region_multipliers() {
        assert_eq!(ClientRegion::Local.multiplier(), 1.0);
        assert_eq!(ClientRegion::Regional.multiplier(), 1.15);
        assert_eq!(ClientRegion::Global.multiplier(), 1.3);
    }

    #[test]
    fn context_multiplier_is_product() {
        let ctx = ClientContext::new(ClientType::Corporate, ClientRegion::Global);
        assert!((ctx.multiplier() - 1.56).abs() < 1e-9);
    }

    #[test]
    fn from_strings_validates_both_dimensions() {
        assert!(ClientContext::from_strings("corporate", "global").is_ok());
        assert!(ClientContext::from_strings("megacorp", "global").is_err());
        assert!(ClientContext::from_strings("corporate", "interstellar").is_err());
    }

    #[test]
    fn parse_roundtrip() {
        for t in [
            ClientType::Startup,
            ClientType::Sme,
            ClientType::Corporate,
            ClientType::Ngo,
            ClientType::Government,
        ] {
            assert_eq!(ClientType::from_str_db(t.as_str()).unwrap(), t);
        }
        for r in [
            ClientRegion::Local,
            ClientRegion::Regional,
            ClientRegion::Global,
        ] {
            assert_eq!(ClientRegion::from_str_db(r.as_str()).unwrap(), r);
        }
    }
}
