//! # Credentials and Connect Parameters
//!
//! `CredentialRecord` is owned by an external credential store and is only
//! ever read here. `ConnectRequest` is what the runtime hands to the network
//! stack when it applies a stored record.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Link security of a stored network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SecurityType {
    /// Open network, no secret.
    #[default]
    None,
    /// WPA2-PSK.
    Psk,
    /// WPA2-PSK-SHA256.
    PskSha256,
    /// WPA3-SAE.
    Sae,
    /// WPA2/WPA3 transition mode.
    Wpa3Auto,
}

impl SecurityType {
    /// Whether connecting requires secret material.
    #[must_use]
    pub fn requires_secret(&self) -> bool {
        !matches!(self, Self::None)
    }
}

bitflags! {
    /// Per-record flags kept by the credential store.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CredentialFlags: u32 {
        /// Prefer the 5 GHz band.
        const BAND_5GHZ = 1 << 0;
        /// User-marked favourite network.
        const FAVORITE = 1 << 1;
    }
}

/// A stored network credential.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    /// Network name.
    pub ssid: String,
    /// Link security.
    pub security: SecurityType,
    /// Passphrase, if the store holds one.
    pub secret: Option<String>,
    /// Store flags.
    pub flags: CredentialFlags,
}

impl CredentialRecord {
    /// Record for an open network.
    pub fn open(ssid: impl Into<String>) -> Self {
        Self {
            ssid: ssid.into(),
            security: SecurityType::None,
            secret: None,
            flags: CredentialFlags::empty(),
        }
    }

    /// Record for a passphrase-protected network.
    pub fn with_secret(
        ssid: impl Into<String>,
        security: SecurityType,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            ssid: ssid.into(),
            security,
            secret: Some(secret.into()),
            flags: CredentialFlags::empty(),
        }
    }

    #[must_use]
    pub fn flags(mut self, flags: CredentialFlags) -> Self {
        self.flags = flags;
        self
    }
}

// Secrets stay out of logs.
impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("ssid", &self.ssid)
            .field("security", &self.security)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("flags", &self.flags)
            .finish()
    }
}

/// Frequency band requested from the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrequencyBand {
    Band2_4GHz,
    Band5GHz,
}

/// Channel selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Channel {
    /// Let the stack pick.
    Any,
    Fixed(u16),
}

/// Management frame protection policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MfpPolicy {
    Disabled,
    Optional,
    Required,
}

/// Parameters for an explicit connect request.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectRequest {
    pub ssid: String,
    pub security: SecurityType,
    /// Only present when `security` requires a secret.
    pub psk: Option<String>,
    pub band: FrequencyBand,
    pub channel: Channel,
    pub mfp: MfpPolicy,
}

impl ConnectRequest {
    /// Build the connect request for a stored record.
    ///
    /// The secret is dropped for open networks, the band follows the
    /// `BAND_5GHZ` flag, the channel is left to the stack and MFP is optional.
    #[must_use]
    pub fn from_record(record: &CredentialRecord) -> Self {
        let psk = if record.security.requires_secret() {
            record.secret.clone()
        } else {
            None
        };
        let band = if record.flags.contains(CredentialFlags::BAND_5GHZ) {
            FrequencyBand::Band5GHz
        } else {
            FrequencyBand::Band2_4GHz
        };

        Self {
            ssid: record.ssid.clone(),
            security: record.security,
            psk,
            band,
            channel: Channel::Any,
            mfp: MfpPolicy::Optional,
        }
    }
}

impl fmt::Debug for ConnectRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectRequest")
            .field("ssid", &self.ssid)
            .field("security", &self.security)
            .field("psk", &self.psk.as_ref().map(|_| "<redacted>"))
            .field("band", &self.band)
            .field("channel", &self.channel)
            .field("mfp", &self.mfp)
            .finish()
    }
}
