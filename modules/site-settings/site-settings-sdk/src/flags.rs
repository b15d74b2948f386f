//! Feature flags carried by the site settings record.
//!
//! Each flag is one boolean field of [`SiteSettings`](crate::SiteSettings).
//! Four of them are *dependent*: their effective value is forced off while the
//! site runs in portfolio mode. The catalog order matches the admin panel.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// One boolean field of the site settings record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SettingsFlag {
    /// Master switch: marketplace when on, portfolio when off.
    MarketplaceMode,
    PaymentProcessingEnabled,
    AutomaticDeliveryEnabled,
    ShowPricesOnProjects,
    EmailNotificationsEnabled,
    OrderAutoConfirmation,
}

impl SettingsFlag {
    /// Number of flags in the record.
    pub const COUNT: usize = 6;

    /// Every flag, in panel order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::MarketplaceMode,
        Self::PaymentProcessingEnabled,
        Self::AutomaticDeliveryEnabled,
        Self::ShowPricesOnProjects,
        Self::EmailNotificationsEnabled,
        Self::OrderAutoConfirmation,
    ];

    /// Flags whose effective value is gated by marketplace mode.
    pub const DEPENDENT: [Self; 4] = [
        Self::PaymentProcessingEnabled,
        Self::AutomaticDeliveryEnabled,
        Self::ShowPricesOnProjects,
        Self::OrderAutoConfirmation,
    ];

    /// Whether the flag is suppressed while the site is in portfolio mode.
    #[must_use]
    pub const fn is_dependent(self) -> bool {
        matches!(
            self,
            Self::PaymentProcessingEnabled
                | Self::AutomaticDeliveryEnabled
                | Self::ShowPricesOnProjects
                | Self::OrderAutoConfirmation
        )
    }

    /// Position of the flag in [`SettingsFlag::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Field name used by the settings HTTP API.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::MarketplaceMode => "marketplaceMode",
            Self::PaymentProcessingEnabled => "paymentProcessingEnabled",
            Self::AutomaticDeliveryEnabled => "automaticDeliveryEnabled",
            Self::ShowPricesOnProjects => "showPricesOnProjects",
            Self::EmailNotificationsEnabled => "emailNotificationsEnabled",
            Self::OrderAutoConfirmation => "orderAutoConfirmation",
        }
    }

    /// Human-facing label and description for settings surfaces.
    #[must_use]
    pub const fn descriptor(self) -> FlagDescriptor {
        let (title, description) = match self {
            Self::MarketplaceMode => (
                "Marketplace Mode",
                "Enable full marketplace functionality with payments, orders, and automatic delivery",
            ),
            Self::PaymentProcessingEnabled => (
                "Payment Processing",
                "Enable checkout and payment functionality",
            ),
            Self::AutomaticDeliveryEnabled => (
                "Automatic Document Delivery",
                "Automatically send documents after successful payment",
            ),
            Self::ShowPricesOnProjects => (
                "Show Prices on Projects",
                "Display pricing information on project cards",
            ),
            Self::EmailNotificationsEnabled => (
                "Email Notifications",
                "Send order confirmations and delivery emails",
            ),
            Self::OrderAutoConfirmation => (
                "Order Auto-Confirmation",
                "Automatically confirm orders after payment",
            ),
        };
        FlagDescriptor {
            flag: self,
            title,
            description,
            gated: self.is_dependent(),
        }
    }
}

impl fmt::Display for SettingsFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Returned when a flag name does not match any known flag.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown settings flag '{name}'")]
pub struct UnknownFlagError {
    pub name: String,
}

impl FromStr for SettingsFlag {
    type Err = UnknownFlagError;

    /// Accepts the wire name (`showPricesOnProjects`) as well as its
    /// `snake_case` and `kebab-case` spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|flag| {
                let wire = flag.wire_name();
                s == wire || s == separated(wire, '_') || s == separated(wire, '-')
            })
            .ok_or_else(|| UnknownFlagError { name: s.to_owned() })
    }
}

/// `showPricesOnProjects` with `sep` = `_` becomes `show_prices_on_projects`.
fn separated(camel: &str, sep: char) -> String {
    let mut out = String::with_capacity(camel.len() + 4);
    for c in camel.chars() {
        if c.is_ascii_uppercase() {
            out.push(sep);
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Static description of a flag as shown on the settings panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagDescriptor {
    pub flag: SettingsFlag,
    pub title: &'static str,
    pub description: &'static str,
    /// Whether the flag is gated by marketplace mode.
    pub gated: bool,
}
