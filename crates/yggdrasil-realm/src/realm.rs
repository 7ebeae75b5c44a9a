//! The realm catalog: the ten worlds of the tree and their fixed order.
//!
//! Every realm teaches one OWASP Top-10 (2025) category. Realms are ranked
//! by *order*, hardest-first: the journey starts at Niflheim (order 10) and
//! ends at Asgard (order 1).
//!
//! ```text
//! Niflheim(10) → Helheim(9) → Svartalfheim(8) → ... → Alfheim(2) → Asgard(1)
//! ```
//!
//! The catalog is a closed enum rather than a table of strings, so a realm
//! can never be misspelled once it has been parsed.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::RealmError;

// ---------------------------------------------------------------------------
// Realm
// ---------------------------------------------------------------------------

/// One of the ten realms.
///
/// Serialized as its lowercase slug (`"niflheim"`), which is also the path
/// segment used in `/realm/{name}/`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Realm {
    Niflheim,
    Helheim,
    Svartalfheim,
    Jotunheim,
    Muspelheim,
    Nidavellir,
    Vanaheim,
    Midgard,
    Alfheim,
    Asgard,
}

impl Realm {
    /// All realms in journey order (order 10 down to order 1).
    pub const ALL: [Realm; 10] = [
        Realm::Niflheim,
        Realm::Helheim,
        Realm::Svartalfheim,
        Realm::Jotunheim,
        Realm::Muspelheim,
        Realm::Nidavellir,
        Realm::Vanaheim,
        Realm::Midgard,
        Realm::Alfheim,
        Realm::Asgard,
    ];

    /// The realm every new traveller starts in.
    pub const ENTRY: Realm = Realm::Niflheim;

    /// The realm's difficulty order: 10 for Niflheim down to 1 for Asgard.
    pub fn order(self) -> u8 {
        // `ALL` is sorted by descending order, so the index maps directly.
        10 - self.index() as u8
    }

    /// Lowercase slug, e.g. `"svartalfheim"`.
    pub fn name(self) -> &'static str {
        match self {
            Realm::Niflheim => "niflheim",
            Realm::Helheim => "helheim",
            Realm::Svartalfheim => "svartalfheim",
            Realm::Jotunheim => "jotunheim",
            Realm::Muspelheim => "muspelheim",
            Realm::Nidavellir => "nidavellir",
            Realm::Vanaheim => "vanaheim",
            Realm::Midgard => "midgard",
            Realm::Alfheim => "alfheim",
            Realm::Asgard => "asgard",
        }
    }

    /// Uppercase tag as it appears inside a flag, e.g. `"SVARTALFHEIM"`.
    pub fn tag(self) -> String {
        self.name().to_ascii_uppercase()
    }

    /// Looks a realm up by its slug, ignoring ASCII case and surrounding
    /// whitespace. Tags and display names differ from the slug only in case,
    /// so they resolve too.
    pub fn from_name(name: &str) -> Result<Realm, RealmError> {
        let wanted = name.trim();
        Realm::ALL
            .into_iter()
            .find(|realm| realm.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| RealmError::UnknownRealm(wanted.to_string()))
    }

    /// Looks a realm up by the uppercase tag used inside flags.
    ///
    /// Unlike [`from_name`](Self::from_name) this is exact: `"helheim"` is
    /// not a tag.
    pub fn from_tag(tag: &str) -> Result<Realm, RealmError> {
        Realm::ALL
            .into_iter()
            .find(|realm| realm.tag() == tag)
            .ok_or_else(|| RealmError::UnknownRealm(tag.to_string()))
    }

    /// The realm unlocked by solving this one (order − 1).
    ///
    /// Returns `None` for Asgard: there is nothing after the final realm.
    pub fn next(self) -> Option<Realm> {
        Realm::ALL.get(self.index() + 1).copied()
    }

    /// Display and theming metadata.
    pub fn metadata(self) -> &'static RealmMetadata {
        &CATALOG[self.index()]
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Realm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// Colours, artwork, and the OWASP category a realm teaches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealmTheme {
    pub primary_color: &'static str,
    pub image: &'static str,
    pub category: &'static str,
}

/// Static description of a realm, shared by routing and the realm list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealmMetadata {
    pub display_name: &'static str,
    pub description: &'static str,
    pub theme: RealmTheme,
}

/// Indexed the same way as [`Realm::ALL`].
static CATALOG: [RealmMetadata; 10] = [
    RealmMetadata {
        display_name: "Niflheim",
        description: "Cryo-Stasis Facility - Exceptional Conditions",
        theme: RealmTheme {
            primary_color: "#60a5fa",
            image: "/assets/realms/niflheim.jpg",
            category: "A10:2025 Exceptional Conditions",
        },
    },
    RealmMetadata {
        display_name: "Helheim",
        description: "Memorial Forum - Logging & Alerting Failures",
        theme: RealmTheme {
            primary_color: "#6b7280",
            image: "/assets/realms/helheim.jpg",
            category: "A09:2025 Logging & Alerting Failures",
        },
    },
    RealmMetadata {
        display_name: "Svartalfheim",
        description: "Dwarven Forge - Software/Data Integrity",
        theme: RealmTheme {
            primary_color: "#78716c",
            image: "/assets/realms/svartalfheim.jpg",
            category: "A08:2025 Software/Data Integrity",
        },
    },
    RealmMetadata {
        display_name: "Jotunheim",
        description: "Ice Giant Stronghold - Authentication Failures",
        theme: RealmTheme {
            primary_color: "#38bdf8",
            image: "/assets/realms/jotunheim.jpg",
            category: "A07:2025 Authentication Failures",
        },
    },
    RealmMetadata {
        display_name: "Muspelheim",
        description: "Fire Realm Trading Post - Insecure Design",
        theme: RealmTheme {
            primary_color: "#f97316",
            image: "/assets/realms/muspelheim.jpg",
            category: "A06:2025 Insecure Design",
        },
    },
    RealmMetadata {
        display_name: "Nidavellir",
        description: "Mining Facility - Injection Vulnerabilities",
        theme: RealmTheme {
            primary_color: "#a16207",
            image: "/assets/realms/nidavellir.jpg",
            category: "A05:2025 Injection",
        },
    },
    RealmMetadata {
        display_name: "Vanaheim",
        description: "Merchant Realm - Cryptographic Failures",
        theme: RealmTheme {
            primary_color: "#10b981",
            image: "/assets/realms/vanaheim.jpg",
            category: "A04:2025 Cryptographic Failures",
        },
    },
    RealmMetadata {
        display_name: "Midgard",
        description: "Marketplace - Supply Chain Failures",
        theme: RealmTheme {
            primary_color: "#a855f7",
            image: "/assets/realms/midgard.jpg",
            category: "A03:2025 Supply Chain Failures",
        },
    },
    RealmMetadata {
        display_name: "Alfheim",
        description: "Cloud Realm - Security Misconfiguration",
        theme: RealmTheme {
            primary_color: "#3b82f6",
            image: "/assets/realms/alfheim.jpg",
            category: "A02:2025 Security Misconfiguration",
        },
    },
    RealmMetadata {
        display_name: "Asgard",
        description: "Golden Citadel - Broken Access Control",
        theme: RealmTheme {
            primary_color: "#eab308",
            image: "/assets/realms/asgard.jpg",
            category: "A01:2025 Broken Access Control",
        },
    },
];
