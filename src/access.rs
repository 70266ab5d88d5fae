//! Roles, capabilities and the per-request session context.
//!
//! Row-level security in the backend is the authority on who may touch
//! which rows. The checks here only decide what the service offers.

use crate::constants::{SHOWS_PUBLIC_VIEW, SHOWS_TABLE};
use crate::error::{Result, ShowsError};
use crate::shows::Act;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
    Artist,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ViewShows,
    SeeMoney,
    CreateShow,
    EditShow,
    DeleteShow,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Capability::ViewShows => "view shows",
            Capability::SeeMoney => "see money",
            Capability::CreateShow => "create shows",
            Capability::EditShow => "edit shows",
            Capability::DeleteShow => "delete shows",
        };
        f.write_str(label)
    }
}

impl Role {
    pub fn can(self, capability: Capability) -> bool {
        use Capability::*;
        match self {
            Role::Admin => true,
            // Staff manage logistics but never see fees, and cannot open new bookings.
            Role::Staff => matches!(capability, ViewShows | EditShow | DeleteShow),
            Role::Artist => matches!(capability, ViewShows | SeeMoney),
        }
    }

    pub fn capabilities(self) -> Vec<Capability> {
        use Capability::*;
        [ViewShows, SeeMoney, CreateShow, EditShow, DeleteShow]
            .into_iter()
            .filter(|c| self.can(*c))
            .collect()
    }
}

/// Where a role reads shows from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowSource {
    /// `shows`, money columns included.
    Full,
    /// `shows_public`, money columns excluded.
    Public,
}

impl ShowSource {
    pub fn for_role(role: Role) -> Self {
        if role.can(Capability::SeeMoney) {
            ShowSource::Full
        } else {
            ShowSource::Public
        }
    }

    pub fn collection(self) -> &'static str {
        match self {
            ShowSource::Full => SHOWS_TABLE,
            ShowSource::Public => SHOWS_PUBLIC_VIEW,
        }
    }

    pub fn includes_money(self) -> bool {
        matches!(self, ShowSource::Full)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub role: Role,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "crate::shows::loose_enum")]
    pub artist_scope: Option<Act>,
}

/// Explicit per-request context: who is calling and with which token.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub access_token: String,
    pub profile: Profile,
}

impl Session {
    pub fn role(&self) -> Role {
        self.profile.role
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.profile.role.can(capability)
    }

    pub fn require(&self, capability: Capability) -> Result<()> {
        if self.can(capability) {
            Ok(())
        } else {
            Err(ShowsError::Forbidden(capability))
        }
    }

    pub fn show_source(&self) -> ShowSource {
        ShowSource::for_role(self.profile.role)
    }
}
