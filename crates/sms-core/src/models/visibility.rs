//! Visibility of inventory entities.

use serde::{Deserialize, Serialize};

/// Who may see an entity.
///
/// `Private` entities are only visible to their creator, `Internal`
/// ones to every authenticated user and `Public` ones to anybody.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Visibility {
    Private,
    #[default]
    Internal,
    Public,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "Private",
            Self::Internal => "Internal",
            Self::Public => "Public",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Private" => Some(Self::Private),
            "Internal" => Some(Self::Internal),
            "Public" => Some(Self::Public),
            _ => None,
        }
    }
}
