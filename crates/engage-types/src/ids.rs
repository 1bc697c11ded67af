use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_id!(
    /// A live client contract under management.
    EngagementId
);
string_id!(
    /// The client organization owning an engagement.
    ClientId
);
string_id!(
    /// An agency colleague (account manager, seller, team member).
    ColleagueId
);
string_id!(
    /// A service line inside an engagement.
    ServiceId
);
string_id!(
    /// A colleague-to-engagement team assignment.
    AssignmentId
);
string_id!(
    /// A proposed modification request.
    RequestId
);
string_id!(
    /// A commissionable item (extra work or engagement service).
    ItemId
);
string_id!(
    /// An applied-modification history entry.
    EntryId
);

impl RequestId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl EntryId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}
