use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Tenancy and lock boundary: every mutation is scoped to one workshop.
    WorkshopId
);
string_id!(
    /// Opaque reference into the external vehicle directory.
    VehicleId
);
string_id!(ClientId);
string_id!(TechnicianId);
string_id!(
    /// Handle of a photo already uploaded to media storage. Bytes never pass through here.
    PhotoHandle
);

/// Denormalized display fields copied from the vehicle directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleSnapshot {
    pub vehicle_id: VehicleId,
    pub brand: String,
    pub model: String,
    pub year: u16,
    pub plate: String,
    pub mileage: u32,
    #[serde(default)]
    pub color: Option<String>,
}

impl VehicleSnapshot {
    pub fn display_name(&self) -> String {
        format!("{} {} {} ({})", self.brand, self.model, self.year, self.plate)
    }
}
