//! Bookable resource (catalog entry)

use chrono::{DateTime, Utc};

/// What kind of unit a resource is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    ParkingSpace,
    Charger,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ParkingSpace => "parking_space",
            Self::Charger => "charger",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "parking_space" => Some(Self::ParkingSpace),
            "charger" => Some(Self::Charger),
            _ => None,
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A parking space or charger that reservations point at.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub id: String,
    pub kind: ResourceKind,
    pub name: Option<String>,
    /// Horizontal map position, `0.0..=1.0`
    pub x: f64,
    /// Vertical map position, `0.0..=1.0`
    pub y: f64,
    pub created_at: DateTime<Utc>,
}

impl Resource {
    pub fn new(id: impl Into<String>, kind: ResourceKind, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            kind,
            name: None,
            x,
            y,
            created_at: Utc::now(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Campus parking layout: `(space id, x, y)`.
pub const DEFAULT_PARKING_LAYOUT: &[(&str, f64, f64)] = &[
    ("A1", 0.4, 0.5),
    ("A2", 0.6, 0.3),
    ("A3", 0.8, 0.7),
    ("A4", 0.2, 0.2),
    ("A5", 0.3, 0.8),
    ("A6", 0.7, 0.4),
    ("A7", 0.9, 0.9),
    ("A8", 0.1, 0.6),
    ("A9", 0.5, 0.1),
    ("A10", 0.8, 0.2),
    ("A11", 0.2, 0.9),
    ("A12", 0.6, 0.6),
    ("A13", 0.4, 0.2),
    ("B1", 0.5, 0.4),
    ("B2", 0.3, 0.2),
    ("B3", 0.7, 0.8),
    ("B4", 0.2, 0.3),
    ("B5", 0.8, 0.6),
    ("B6", 0.4, 0.8),
    ("B7", 0.6, 0.1),
    ("B8", 0.1, 0.7),
    ("B9", 0.9, 0.4),
    ("B10", 0.8, 0.1),
    ("B11", 0.3, 0.9),
    ("B12", 0.7, 0.6),
    ("C1", 0.4, 0.6),
    ("C2", 0.6, 0.2),
    ("C3", 0.8, 0.8),
    ("C4", 0.2, 0.4),
    ("C5", 0.3, 0.7),
    ("C6", 0.7, 0.5),
    ("C7", 0.9, 0.2),
    ("C8", 0.1, 0.8),
    ("C9", 0.5, 0.3),
    ("C10", 0.8, 0.3),
    ("C11", 0.2, 0.8),
    ("C12", 0.6, 0.7),
];

/// Resources for [`DEFAULT_PARKING_LAYOUT`].
pub fn default_catalog() -> Vec<Resource> {
    DEFAULT_PARKING_LAYOUT
        .iter()
        .map(|(id, x, y)| Resource::new(*id, ResourceKind::ParkingSpace, *x, *y))
        .collect()
}
