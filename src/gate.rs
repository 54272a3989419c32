//! Per-application activation.
//!
//! The layer only rewrites geometry for applications whose self-reported
//! name contains an allow-listed entry. The decision is made once, when the
//! instance is created, and never revisited for that instance.

#![forbid(unsafe_code)]

/// Whether intercepted calls are transformed or passed straight through.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Activation {
    /// Pure passthrough.
    #[default]
    Inactive,
    /// Geometry is rewritten.
    Active,
}

impl Activation {
    pub fn is_active(self) -> bool {
        self == Self::Active
    }
}

/// Substrings identifying supported applications. Case-sensitive.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct AllowList {
    entries: &'static [&'static str],
}

impl AllowList {
    /// Sim racing titles known to render correctly with a clamped FOV.
    pub const SIM_RACING: Self = Self::new(&["iRacing", "AMS2", "rFactor2"]);

    pub const fn new(entries: &'static [&'static str]) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &'static [&'static str] {
        self.entries
    }

    /// First entry contained in `application_name`.
    pub fn matching_entry(&self, application_name: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .copied()
            .find(|entry| !entry.is_empty() && application_name.contains(entry))
    }

    /// Decide activation for an application.
    pub fn evaluate(&self, application_name: &str) -> Activation {
        match self.matching_entry(application_name) {
            Some(_) => Activation::Active,
            None => Activation::Inactive,
        }
    }
}

impl Default for AllowList {
    fn default() -> Self {
        Self::SIM_RACING
    }
}
