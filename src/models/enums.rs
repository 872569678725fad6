use crate::store::StoreError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = StoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(StoreError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(LogStatus {
    Upcoming => "upcoming",
    Taken => "taken",
    Skipped => "skipped",
});

impl LogStatus {
    /// Whether a dose in this status can still be acted on.
    pub fn is_actionable(&self) -> bool {
        matches!(self, LogStatus::Upcoming)
    }
}

/// Preparation lead time before an appointment. Persisted as minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrepLead {
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
    TwoHours,
    OneDay,
}

impl PrepLead {
    pub const ALL: [PrepLead; 5] = [
        PrepLead::FifteenMinutes,
        PrepLead::ThirtyMinutes,
        PrepLead::OneHour,
        PrepLead::TwoHours,
        PrepLead::OneDay,
    ];

    pub fn minutes(&self) -> u32 {
        match self {
            PrepLead::FifteenMinutes => 15,
            PrepLead::ThirtyMinutes => 30,
            PrepLead::OneHour => 60,
            PrepLead::TwoHours => 120,
            PrepLead::OneDay => 1440,
        }
    }

    pub fn from_minutes(minutes: i64) -> Result<Self, StoreError> {
        match minutes {
            15 => Ok(PrepLead::FifteenMinutes),
            30 => Ok(PrepLead::ThirtyMinutes),
            60 => Ok(PrepLead::OneHour),
            120 => Ok(PrepLead::TwoHours),
            1440 => Ok(PrepLead::OneDay),
            _ => Err(StoreError::InvalidEnum {
                field: "prep_lead".into(),
                value: minutes.to_string(),
            }),
        }
    }

    /// Picker label shown when choosing a lead time.
    pub fn label(&self) -> &'static str {
        match self {
            PrepLead::FifteenMinutes => "15 minutes",
            PrepLead::ThirtyMinutes => "30 minutes",
            PrepLead::OneHour => "1 hour",
            PrepLead::TwoHours => "2 hours",
            PrepLead::OneDay => "1 day",
        }
    }
}

impl Default for PrepLead {
    fn default() -> Self {
        PrepLead::OneHour
    }
}
