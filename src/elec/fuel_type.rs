// Fuel type names as reported by the EIA daily fuel type data
// https://www.eia.gov/opendata/browser/electricity/rto/daily-fuel-type-data

use std::fmt;

pub const RENEWABLES: &str = "Renewables";
pub const FOSSIL_FUELS: &str = "Fossil Fuels";
pub const TOTAL: &str = "Total";

pub const RENEWABLE_TYPES: [&str; 6] = [
    "Solar",
    "Wind",
    "Hydro",
    "Geothermal",
    "Solar with integrated battery storage",
    "Wind with integrated battery storage",
];

pub const FOSSIL_FUEL_TYPES: [&str; 3] = ["Coal", "Natural Gas", "Petroleum"];

/// Types that count towards the total generation.  Other, unknown and
/// storage types are left out.
pub fn is_valid_generation_type(type_name: &str) -> bool {
    type_name == "Nuclear" || is_renewable(type_name) || is_fossil_fuel(type_name)
}

pub fn is_renewable(type_name: &str) -> bool {
    RENEWABLE_TYPES.contains(&type_name)
}

pub fn is_fossil_fuel(type_name: &str) -> bool {
    FOSSIL_FUEL_TYPES.contains(&type_name)
}

/// The groups shown in the daily mix, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayGroup {
    Renewables,
    FossilFuels,
    Nuclear,
    Solar,
    Wind,
    Hydro,
    NaturalGas,
    Coal,
    Petroleum,
}

impl DisplayGroup {
    pub const ALL: [DisplayGroup; 9] = [
        DisplayGroup::Renewables,
        DisplayGroup::FossilFuels,
        DisplayGroup::Nuclear,
        DisplayGroup::Solar,
        DisplayGroup::Wind,
        DisplayGroup::Hydro,
        DisplayGroup::NaturalGas,
        DisplayGroup::Coal,
        DisplayGroup::Petroleum,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DisplayGroup::Renewables => RENEWABLES,
            DisplayGroup::FossilFuels => FOSSIL_FUELS,
            DisplayGroup::Nuclear => "Nuclear",
            DisplayGroup::Solar => "Solar",
            DisplayGroup::Wind => "Wind",
            DisplayGroup::Hydro => "Hydro",
            DisplayGroup::NaturalGas => "Natural Gas",
            DisplayGroup::Coal => "Coal",
            DisplayGroup::Petroleum => "Petroleum",
        }
    }

    /// Type names that add up to this group.
    pub fn members(&self) -> &'static [&'static str] {
        match self {
            DisplayGroup::Renewables => &[RENEWABLES],
            DisplayGroup::FossilFuels => &[FOSSIL_FUELS],
            DisplayGroup::Nuclear => &["Nuclear"],
            DisplayGroup::Solar => &["Solar", "Solar with integrated battery storage"],
            DisplayGroup::Wind => &["Wind", "Wind with integrated battery storage"],
            DisplayGroup::Hydro => &["Hydro"],
            DisplayGroup::NaturalGas => &["Natural Gas"],
            DisplayGroup::Coal => &["Coal"],
            DisplayGroup::Petroleum => &["Petroleum"],
        }
    }

    /// Key of the group in the JSON artifact, e.g. `fossil_fuels`.
    pub fn key(&self) -> String {
        self.name().to_lowercase().replace(' ', "_")
    }
}

impl fmt::Display for DisplayGroup {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
