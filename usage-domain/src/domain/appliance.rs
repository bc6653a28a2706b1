use std::fmt;

/// Appliances tracked in the usage table.
///
/// The catalog order is fixed: it is the column order of `UsageRecord::usage`
/// and the order used when a response lists appliances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Appliance {
    #[cfg_attr(feature = "serde", serde(rename = "AC"))]
    Ac,
    Fridge,
    Lights,
    Fan,
    #[cfg_attr(feature = "serde", serde(rename = "Washing Machine"))]
    WashingMachine,
    #[cfg_attr(feature = "serde", serde(rename = "TV"))]
    Tv,
    Microwave,
    Oven,
    Dishwasher,
    #[cfg_attr(feature = "serde", serde(rename = "Water Heater"))]
    WaterHeater,
    Dryer,
    Computer,
    Motor,
    #[cfg_attr(feature = "serde", serde(rename = "Sound System"))]
    SoundSystem,
    #[cfg_attr(feature = "serde", serde(rename = "Electric Stove"))]
    ElectricStove,
    Refrigerator,
    Freezer,
    #[cfg_attr(feature = "serde", serde(rename = "Air Purifier"))]
    AirPurifier,
    Humidifier,
    Dehumidifier,
}

impl Appliance {
    pub const COUNT: usize = 20;

    pub const ALL: [Appliance; Self::COUNT] = [
        Appliance::Ac,
        Appliance::Fridge,
        Appliance::Lights,
        Appliance::Fan,
        Appliance::WashingMachine,
        Appliance::Tv,
        Appliance::Microwave,
        Appliance::Oven,
        Appliance::Dishwasher,
        Appliance::WaterHeater,
        Appliance::Dryer,
        Appliance::Computer,
        Appliance::Motor,
        Appliance::SoundSystem,
        Appliance::ElectricStove,
        Appliance::Refrigerator,
        Appliance::Freezer,
        Appliance::AirPurifier,
        Appliance::Humidifier,
        Appliance::Dehumidifier,
    ];

    /// Name shown in the dashboard and used as the key in API payloads.
    pub fn display_name(self) -> &'static str {
        match self {
            Appliance::Ac => "AC",
            Appliance::Fridge => "Fridge",
            Appliance::Lights => "Lights",
            Appliance::Fan => "Fan",
            Appliance::WashingMachine => "Washing Machine",
            Appliance::Tv => "TV",
            Appliance::Microwave => "Microwave",
            Appliance::Oven => "Oven",
            Appliance::Dishwasher => "Dishwasher",
            Appliance::WaterHeater => "Water Heater",
            Appliance::Dryer => "Dryer",
            Appliance::Computer => "Computer",
            Appliance::Motor => "Motor",
            Appliance::SoundSystem => "Sound System",
            Appliance::ElectricStove => "Electric Stove",
            Appliance::Refrigerator => "Refrigerator",
            Appliance::Freezer => "Freezer",
            Appliance::AirPurifier => "Air Purifier",
            Appliance::Humidifier => "Humidifier",
            Appliance::Dehumidifier => "Dehumidifier",
        }
    }

    /// Column holding this appliance's readings in the usage table.
    pub fn column(self) -> &'static str {
        match self {
            Appliance::Ac => "ac",
            Appliance::Fridge => "fridge",
            Appliance::Lights => "lights",
            Appliance::Fan => "fans",
            Appliance::WashingMachine => "washing_machine",
            Appliance::Tv => "tv",
            Appliance::Microwave => "microwave",
            Appliance::Oven => "oven",
            Appliance::Dishwasher => "dishwasher",
            Appliance::WaterHeater => "water_heater",
            Appliance::Dryer => "dryer",
            Appliance::Computer => "computer",
            Appliance::Motor => "motor",
            Appliance::SoundSystem => "sound_system",
            Appliance::ElectricStove => "stove",
            Appliance::Refrigerator => "refrigerator",
            Appliance::Freezer => "freezer",
            Appliance::AirPurifier => "air_purifier",
            Appliance::Humidifier => "humidifier",
            Appliance::Dehumidifier => "dehumidifier",
        }
    }

    /// Position in `ALL`, and therefore in `UsageRecord::usage`.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Stem of the model artifact file, e.g. `washing_machine` for "Washing Machine".
    pub fn model_slug(self) -> String {
        self.display_name().to_lowercase().replace(' ', "_")
    }

    /// Exact, case-sensitive lookup by display name.
    pub fn from_display_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.display_name() == name)
    }
}

impl fmt::Display for Appliance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
