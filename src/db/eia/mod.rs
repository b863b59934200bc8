pub mod daily_fuel_type;
