pub mod fuel_type;
