pub mod entities;
pub mod navigator;
pub mod params;
pub mod value_objects;
