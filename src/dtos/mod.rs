pub mod inquirydtos;
pub mod propertydtos;
pub mod userdtos;
