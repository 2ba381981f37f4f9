pub mod db;
pub mod inquirydb;
pub mod propertydb;
pub mod userdb;
