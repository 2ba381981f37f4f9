pub mod inquirymodel;
pub mod propertymodel;
pub mod usermodel;
