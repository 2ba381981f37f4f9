pub mod otp;
pub mod password;
pub mod token;
pub mod uploader;
