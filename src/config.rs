#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_maxage: i64,
    pub jwt_refresh_maxage: i64,
    pub port: u16,
    pub frontend_origins: Vec<String>,
    // Email service configuration
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub smtp_from: String,
    // Media hosting configuration
    pub media_upload_url: String,
    pub media_api_key: String,
    pub media_folder: String,
}

impl Config {
    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let jwt_secret = std::env::var("JWT_SECRET_KEY").expect("JWT_SECRET_KEY must be set");
        let jwt_maxage = std::env::var("JWT_MAXAGE")
            .unwrap_or_else(|_| "60".to_string());
        let jwt_refresh_maxage = std::env::var("JWT_REFRESH_MAXAGE")
            .unwrap_or_else(|_| "14400".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".to_string());
        let frontend_origins = std::env::var("FRONTEND_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        // Email service configuration (with defaults)
        let smtp_host = std::env::var("SMTP_HOST")
            .unwrap_or_else(|_| "localhost".to_string());
        let smtp_port = std::env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string());
        let smtp_username = std::env::var("SMTP_USERNAME")
            .unwrap_or_else(|_| "".to_string());
        let smtp_password = std::env::var("SMTP_PASSWORD")
            .unwrap_or_else(|_| "".to_string());
        let smtp_from = std::env::var("SMTP_FROM")
            .unwrap_or_else(|_| "RentNest <no-reply@rentnest.app>".to_string());

        // Media hosting configuration
        let media_upload_url =
            std::env::var("MEDIA_UPLOAD_URL").expect("MEDIA_UPLOAD_URL must be set");
        let media_api_key = std::env::var("MEDIA_API_KEY")
            .unwrap_or_else(|_| "".to_string());
        let media_folder = std::env::var("MEDIA_UPLOAD_FOLDER")
            .unwrap_or_else(|_| "real-estate".to_string());

        Config {
            database_url,
            jwt_secret,
            jwt_maxage: jwt_maxage.parse::<i64>().expect("JWT_MAXAGE must be a number"),
            jwt_refresh_maxage: jwt_refresh_maxage
                .parse::<i64>()
                .expect("JWT_REFRESH_MAXAGE must be a number"),
            port: port.parse::<u16>().expect("PORT must be a number"),
            frontend_origins: frontend_origins
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
            smtp_host,
            smtp_port: smtp_port.parse::<u16>().expect("SMTP_PORT must be a number"),
            smtp_username,
            smtp_password,
            smtp_from,
            media_upload_url,
            media_api_key,
            media_folder,
        }
    }
}
