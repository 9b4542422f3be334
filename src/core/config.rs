use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub db_path: String,
    pub mail_api_url: String,
    pub mail_api_key: Option<String>,
    pub mail_from_address: String,
    pub mail_contact_address: String,
    pub mail_timeout_secs: u64,
    pub public_base_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let storage_path = env::var("SHAREFLOW_STORAGE_PATH").unwrap_or("./".to_string());
        let db_path = format!("{}/db", storage_path);
        let mail_api_url = env::var("SHAREFLOW_MAIL_API_URL")
            .unwrap_or_else(|_| "https://api.resend.com".to_string());
        // No key means the delivery side-channel is a no-op in this deployment
        let mail_api_key = env::var("SHAREFLOW_MAIL_API_KEY").ok();
        let mail_from_address = env::var("SHAREFLOW_MAIL_FROM")
            .unwrap_or_else(|_| "messages@mail.shareflow.app".to_string());
        let mail_contact_address = env::var("SHAREFLOW_MAIL_CONTACT")
            .unwrap_or_else(|_| "support@shareflow.app".to_string());
        let mail_timeout_secs = env::var("SHAREFLOW_MAIL_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);
        let public_base_url = env::var("SHAREFLOW_PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "https://app.shareflow.app".to_string());

        Self {
            db_path,
            mail_api_url,
            mail_api_key,
            mail_from_address,
            mail_contact_address,
            mail_timeout_secs,
            public_base_url,
        }
    }
}
