/// Single-use credentials for the download service's search form.
///
/// Minted fresh for every resolution and never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadToken {
    pub session_cookie: String,
    pub csrf_token: String,
}

impl DownloadToken {
    pub fn cookie_header(&self) -> String {
        format!("PHPSESSID={}", self.session_cookie)
    }
}
