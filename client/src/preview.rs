// Tracks which object URLs are still live. Each method hands back the URL
// that has just lost its owner, for the caller to revoke.
#[derive(Debug, Default)]
pub struct PreviewUrls {
    pending: Option<String>,
    shown: Option<String>,
}

impl PreviewUrls {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new read has started; any read still pending is abandoned.
    pub fn start(&mut self, url: String) -> Option<String> {
        self.pending.replace(url)
    }

    /// The pending read finished and its preview replaces the shown one.
    pub fn loaded(&mut self) -> Option<String> {
        match self.pending.take() {
            Some(url) => self.shown.replace(url),
            None => None,
        }
    }

    pub fn failed(&mut self) -> Option<String> {
        self.pending.take()
    }

    pub fn shown(&self) -> Option<&str> {
        self.shown.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loaded_preview_releases_the_previous_one() {
        let mut urls = PreviewUrls::new();
        assert_eq!(urls.start("blob:a".into()), None);
        assert_eq!(urls.loaded(), None);
        assert_eq!(urls.shown(), Some("blob:a"));

        assert_eq!(urls.start("blob:b".into()), None);
        assert_eq!(urls.loaded().as_deref(), Some("blob:a"));
        assert_eq!(urls.shown(), Some("blob:b"));
    }

    #[test]
    fn abandoned_read_releases_its_url() {
        let mut urls = PreviewUrls::new();
        urls.start("blob:a".into());
        assert_eq!(urls.start("blob:b".into()).as_deref(), Some("blob:a"));
        assert_eq!(urls.loaded(), None);
        assert_eq!(urls.shown(), Some("blob:b"));
    }

    #[test]
    fn failed_read_releases_only_its_own_url() {
        let mut urls = PreviewUrls::new();
        urls.start("blob:a".into());
        urls.loaded();
        urls.start("blob:b".into());
        assert_eq!(urls.failed().as_deref(), Some("blob:b"));
        assert_eq!(urls.failed(), None);
        assert_eq!(urls.shown(), Some("blob:a"));
    }
}
