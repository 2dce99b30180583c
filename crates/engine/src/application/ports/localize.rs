//! Localization port - key to user-facing string, passthrough only.

#[cfg_attr(test, mockall::automock)]
pub trait LocalizePort: Send + Sync {
    fn localize(&self, key: &str) -> String;
}
