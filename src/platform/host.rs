// LogScraper - platform/host.rs
//
// Name of the box we are running on; compared against the level -> box
// mapping to decide whether logs must be fetched remotely.

/// Host name of the current machine, or an empty string if it cannot be
/// determined (every level then counts as remote).
pub fn current_hostname() -> String {
    #[cfg(unix)]
    {
        match nix::unistd::gethostname() {
            Ok(name) => return name.to_string_lossy().into_owned(),
            Err(e) => {
                tracing::warn!(error = %e, "Could not determine host name");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Ok(name) = std::env::var("COMPUTERNAME") {
            return name;
        }
        tracing::warn!("COMPUTERNAME is not set; could not determine host name");
    }

    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hostname_is_stable() {
        assert_eq!(current_hostname(), current_hostname());
    }
}
