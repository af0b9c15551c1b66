//! Command: print version information.

/// The version reported by `dotfiles version`: the build-time
/// `DOTLINK_VERSION` if set, otherwise the crate version.
#[must_use]
pub fn version_string() -> &'static str {
    option_env!("DOTLINK_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the dotfiles version to stdout.
pub fn run() {
    println!("dotfiles {}", version_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version_string().is_empty());
    }
}
