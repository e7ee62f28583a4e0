#[macro_use]
pub mod logger;

use hiro_system_kit::slog::Logger;

#[derive(Clone)]
pub struct Context {
    pub logger: Option<Logger>,
    pub tracer: bool,
}

impl Context {
    pub fn empty() -> Context {
        Context {
            logger: None,
            tracer: false,
        }
    }

    pub fn try_log<F>(&self, closure: F)
    where
        F: FnOnce(&Logger),
    {
        if let Some(ref logger) = self.logger {
            closure(logger)
        }
    }

    pub fn expect_logger(&self) -> &Logger {
        self.logger.as_ref().unwrap()
    }
}

/// Strips the `0x` prefix some producers put in front of hashes.
pub fn normalize_hash(hash: &str) -> String {
    hash.strip_prefix("0x").unwrap_or(hash).to_lowercase()
}

/// Block timestamps are received in seconds and served in milliseconds.
pub fn timestamp_to_millis(timestamp: u32) -> i64 {
    timestamp as i64 * 1000
}

#[cfg(test)]
mod test {
    use test_case::test_case;

    use super::normalize_hash;

    #[test_case("0x38c46a8bf7ec90bc7f6b797e7dc84baa97f4e5fd4286b92fe1b50176d03b18dc" => "38c46a8bf7ec90bc7f6b797e7dc84baa97f4e5fd4286b92fe1b50176d03b18dc".to_string(); "with prefix")]
    #[test_case("38C46A8BF7EC90BC7F6B797E7DC84BAA97F4E5FD4286B92FE1B50176D03B18DC" => "38c46a8bf7ec90bc7f6b797e7dc84baa97f4e5fd4286b92fe1b50176d03b18dc".to_string(); "uppercase")]
    fn normalizes_hashes(hash: &str) -> String {
        normalize_hash(hash)
    }
}
