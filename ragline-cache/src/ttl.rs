//! Per-intent cache TTLs.

use ragline_core::types::Intent;

const DEFAULT_TTL: u64 = 900;
const STATUS_TTL: u64 = 180;
const GENERAL_TTL: u64 = 600;
const EXPLAIN_TTL: u64 = 600;
const CODE_TTL: u64 = 90;

/// Per-intent TTL (seconds), with a global default for intents not
/// otherwise configured (currently only `config`, which falls through to
/// the default).
#[derive(Debug, Clone, Copy)]
pub struct TtlPolicy {
    /// TTL for `Intent::Status`.
    pub status: u64,
    /// TTL for `Intent::General`.
    pub general: u64,
    /// TTL for `Intent::Explain`.
    pub explain: u64,
    /// TTL for `Intent::Code`.
    pub code: u64,
    /// TTL for any intent without a dedicated field.
    pub default: u64,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            status: STATUS_TTL,
            general: GENERAL_TTL,
            explain: EXPLAIN_TTL,
            code: CODE_TTL,
            default: DEFAULT_TTL,
        }
    }
}

impl TtlPolicy {
    /// The TTL (seconds) for `intent`.
    #[must_use]
    pub const fn ttl_for(&self, intent: Intent) -> u64 {
        match intent {
            Intent::Status => self.status,
            Intent::General => self.general,
            Intent::Explain => self.explain,
            Intent::Code => self.code,
            Intent::Config => self.default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_matches_spec_constants() {
        let policy = TtlPolicy::default();
        assert_eq!(policy.ttl_for(Intent::Status), 180);
        assert_eq!(policy.ttl_for(Intent::General), 600);
        assert_eq!(policy.ttl_for(Intent::Explain), 600);
        assert_eq!(policy.ttl_for(Intent::Code), 90);
        assert_eq!(policy.ttl_for(Intent::Config), 900);
    }
}
