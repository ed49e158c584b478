// config.rs: codec configuration and its environment overrides.
//
// The encoder specialization is chosen per `Codec` value. Every field here
// only affects speed and memory; all combinations decode with the same
// decoder.
//
// Environment variables (read by `CodecConfig::from_env`):
//   LZ4PACK_MEMORY_USAGE  hash table size exponent, 10..=20
//   LZ4PACK_TABLE         auto | wide
//   LZ4PACK_MATCH_WORD    auto | 4 | 8
//
// Each variable has a pure `*_from(Option<&str>)` parser; invalid values
// are reported at display level 2 and fall back to the default.

use crate::displaylevel;

/// Default hash table memory exponent: 2^14 bytes, 4096 `u32` slots.
pub const MEMORY_USAGE_DEFAULT: u32 = 14;
pub const MEMORY_USAGE_MIN: u32 = 10;
pub const MEMORY_USAGE_MAX: u32 = 20;

pub const ENV_MEMORY_USAGE: &str = "LZ4PACK_MEMORY_USAGE";
pub const ENV_TABLE: &str = "LZ4PACK_TABLE";
pub const ENV_MATCH_WORD: &str = "LZ4PACK_MATCH_WORD";

/// Which hash table layout serves a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableMode {
    /// 16-bit table below `LZ4_64KLIMIT`, 32-bit table otherwise.
    #[default]
    Auto,
    /// Always the 32-bit table.
    Wide,
}

/// Word width for forward match extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchWord {
    /// 8 bytes with the 32-bit table, 4 bytes with the 16-bit table.
    #[default]
    Auto,
    Word4,
    Word8,
}

/// Encoder tuning carried by a [`Codec`](crate::Codec).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    pub(crate) memory_usage: u32,
    pub(crate) table_mode: TableMode,
    pub(crate) match_word: MatchWord,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            memory_usage: MEMORY_USAGE_DEFAULT,
            table_mode: TableMode::Auto,
            match_word: MatchWord::Auto,
        }
    }
}

impl CodecConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by the `LZ4PACK_*` environment variables.
    pub fn from_env() -> Self {
        Self {
            memory_usage: memory_usage_from(std::env::var(ENV_MEMORY_USAGE).ok().as_deref()),
            table_mode: table_mode_from(std::env::var(ENV_TABLE).ok().as_deref()),
            match_word: match_word_from(std::env::var(ENV_MATCH_WORD).ok().as_deref()),
        }
    }

    /// Set the table memory exponent, clamped to
    /// `MEMORY_USAGE_MIN..=MEMORY_USAGE_MAX`.
    pub fn with_memory_usage(mut self, memory_usage: u32) -> Self {
        self.memory_usage = memory_usage.clamp(MEMORY_USAGE_MIN, MEMORY_USAGE_MAX);
        self
    }

    pub fn with_table_mode(mut self, table_mode: TableMode) -> Self {
        self.table_mode = table_mode;
        self
    }

    pub fn with_match_word(mut self, match_word: MatchWord) -> Self {
        self.match_word = match_word;
        self
    }

    pub fn memory_usage(&self) -> u32 {
        self.memory_usage
    }

    pub fn table_mode(&self) -> TableMode {
        self.table_mode
    }

    pub fn match_word(&self) -> MatchWord {
        self.match_word
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Environment parsing
// ─────────────────────────────────────────────────────────────────────────────

/// Testable core of the `LZ4PACK_MEMORY_USAGE` override.
pub fn memory_usage_from(env_val: Option<&str>) -> u32 {
    if let Some(env) = env_val {
        match env.trim().parse::<u32>() {
            Ok(v) if (MEMORY_USAGE_MIN..=MEMORY_USAGE_MAX).contains(&v) => return v,
            _ => {
                displaylevel!(
                    2,
                    "Ignore environment variable setting {}={}: expected {}..={} \n",
                    ENV_MEMORY_USAGE,
                    env,
                    MEMORY_USAGE_MIN,
                    MEMORY_USAGE_MAX
                );
            }
        }
    }
    MEMORY_USAGE_DEFAULT
}

/// Testable core of the `LZ4PACK_TABLE` override.
pub fn table_mode_from(env_val: Option<&str>) -> TableMode {
    if let Some(env) = env_val {
        match env.trim().to_ascii_lowercase().as_str() {
            "auto" => return TableMode::Auto,
            "wide" => return TableMode::Wide,
            _ => {
                displaylevel!(2, "Ignore environment variable setting {}={}: expected auto or wide \n", ENV_TABLE, env);
            }
        }
    }
    TableMode::Auto
}

/// Testable core of the `LZ4PACK_MATCH_WORD` override.
pub fn match_word_from(env_val: Option<&str>) -> MatchWord {
    if let Some(env) = env_val {
        match env.trim().to_ascii_lowercase().as_str() {
            "auto" => return MatchWord::Auto,
            "4" => return MatchWord::Word4,
            "8" => return MatchWord::Word8,
            _ => {
                displaylevel!(2, "Ignore environment variable setting {}={}: expected auto, 4 or 8 \n", ENV_MATCH_WORD, env);
            }
        }
    }
    MatchWord::Auto
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = CodecConfig::default();
        assert_eq!(c.memory_usage(), 14);
        assert_eq!(c.table_mode(), TableMode::Auto);
        assert_eq!(c.match_word(), MatchWord::Auto);
    }

    #[test]
    fn memory_usage_is_clamped() {
        assert_eq!(CodecConfig::new().with_memory_usage(2).memory_usage(), MEMORY_USAGE_MIN);
        assert_eq!(CodecConfig::new().with_memory_usage(99).memory_usage(), MEMORY_USAGE_MAX);
        assert_eq!(CodecConfig::new().with_memory_usage(16).memory_usage(), 16);
    }

    #[test]
    fn memory_usage_env_parsing() {
        assert_eq!(memory_usage_from(None), 14);
        assert_eq!(memory_usage_from(Some("12")), 12);
        assert_eq!(memory_usage_from(Some(" 20 ")), 20);
        assert_eq!(memory_usage_from(Some("9")), 14);
        assert_eq!(memory_usage_from(Some("abc")), 14);
    }

    #[test]
    fn table_mode_env_parsing() {
        assert_eq!(table_mode_from(None), TableMode::Auto);
        assert_eq!(table_mode_from(Some("WIDE")), TableMode::Wide);
        assert_eq!(table_mode_from(Some("auto")), TableMode::Auto);
        assert_eq!(table_mode_from(Some("narrow")), TableMode::Auto);
    }

    #[test]
    fn match_word_env_parsing() {
        assert_eq!(match_word_from(None), MatchWord::Auto);
        assert_eq!(match_word_from(Some("4")), MatchWord::Word4);
        assert_eq!(match_word_from(Some("8")), MatchWord::Word8);
        assert_eq!(match_word_from(Some("16")), MatchWord::Auto);
    }
}
