/// Prefix for execution ids.
pub(crate) const EXEC_PREFIX: &str = "exec";
/// Prefix for step ids.
pub(crate) const STEP_PREFIX: &str = "step";

/// Generates `<prefix>_` + 8 lowercase hex character ids.
///
/// The 8 characters are the first 8 hex digits of a fresh uniformly
/// random 128-bit value. Collisions are exceptional; the store rejects
/// them as `DuplicateId` and the tracer retries with a fresh id.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdGenerator;

impl IdGenerator {
    pub fn generate(&self, prefix: &str) -> String {
        let raw: u128 = rand::random();
        format!("{}_{:08x}", prefix, (raw >> 96) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_have_prefix_and_8_lowercase_hex_chars() {
        let ids = IdGenerator;
        for prefix in [EXEC_PREFIX, STEP_PREFIX] {
            let id = ids.generate(prefix);
            let (head, tail) = id.split_at(prefix.len() + 1);
            assert_eq!(head, format!("{prefix}_"));
            assert_eq!(tail.len(), 8);
            assert!(tail.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn ids_are_unlikely_to_repeat() {
        let ids = IdGenerator;
        let generated: std::collections::HashSet<String> =
            (0..64).map(|_| ids.generate(EXEC_PREFIX)).collect();
        // 64 draws from a 32-bit space; a repeat here means a broken source.
        assert_eq!(generated.len(), 64);
    }
}
