//! Mark id generation

use super::config::IdStrategy;

#[derive(Debug, Clone)]
pub struct MarkIdGenerator {
    prefix: String,
    strategy: IdStrategy,
    next: u64,
}

impl MarkIdGenerator {
    pub fn new(prefix: &str, strategy: IdStrategy) -> Self {
        #[cfg(not(feature = "uuid"))]
        {
            if strategy == IdStrategy::Random {
                log::warn!("Random mark ids need the `uuid` feature; using sequential ids");
            }
        }

        Self {
            prefix: prefix.to_string(),
            strategy,
            next: 1,
        }
    }

    pub fn strategy(&self) -> IdStrategy {
        self.strategy
    }

    /// Next id that `is_taken` does not reject
    pub fn next_id(&mut self, is_taken: impl Fn(&str) -> bool) -> String {
        loop {
            let candidate = self.candidate();
            if !is_taken(&candidate) {
                return candidate;
            }
            log::debug!("Mark id '{}' already in use, generating another", candidate);
        }
    }

    fn candidate(&mut self) -> String {
        #[cfg(feature = "uuid")]
        {
            if self.strategy == IdStrategy::Random {
                return format!("{}{}", self.prefix, uuid::Uuid::new_v4().simple());
            }
        }

        let id = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}
