//! Request/poll orchestration for an input that keeps changing, such as an
//! editor buffer.
//!
//! `request` records the newest text and restarts the debounce timer. `poll`
//! runs the analysis once the text has been quiet long enough, serving it
//! from the cache when the same text was analyzed before. Requesting the
//! text that was analyzed last is a no-op.

use std::time::{Duration, Instant};

use tracing::debug;

use super::cache::{CharacterizationCache, InputHash};
use super::debounce::Debouncer;
use super::Characterizer;
use crate::characterization::CodeCharacterization;
use crate::config::CacheConfig;
use crate::errors::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Nothing pending
    Idle,
    /// A change is pending; ready after this long
    Waiting(Duration),
    /// Fresh analysis stored as the latest result
    Analyzed,
    /// Latest result served from the cache
    Cached,
    /// Pending text was empty; latest result cleared
    Empty,
}

#[derive(Debug)]
pub struct AnalysisSession {
    characterizer: Characterizer,
    cache: Option<CharacterizationCache>,
    debouncer: Debouncer,
    pending: Option<(InputHash, String)>,
    last_analyzed: Option<InputHash>,
    latest: Option<CodeCharacterization>,
}

impl AnalysisSession {
    pub fn new(characterizer: Characterizer, config: &CacheConfig) -> Self {
        Self {
            characterizer,
            cache: config
                .enabled
                .then(|| CharacterizationCache::new(config.capacity)),
            debouncer: Debouncer::new(Duration::from_millis(config.debounce_ms)),
            pending: None,
            last_analyzed: None,
            latest: None,
        }
    }

    /// Queue `source` for analysis. Returns `false` when it is the text
    /// analyzed last and nothing else is pending.
    pub fn request(&mut self, source: impl Into<String>, now: Instant) -> bool {
        let source = source.into();
        let hash = InputHash::of(&source);
        if self.last_analyzed.as_ref() == Some(&hash) {
            self.pending = None;
            self.debouncer.cancel();
            debug!(%hash, "input unchanged; request ignored");
            return false;
        }
        self.pending = Some((hash, source));
        self.debouncer.touch(now);
        true
    }

    pub fn poll(&mut self, now: Instant) -> Result<PollOutcome> {
        if self.pending.is_none() {
            return Ok(PollOutcome::Idle);
        }
        if !self.debouncer.take_ready(now) {
            let remaining = self.debouncer.remaining(now).unwrap_or_default();
            return Ok(PollOutcome::Waiting(remaining));
        }
        let Some((hash, source)) = self.pending.take() else {
            return Ok(PollOutcome::Idle);
        };
        self.analyze(hash, &source)
    }

    /// Analyze immediately, skipping the debounce.
    pub fn analyze_now(&mut self, source: &str) -> Result<PollOutcome> {
        self.pending = None;
        self.debouncer.cancel();
        self.analyze(InputHash::of(source), source)
    }

    fn analyze(&mut self, hash: InputHash, source: &str) -> Result<PollOutcome> {
        if let Some(hit) = self.cache.as_ref().and_then(|cache| cache.get(&hash)) {
            self.latest = Some(hit.clone());
            self.last_analyzed = Some(hash);
            return Ok(PollOutcome::Cached);
        }

        let result = self.characterizer.characterize(source)?;
        self.last_analyzed = Some(hash.clone());
        match result {
            Some(record) => {
                if let Some(cache) = self.cache.as_mut() {
                    cache.insert(hash, record.clone());
                }
                self.latest = Some(record);
                Ok(PollOutcome::Analyzed)
            }
            None => {
                self.latest = None;
                Ok(PollOutcome::Empty)
            }
        }
    }

    pub fn latest(&self) -> Option<&CodeCharacterization> {
        self.latest.as_ref()
    }

    pub fn cache(&self) -> Option<&CharacterizationCache> {
        self.cache.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Language;

    const GO: &str = "package main\nfunc main() {}\n";
    const PY: &str = "def f(x):\n    return x + 1\n";

    fn session() -> AnalysisSession {
        AnalysisSession::new(Characterizer::new(), &CacheConfig::default())
    }

    #[test]
    fn test_debounced_request_then_analysis() {
        let start = Instant::now();
        let mut session = session();
        assert_eq!(session.poll(start).unwrap(), PollOutcome::Idle);

        assert!(session.request(GO, start));
        assert_eq!(
            session.poll(start + Duration::from_millis(100)).unwrap(),
            PollOutcome::Waiting(Duration::from_millis(200))
        );
        assert_eq!(
            session.poll(start + Duration::from_millis(300)).unwrap(),
            PollOutcome::Analyzed
        );
        assert_eq!(session.latest().unwrap().language.language, Language::Go);
    }

    #[test]
    fn test_same_input_is_noop() {
        let start = Instant::now();
        let mut session = session();
        session.analyze_now(GO).unwrap();
        assert!(!session.request(GO, start));
        assert_eq!(session.poll(start + Duration::from_secs(1)).unwrap(), PollOutcome::Idle);
    }

    #[test]
    fn test_returning_to_earlier_input_hits_cache() {
        let mut session = session();
        assert_eq!(session.analyze_now(GO).unwrap(), PollOutcome::Analyzed);
        assert_eq!(session.analyze_now(PY).unwrap(), PollOutcome::Analyzed);
        assert_eq!(session.analyze_now(GO).unwrap(), PollOutcome::Cached);
        assert_eq!(session.cache().unwrap().len(), 2);
    }

    #[test]
    fn test_empty_input_clears_latest() {
        let mut session = session();
        session.analyze_now(GO).unwrap();
        assert_eq!(session.analyze_now("").unwrap(), PollOutcome::Empty);
        assert!(session.latest().is_none());
    }

    #[test]
    fn test_cache_disabled() {
        let config = CacheConfig {
            enabled: false,
            ..CacheConfig::default()
        };
        let mut session = AnalysisSession::new(Characterizer::new(), &config);
        session.analyze_now(GO).unwrap();
        session.analyze_now(PY).unwrap();
        assert_eq!(session.analyze_now(GO).unwrap(), PollOutcome::Analyzed);
        assert!(session.cache().is_none());
    }
}
