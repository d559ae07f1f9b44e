// src/engine.rs
//! Keyword matching engine: compiled keyword sets, whole-word matching,
//! context snippets, the clue layer hook, and the thread-safe handle with
//! dev-only hot reload.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::{Duration, SystemTime};

use regex::Regex;
use tracing::info;

use crate::clues::CLUE_RULES;
use crate::config::AnalyzerConfig;
use crate::report::Analysis;
use crate::scoring::score_matches;

/// Characters of context kept on each side of a match.
const CONTEXT_RADIUS: usize = 50;

// Dev logging gate: ANALYZER_DEV_LOG=1 AND dev env (debug or SHUTTLE_ENV in {local,development,dev})
pub(crate) fn dev_logging_enabled() -> bool {
    let on = std::env::var("ANALYZER_DEV_LOG").ok().as_deref() == Some("1");
    if !on {
        return false;
    }
    if cfg!(debug_assertions) {
        return true;
    }
    matches!(
        std::env::var("SHUTTLE_ENV")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "local" | "development" | "dev"
    )
}

/// Short anonymized id for a text. Listing descriptions never reach the logs.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

fn dev_log_analysis(text: &str, report: &MatchReport, analysis: &Analysis) {
    if !dev_logging_enabled() {
        return;
    }
    let id = anon_hash(text);
    let counts: Vec<String> = report
        .categories
        .iter()
        .map(|(k, v)| format!("{}={}", k, v.len()))
        .collect();
    // Never log raw text. Only hashed id + match counts.
    info!(
        target: "analyzer",
        %id,
        total = analysis.total_score,
        highlight = analysis.highlight,
        matched = ?counts,
        "analyzed"
    );
}

/// One matched keyword with the snippet around its first occurrence,
/// taken from the original-case text.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct KeywordHit {
    pub keyword: String,
    pub context: String,
}

/// Per-category match lists. Two views over the same data: `hits` keeps the
/// context snippets, `keywords`/`keyword_map` drop them.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct MatchReport {
    categories: BTreeMap<String, Vec<KeywordHit>>,
}

impl MatchReport {
    pub fn hits(&self, category: &str) -> &[KeywordHit] {
        self.categories
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn keywords(&self, category: &str) -> Vec<String> {
        self.hits(category)
            .iter()
            .map(|h| h.keyword.clone())
            .collect()
    }

    pub fn keyword_map(&self) -> BTreeMap<String, Vec<String>> {
        self.categories
            .iter()
            .map(|(k, v)| (k.clone(), v.iter().map(|h| h.keyword.clone()).collect()))
            .collect()
    }

    fn contains(&self, category: &str, keyword: &str) -> bool {
        self.hits(category).iter().any(|h| h.keyword == keyword)
    }

    fn push(&mut self, category: &str, hit: KeywordHit) {
        // First-detected wins; the same literal keyword is never added twice.
        if !self.contains(category, &hit.keyword) {
            self.categories
                .entry(category.to_string())
                .or_default()
                .push(hit);
        }
    }
}

#[derive(Debug)]
struct CompiledKeyword {
    keyword: String,
    re: Regex,
}

/// The engine holds one compiled regex per configured keyword plus the
/// scoring configuration. Matching and scoring are pure functions over the
/// input text; construction is the only fallible step.
#[derive(Debug)]
pub struct KeywordEngine {
    cfg: AnalyzerConfig,
    sets: Vec<(String, Vec<CompiledKeyword>)>,
}

impl KeywordEngine {
    pub fn new(cfg: AnalyzerConfig) -> anyhow::Result<Self> {
        let mut sets = Vec::with_capacity(cfg.keywords.len());
        for (category, keywords) in &cfg.keywords {
            let mut compiled = Vec::with_capacity(keywords.len());
            for kw in keywords {
                let kw = kw.trim();
                if kw.is_empty() {
                    continue;
                }
                let re = compile_keyword(kw).map_err(|e| {
                    anyhow::anyhow!("keyword `{}` in `{}` did not compile: {}", kw, category, e)
                })?;
                compiled.push(CompiledKeyword {
                    keyword: kw.to_string(),
                    re,
                });
            }
            sets.push((category.clone(), compiled));
        }
        Ok(Self { cfg, sets })
    }

    /// Load from the TOML config file (env path + fallbacks, see `config`).
    pub fn from_toml() -> anyhow::Result<Self> {
        Self::new(AnalyzerConfig::load()?)
    }

    /// Build from a TOML string.
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        Self::new(AnalyzerConfig::from_toml_str(toml_str)?)
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.cfg
    }

    /// Find configured keywords and clue labels in `text`. Total over its
    /// input: empty text and empty keyword lists yield empty results.
    pub fn match_text(&self, text: &str) -> MatchReport {
        let mut report = MatchReport::default();

        for (category, keywords) in &self.sets {
            for ck in keywords {
                // Only the first occurrence counts for scoring purposes.
                if let Some(m) = ck.re.find(text) {
                    report.push(
                        category,
                        KeywordHit {
                            keyword: ck.keyword.clone(),
                            context: snippet(text, m.start(), m.end()),
                        },
                    );
                }
            }
        }

        for rule in CLUE_RULES.iter() {
            if let Some((start, end)) = rule.find_range(text) {
                report.push(
                    rule.category.key(),
                    KeywordHit {
                        keyword: rule.label.to_string(),
                        context: snippet(text, start, end),
                    },
                );
            }
        }

        report
    }

    /// Match + score in one call: the unified analysis entry point.
    pub fn analyze(&self, text: &str) -> Analysis {
        let report = self.match_text(text);
        let analysis = score_matches(&report.keyword_map(), &self.cfg.scoring);
        dev_log_analysis(text, &report, &analysis);
        analysis
    }
}

/// Whole-word pattern when the keyword starts and ends on word characters;
/// otherwise a case-insensitive literal search for the exact phrase.
fn compile_keyword(keyword: &str) -> Result<Regex, regex::Error> {
    let word_bounded = {
        let first = keyword.chars().next();
        let last = keyword.chars().next_back();
        matches!((first, last), (Some(f), Some(l)) if is_word_char(f) && is_word_char(l))
    };
    let escaped = regex::escape(keyword);
    let pattern = if word_bounded {
        format!(r"(?i)\b{escaped}\b")
    } else {
        format!(r"(?i){escaped}")
    };
    Regex::new(&pattern)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// CONTEXT_RADIUS characters on each side of `[start, end)`, clipped to the
/// text bounds and trimmed of surrounding whitespace.
fn snippet(text: &str, start: usize, end: usize) -> String {
    let mut s = start;
    for _ in 0..CONTEXT_RADIUS {
        match text[..s].chars().next_back() {
            Some(c) => s -= c.len_utf8(),
            None => break,
        }
    }
    let mut e = end;
    for _ in 0..CONTEXT_RADIUS {
        match text[e..].chars().next() {
            Some(c) => e += c.len_utf8(),
            None => break,
        }
    }
    text[s..e].trim().to_string()
}

/* ----------------------------
Thread-safe handle + hot reload
---------------------------- */

/// A threadsafe handle that can hot-reload the underlying engine in dev/local.
/// - Enable by setting ANALYZER_HOT_RELOAD=1
/// - Dev-gated: active only if cfg!(debug_assertions) OR SHUTTLE_ENV is "local"/"development".
#[derive(Clone)]
pub struct EngineHandle {
    inner: Arc<RwLock<KeywordEngine>>,
}

impl EngineHandle {
    pub fn new(engine: KeywordEngine) -> Self {
        Self {
            inner: Arc::new(RwLock::new(engine)),
        }
    }

    /// Handle over the built-in default configuration; cannot fail because
    /// the defaults always compile.
    pub fn with_defaults() -> Self {
        let engine = KeywordEngine::new(AnalyzerConfig::default_config())
            .expect("built-in default keywords compile");
        Self::new(engine)
    }

    pub fn analyze(&self, text: &str) -> Analysis {
        if let Ok(eng) = self.inner.read() {
            eng.analyze(text)
        } else {
            Analysis::empty()
        }
    }

    pub fn match_text(&self, text: &str) -> MatchReport {
        if let Ok(eng) = self.inner.read() {
            eng.match_text(text)
        } else {
            MatchReport::default()
        }
    }

    /// Swap in a freshly built engine (admin reload, hot reload).
    pub fn replace(&self, engine: KeywordEngine) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = engine;
        }
    }
}

/// Returns true if we should enable hot reload (dev/local only).
fn hot_reload_enabled() -> bool {
    let want = std::env::var("ANALYZER_HOT_RELOAD")
        .ok()
        .map(|v| v == "1")
        .unwrap_or(false);
    if !want {
        return false;
    }
    if cfg!(debug_assertions) {
        return true;
    }
    matches!(
        std::env::var("SHUTTLE_ENV")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "local" | "development" | "dev"
    )
}

/// Start a simple polling watcher on `path` to hot-reload into the handle.
/// Polls mtime every 2s. Uses only std, no external deps.
pub fn start_hot_reload_thread(handle: EngineHandle, path: PathBuf) {
    if !hot_reload_enabled() {
        return;
    }

    thread::spawn(move || {
        let poll = Duration::from_secs(2);
        let mut last_mtime: Option<SystemTime> = None;

        loop {
            match std::fs::metadata(&path).and_then(|m| m.modified()) {
                Ok(mtime) => {
                    let changed = match last_mtime {
                        None => {
                            last_mtime = Some(mtime);
                            false
                        }
                        Some(prev) => mtime > prev,
                    };
                    if changed {
                        if let Ok(content) = std::fs::read_to_string(&path) {
                            if let Ok(new_engine) = KeywordEngine::from_toml_str(&content) {
                                handle.replace(new_engine);
                                info!(path = %path.display(), "analyzer config hot-reloaded");
                            }
                        }
                        last_mtime = Some(mtime);
                    }
                }
                Err(_) => {
                    // File missing or unreadable; keep trying.
                }
            }
            thread::sleep(poll);
        }
    });
}

/* ----------------------------
Tests
---------------------------- */
