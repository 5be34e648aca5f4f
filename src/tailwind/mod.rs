//! Tailwind candidate extraction and CSS compilation.
//!
//! Only statically known class strings are considered; anything composed at
//! runtime (`cx(...)`, conditionals, interpolated templates) is skipped.

mod compiler;
pub mod palette;

pub use compiler::UtilityCompiler;

use std::collections::BTreeSet;
use std::sync::Arc;
use swc_core::ecma::{
    ast::*,
    visit::{Visit, VisitWith},
};

use crate::ast::{attr_static_string, is_class_attr};
use crate::cache::CssCache;
use crate::config::TailwindConfig;
use crate::error::TailwindError;

/// Turns a sorted, deduplicated candidate list into a stylesheet.
pub trait TailwindCompiler: Send + Sync {
    fn compile(&self, candidates: &[String]) -> String;
}

struct ClassCollector {
    found: BTreeSet<String>,
}

impl Visit for ClassCollector {
    fn visit_jsx_attr(&mut self, attr: &JSXAttr) {
        if is_class_attr(attr) {
            if let Some(classes) = attr.value.as_ref().and_then(attr_static_string) {
                self.found
                    .extend(classes.split_whitespace().map(str::to_string));
            }
        }
        attr.visit_children_with(self);
    }
}

/// Sorted, deduplicated class tokens from static `className`/`class` values.
pub fn extract_candidates(module: &Module) -> Vec<String> {
    let mut collector = ClassCollector {
        found: BTreeSet::new(),
    };
    module.visit_with(&mut collector);
    collector.found.into_iter().collect()
}

/// Compile `candidates` within the configured limits, reusing cached output
/// for an identical candidate set.
pub fn compile_css(
    compiler: &dyn TailwindCompiler,
    cache: &CssCache,
    config: &TailwindConfig,
    candidates: &[String],
) -> Result<Arc<str>, TailwindError> {
    if candidates.len() > config.max_candidates {
        return Err(TailwindError::TooManyCandidates {
            count: candidates.len(),
            limit: config.max_candidates,
        });
    }
    if candidates.is_empty() {
        return Ok(Arc::from(""));
    }

    let key = candidates.join(" ");
    if let Some(css) = cache.get(&key) {
        tracing::trace!(candidates = candidates.len(), "css cache hit");
        return Ok(css);
    }
    let css = compiler.compile(candidates);
    if css.len() > config.max_css_bytes {
        return Err(TailwindError::CssTooLarge {
            size: css.len(),
            limit: config.max_css_bytes,
        });
    }
    let css: Arc<str> = Arc::from(css);
    cache.insert(key, css.clone());
    Ok(css)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ClearPastThreshold;
    use crate::parse::SourceParser;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn candidates(src: &str) -> Vec<String> {
        let parsed = SourceParser::new().parse(src).unwrap();
        extract_candidates(&parsed.module)
    }

    #[test]
    fn extracts_static_class_values_only() {
        let src = r#"
export const A = ({ on }) => (
  <div className="p-4 flex p-4">
    <span class={"text-sm " + "font-bold"} />
    <b className={`italic`} />
    <i className={on ? "hidden" : "block"} />
    <u className={`x-${on}`} />
    <p className={cx("ignored")} />
  </div>
);"#;
        assert_eq!(
            candidates(src),
            vec!["flex", "font-bold", "italic", "p-4", "text-sm"]
        );
    }

    struct Counting(AtomicUsize);

    impl TailwindCompiler for Counting {
        fn compile(&self, candidates: &[String]) -> String {
            self.0.fetch_add(1, Ordering::SeqCst);
            candidates.join("\n")
        }
    }

    #[test]
    fn caches_by_candidate_set() {
        let compiler = Counting(AtomicUsize::new(0));
        let cache = CssCache::new(ClearPastThreshold(8));
        let config = TailwindConfig::default();
        let set = vec!["a".to_string(), "b".to_string()];
        let first = compile_css(&compiler, &cache, &config, &set).unwrap();
        let second = compile_css(&compiler, &cache, &config, &set).unwrap();
        assert_eq!(&*first, "a\nb");
        assert_eq!(first, second);
        assert_eq!(compiler.0.load(Ordering::SeqCst), 1);
        assert_eq!(&*compile_css(&compiler, &cache, &config, &[]).unwrap(), "");
    }

    #[test]
    fn enforces_limits() {
        let compiler = UtilityCompiler;
        let cache = CssCache::new(ClearPastThreshold(8));
        let config = TailwindConfig {
            max_candidates: 1,
            ..TailwindConfig::default()
        };
        let set = vec!["p-1".to_string(), "p-2".to_string()];
        assert_eq!(
            compile_css(&compiler, &cache, &config, &set),
            Err(TailwindError::TooManyCandidates { count: 2, limit: 1 })
        );

        let config = TailwindConfig {
            max_css_bytes: 4,
            ..TailwindConfig::default()
        };
        let err = compile_css(&compiler, &cache, &config, &set).unwrap_err();
        assert!(matches!(err, TailwindError::CssTooLarge { limit: 4, .. }));
        assert!(err.to_string().contains("tailwind.maxCssBytes"));
        assert!(cache.is_empty());
    }
}
