//! Individual mapping rules.
//!
//! Each rule looks at one kind of evidence and proposes candidates on its
//! own; combining and thresholding happen in the mapper. Rules match
//! against case-folded raw text, not synonym-normalized text: taxonomy
//! vocabulary is written in the words policies actually use.

use policydna_core::mapping::TaxonomyMapping;
use policydna_core::text;
use policydna_core::{ElementType, PolicyElement};
use policydna_taxonomy::TaxonomyRegistry;
use regex::Regex;

use crate::error::MapperError;

/// One source of mapping evidence.
pub trait MappingRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn apply(&self, element: &PolicyElement, registry: &TaxonomyRegistry) -> Vec<TaxonomyMapping>;
}

/// Lowercase and strip punctuation, keeping word boundaries.
fn fold(raw: &str) -> String {
    let folded: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whole-word phrase containment in folded text.
fn contains_phrase(folded_padded: &str, phrase: &str) -> bool {
    folded_padded.contains(&format!(" {phrase} "))
}

// ── Keyword rule ──

/// Matches node vocabulary (name and synonyms) against element text and
/// upstream keywords. Confidence grows with each matched term and is capped
/// below certainty.
pub struct KeywordRule;

const KEYWORD_BASE: f64 = 0.3;
const KEYWORD_STEP: f64 = 0.15;
const KEYWORD_CAP: f64 = 0.9;

impl MappingRule for KeywordRule {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn apply(&self, element: &PolicyElement, registry: &TaxonomyRegistry) -> Vec<TaxonomyMapping> {
        let padded = format!(" {} ", fold(&element.text));
        let keywords: Vec<String> = element.keywords.iter().map(|k| fold(k)).collect();

        let mut out = Vec::new();
        for node in registry.nodes() {
            let mut matched: Vec<String> = Vec::new();
            let name = fold(&node.name);
            // Example snippets count as vocabulary too; they catch elements
            // that quote standard wording verbatim.
            let vocabulary = node
                .synonyms
                .iter()
                .chain(&node.examples)
                .map(|s| fold(s))
                .chain([name]);
            for term in vocabulary {
                if term.is_empty() {
                    continue;
                }
                if (contains_phrase(&padded, &term) || keywords.contains(&term))
                    && !matched.contains(&term)
                {
                    matched.push(term);
                }
            }
            if matched.is_empty() {
                continue;
            }
            let confidence =
                (KEYWORD_BASE + KEYWORD_STEP * (matched.len() - 1) as f64).min(KEYWORD_CAP);
            out.push(TaxonomyMapping {
                code: node.code.clone(),
                confidence,
                matched_terms: matched,
            });
        }
        out
    }
}

// ── Element type rule ──

/// Weak prior from the element's structural type.
pub struct ElementTypeRule;

const TYPE_CONFIDENCE: f64 = 0.5;

fn codes_for_type(element_type: ElementType) -> &'static [&'static str] {
    match element_type {
        ElementType::CoverageGrant | ElementType::Extension => {
            &["PROP.BLDG", "PROP.BPP", "LIAB.GL", "CYBER.BREACH"]
        }
        ElementType::Condition
        | ElementType::NoticeRequirement
        | ElementType::Territory
        | ElementType::TimeElement => &["PROP.ATTR", "LIAB.ATTR", "CYBER.ATTR"],
        _ => &[],
    }
}

impl MappingRule for ElementTypeRule {
    fn name(&self) -> &'static str {
        "element_type"
    }

    fn apply(&self, element: &PolicyElement, registry: &TaxonomyRegistry) -> Vec<TaxonomyMapping> {
        codes_for_type(element.element_type)
            .iter()
            .filter(|code| registry.get_node(code).is_some())
            .map(|code| TaxonomyMapping {
                code: (*code).to_string(),
                confidence: TYPE_CONFIDENCE,
                matched_terms: Vec::new(),
            })
            .collect()
    }
}

// ── Section context rule ──

/// Line-of-business signal from the section an element sits in.
pub struct SectionContextRule;

const SECTION_CONFIDENCE: f64 = 0.6;

const SECTION_LINES: &[(&str, &str)] = &[
    ("property", "PROP"),
    ("liability", "LIAB"),
    ("cyber", "CYBER"),
    ("auto", "AUTO"),
    ("workers compensation", "WC"),
    ("professional", "PROF"),
    ("marine", "MARINE"),
];

impl MappingRule for SectionContextRule {
    fn name(&self) -> &'static str {
        "section_context"
    }

    fn apply(&self, element: &PolicyElement, registry: &TaxonomyRegistry) -> Vec<TaxonomyMapping> {
        let Some(section_type) = element.section_type.as_deref() else {
            return Vec::new();
        };
        let section = fold(section_type);

        SECTION_LINES
            .iter()
            .filter(|(needle, _)| section.contains(needle))
            .filter(|(_, code)| registry.get_node(code).is_some())
            .map(|(_, code)| TaxonomyMapping {
                code: (*code).to_string(),
                confidence: SECTION_CONFIDENCE,
                matched_terms: Vec::new(),
            })
            .collect()
    }
}

// ── Title match rule ──

/// Fuzzy similarity between the element title and node names.
pub struct TitleMatchRule;

const TITLE_MIN_SIMILARITY: f64 = 0.6;
const TITLE_DISCOUNT: f64 = 0.85;
const TITLE_TOP_N: usize = 5;

impl MappingRule for TitleMatchRule {
    fn name(&self) -> &'static str {
        "title_match"
    }

    fn apply(&self, element: &PolicyElement, registry: &TaxonomyRegistry) -> Vec<TaxonomyMapping> {
        let Some(title) = element.title.as_deref() else {
            return Vec::new();
        };
        let title = fold(title);
        if title.is_empty() {
            return Vec::new();
        }

        let mut candidates: Vec<TaxonomyMapping> = registry
            .nodes()
            .filter_map(|node| {
                let sim = text::sequence_ratio(&title, &fold(&node.name));
                (sim > TITLE_MIN_SIMILARITY).then(|| TaxonomyMapping {
                    code: node.code.clone(),
                    confidence: sim * TITLE_DISCOUNT,
                    matched_terms: Vec::new(),
                })
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.code.cmp(&b.code))
        });
        candidates.truncate(TITLE_TOP_N);
        candidates
    }
}

// ── Exclusion pattern rule ──

/// Recognizes well-known exclusion subjects by pattern. Applies only to
/// exclusion elements.
pub struct ExclusionPatternRule {
    patterns: Vec<(Regex, &'static str)>,
}

const EXCLUSION_CONFIDENCE: f64 = 0.85;

impl ExclusionPatternRule {
    pub fn new() -> Result<Self, MapperError> {
        let table: &[(&str, &str)] = &[
            (r"water that backs? up|backs? up or overflows|sewer|drain|sump", "PROP.BLDG"),
            (r"flood|earth movement|earthquake|landslide", "PROP"),
            (r"pollut", "PROP.BLDG.POLLCLEAN"),
            (r"data breach|unauthorized access|computer system|cyber", "CYBER.LIAB"),
        ];
        let mut patterns = Vec::with_capacity(table.len());
        for (pattern, code) in table {
            patterns.push((Regex::new(pattern)?, *code));
        }
        Ok(Self { patterns })
    }
}

impl MappingRule for ExclusionPatternRule {
    fn name(&self) -> &'static str {
        "exclusion_pattern"
    }

    fn apply(&self, element: &PolicyElement, registry: &TaxonomyRegistry) -> Vec<TaxonomyMapping> {
        if element.element_type != ElementType::Exclusion {
            return Vec::new();
        }
        let folded = fold(&element.text);

        self.patterns
            .iter()
            .filter(|(pattern, _)| pattern.is_match(&folded))
            .filter(|(_, code)| registry.get_node(code).is_some())
            .map(|(_, code)| TaxonomyMapping {
                code: (*code).to_string(),
                confidence: EXCLUSION_CONFIDENCE,
                matched_terms: Vec::new(),
            })
            .collect()
    }
}
