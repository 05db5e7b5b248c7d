//! Rule combination and batch mapping.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use policydna_core::mapping::{MappingMethod, MappingResult, RuleContribution, TaxonomyMapping};
use policydna_core::score::{
    HIGH_CONFIDENCE, MEDIUM_CONFIDENCE, MatchConfig, UNCLASSIFIED_CODE,
};
use policydna_core::PolicyElement;
use policydna_library::{ClauseLibrary, StandardClause};
use policydna_taxonomy::TaxonomyRegistry;

use crate::error::MapperError;
use crate::rules::{
    ElementTypeRule, ExclusionPatternRule, KeywordRule, MappingRule, SectionContextRule,
    TitleMatchRule,
};

/// Fallback confidence for clause evidence when the element carries no
/// recorded equivalence score.
const CLAUSE_HINT_CONFIDENCE: f64 = 0.85;

/// Maps elements onto the taxonomy by combining rule evidence.
pub struct TaxonomyMapper<'a> {
    registry: &'a TaxonomyRegistry,
    rules: Vec<Box<dyn MappingRule>>,
    config: MatchConfig,
}

impl<'a> TaxonomyMapper<'a> {
    pub fn new(registry: &'a TaxonomyRegistry) -> Result<Self, MapperError> {
        Self::with_config(registry, MatchConfig::default())
    }

    pub fn with_config(
        registry: &'a TaxonomyRegistry,
        config: MatchConfig,
    ) -> Result<Self, MapperError> {
        let rules: Vec<Box<dyn MappingRule>> = vec![
            Box::new(KeywordRule),
            Box::new(ElementTypeRule),
            Box::new(SectionContextRule),
            Box::new(TitleMatchRule),
            Box::new(ExclusionPatternRule::new()?),
        ];
        Ok(Self { registry, rules, config })
    }

    /// Map one element, optionally folding in the standard clause it was
    /// normalized to.
    ///
    /// Candidates from all sources combine per code by maximum confidence,
    /// except that a clause match promotes its code to the top of the
    /// ranking regardless of what the rules scored. When nothing clears the
    /// configured floor, the best match is the unclassified sentinel; weak
    /// candidates stay listed for auditing.
    pub fn map_element(
        &self,
        element: &PolicyElement,
        clause_hint: Option<&StandardClause>,
    ) -> MappingResult {
        let mut rule_contributions = Vec::new();
        let mut combined: BTreeMap<String, TaxonomyMapping> = BTreeMap::new();
        let mut rule_evidence = false;

        for rule in &self.rules {
            let candidates = rule.apply(element, self.registry);
            if candidates.is_empty() {
                continue;
            }
            rule_evidence = true;
            for candidate in &candidates {
                merge(&mut combined, candidate.clone());
            }
            rule_contributions.push(RuleContribution {
                rule: rule.name().to_string(),
                candidates,
            });
        }

        // A clause match is the strongest evidence there is: its code ranks
        // first, never below whatever confidence the rules produced.
        let mut hinted_code = None;
        let clause_evidence = match clause_hint {
            Some(clause) if self.registry.get_node(&clause.taxonomy_code).is_some() => {
                let rule_top = combined
                    .values()
                    .map(|m| m.confidence)
                    .fold(0.0f64, f64::max);
                let confidence = element
                    .similarity_score
                    .unwrap_or(CLAUSE_HINT_CONFIDENCE)
                    .max(rule_top)
                    .min(1.0);
                merge(
                    &mut combined,
                    TaxonomyMapping {
                        code: clause.taxonomy_code.clone(),
                        confidence,
                        matched_terms: Vec::new(),
                    },
                );
                hinted_code = Some(clause.taxonomy_code.clone());
                true
            }
            _ => false,
        };

        let mut mappings: Vec<TaxonomyMapping> = combined.into_values().collect();
        mappings.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.code.cmp(&b.code))
        });
        if let Some(code) = hinted_code {
            if let Some(pos) = mappings.iter().position(|m| m.code == code) {
                let hinted = mappings.remove(pos);
                mappings.insert(0, hinted);
            }
        }

        let best_match_code = match mappings.first() {
            Some(best) if best.confidence >= self.config.min_mapping_confidence => {
                Some(best.code.clone())
            }
            _ => Some(UNCLASSIFIED_CODE.to_string()),
        };

        let mapping_method = match (rule_evidence, clause_evidence) {
            (true, true) => MappingMethod::Hybrid,
            (false, true) => MappingMethod::Semantic,
            _ => MappingMethod::Keyword,
        };

        debug!(
            element = %element.id,
            best = best_match_code.as_deref().unwrap_or(UNCLASSIFIED_CODE),
            candidates = mappings.len(),
            "mapped element"
        );

        MappingResult {
            element_id: element.id.clone(),
            mappings,
            best_match_code,
            mapping_method,
            rule_contributions,
        }
    }

    /// Map a batch of elements in place.
    ///
    /// Resolves each element's `standard_clause_id` against the library (when
    /// given) as semantic evidence, and stores the candidates that clear the
    /// confidence floor on the element.
    pub fn map_elements(
        &self,
        elements: &mut [PolicyElement],
        library: Option<&ClauseLibrary>,
    ) -> Vec<MappingResult> {
        let results: Vec<MappingResult> = elements
            .iter()
            .map(|element| {
                let hint = element
                    .standard_clause_id
                    .as_deref()
                    .and_then(|id| library.and_then(|lib| lib.get_clause(id)));
                self.map_element(element, hint)
            })
            .collect();

        for (element, result) in elements.iter_mut().zip(&results) {
            element.taxonomy_mappings = result
                .mappings
                .iter()
                .filter(|m| m.confidence >= self.config.min_mapping_confidence)
                .cloned()
                .collect();
        }

        info!(elements = results.len(), "mapped elements");
        results
    }

    /// Count of best-match codes across results, sentinel included.
    pub fn taxonomy_distribution(results: &[MappingResult]) -> BTreeMap<String, usize> {
        let mut distribution = BTreeMap::new();
        for result in results {
            let code = result
                .best_match_code
                .clone()
                .unwrap_or_else(|| UNCLASSIFIED_CODE.to_string());
            *distribution.entry(code).or_insert(0) += 1;
        }
        distribution
    }

    /// Confidence statistics over best mappings.
    pub fn confidence_statistics(results: &[MappingResult]) -> ConfidenceStats {
        let mut confidences: Vec<f64> = results
            .iter()
            .filter_map(|r| r.best().map(|m| m.confidence))
            .collect();
        confidences.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let unclassified = results
            .iter()
            .filter(|r| r.best_match_code.as_deref() == Some(UNCLASSIFIED_CODE))
            .count();

        if confidences.is_empty() {
            return ConfidenceStats {
                count: results.len(),
                unclassified,
                ..ConfidenceStats::default()
            };
        }

        let n = confidences.len();
        let median = if n % 2 == 1 {
            confidences[n / 2]
        } else {
            (confidences[n / 2 - 1] + confidences[n / 2]) / 2.0
        };

        ConfidenceStats {
            count: results.len(),
            average: confidences.iter().sum::<f64>() / n as f64,
            min: confidences[0],
            max: confidences[n - 1],
            median,
            high: confidences.iter().filter(|&&c| c >= HIGH_CONFIDENCE).count(),
            medium: confidences
                .iter()
                .filter(|&&c| c >= MEDIUM_CONFIDENCE && c < HIGH_CONFIDENCE)
                .count(),
            low: confidences.iter().filter(|&&c| c < MEDIUM_CONFIDENCE).count(),
            unclassified,
        }
    }
}

fn merge(combined: &mut BTreeMap<String, TaxonomyMapping>, candidate: TaxonomyMapping) {
    match combined.get_mut(&candidate.code) {
        Some(existing) => {
            if candidate.confidence > existing.confidence {
                existing.confidence = candidate.confidence;
            }
            for term in candidate.matched_terms {
                if !existing.matched_terms.contains(&term) {
                    existing.matched_terms.push(term);
                }
            }
        }
        None => {
            combined.insert(candidate.code.clone(), candidate);
        }
    }
}

/// Summary of mapping confidence across a batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfidenceStats {
    pub count: usize,
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    /// Best confidence at or above the high tier.
    pub high: usize,
    /// Between the medium and high tiers.
    pub medium: usize,
    /// Below the medium tier.
    pub low: usize,
    /// Elements that fell back to the unclassified sentinel.
    pub unclassified: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use policydna_core::ElementType;
    use policydna_library::builtin_library;
    use policydna_taxonomy::builtin_registry;

    fn grant_element() -> PolicyElement {
        PolicyElement::new(
            "el-1",
            ElementType::CoverageGrant,
            "We will pay for direct physical loss of or damage to the building and its \
             fixtures at the described premises.",
        )
    }

    #[test]
    fn keyword_evidence_wins_for_building_text() {
        let registry = builtin_registry().unwrap();
        let mapper = TaxonomyMapper::new(&registry).unwrap();
        let result = mapper.map_element(&grant_element(), None);

        assert_eq!(result.best_match_code.as_deref(), Some("PROP.BLDG"));
        assert_eq!(result.mapping_method, MappingMethod::Keyword);
        assert!(!result.rule_contributions.is_empty());
    }

    #[test]
    fn clause_hint_promotes_clause_taxonomy_code() {
        let registry = builtin_registry().unwrap();
        let library = builtin_library().unwrap();
        let mapper = TaxonomyMapper::new(&registry).unwrap();

        let mut element = PolicyElement::new(
            "el-2",
            ElementType::CoverageGrant,
            "We will pay for notification and credit monitoring expenses.",
        );
        element.similarity_score = Some(0.95);
        let hint = library.get_clause("STD-CYBER-BREACH-001");
        let result = mapper.map_element(&element, hint);

        assert_eq!(result.best_match_code.as_deref(), Some("CYBER.BREACH"));
        assert_eq!(result.mapping_method, MappingMethod::Hybrid);
        let best = result.best().unwrap();
        assert!((best.confidence - 0.95).abs() < 1e-9);
    }

    #[test]
    fn clause_hint_outranks_stronger_rule_evidence() {
        let registry = builtin_registry().unwrap();
        let library = builtin_library().unwrap();
        let mapper = TaxonomyMapper::new(&registry).unwrap();

        // Flood wording scores 0.85 for PROP; the clause match still wins.
        let mut element = PolicyElement::new(
            "el-2b",
            ElementType::Exclusion,
            "We will not pay for loss caused by flood or surface water of any kind.",
        );
        element.similarity_score = Some(0.65);
        let hint = library.get_clause("STD-CYBER-BREACH-001");
        let result = mapper.map_element(&element, hint);

        assert_eq!(result.best_match_code.as_deref(), Some("CYBER.BREACH"));
        let best = result.best().unwrap();
        assert!(best.confidence >= 0.85 && best.confidence <= 1.0);
        assert!(result
            .mappings
            .iter()
            .all(|m| m.confidence <= best.confidence));
    }

    #[test]
    fn unmatchable_element_gets_unclassified_sentinel() {
        let registry = builtin_registry().unwrap();
        let mapper = TaxonomyMapper::new(&registry).unwrap();
        let element = PolicyElement::new("el-3", ElementType::Other, "Lorem ipsum dolor sit.");
        let result = mapper.map_element(&element, None);

        assert_eq!(result.best_match_code.as_deref(), Some("UNCLASSIFIED"));
        assert_eq!(result.mapping_method, MappingMethod::Keyword);
    }

    #[test]
    fn candidates_sorted_descending_and_capped() {
        let registry = builtin_registry().unwrap();
        let mapper = TaxonomyMapper::new(&registry).unwrap();
        let mut element = grant_element();
        element.section_type = Some("property".into());
        element.title = Some("Building Coverage".into());
        let result = mapper.map_element(&element, None);

        for pair in result.mappings.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
        for mapping in &result.mappings {
            assert!(mapping.confidence <= 1.0);
        }
    }

    #[test]
    fn map_elements_attaches_mappings_above_floor() {
        let registry = builtin_registry().unwrap();
        let library = builtin_library().unwrap();
        let mapper = TaxonomyMapper::new(&registry).unwrap();

        let mut elements = vec![grant_element()];
        mapper.map_elements(&mut elements, Some(&library));

        assert!(!elements[0].taxonomy_mappings.is_empty());
        assert!(elements[0]
            .taxonomy_mappings
            .iter()
            .all(|m| m.confidence >= 0.3));
    }

    #[test]
    fn distribution_counts_best_codes() {
        let registry = builtin_registry().unwrap();
        let mapper = TaxonomyMapper::new(&registry).unwrap();
        let mut elements = vec![
            grant_element(),
            PolicyElement::new("el-x", ElementType::Other, "Lorem ipsum dolor sit."),
        ];
        let results = mapper.map_elements(&mut elements, None);

        let distribution = TaxonomyMapper::taxonomy_distribution(&results);
        assert_eq!(distribution.get("PROP.BLDG"), Some(&1));
        assert_eq!(distribution.get("UNCLASSIFIED"), Some(&1));
    }

    #[test]
    fn confidence_statistics_tiers() {
        let registry = builtin_registry().unwrap();
        let mapper = TaxonomyMapper::new(&registry).unwrap();
        let mut elements = vec![grant_element()];
        let results = mapper.map_elements(&mut elements, None);

        let stats = TaxonomyMapper::confidence_statistics(&results);
        assert_eq!(stats.count, 1);
        assert!(stats.max >= stats.median && stats.median >= stats.min);
        assert_eq!(stats.high + stats.medium + stats.low, 1);
    }

    #[test]
    fn statistics_on_empty_batch() {
        let stats = TaxonomyMapper::confidence_statistics(&[]);
        assert_eq!(stats.count, 0);
        assert_eq!(stats.unclassified, 0);
        assert_eq!(stats.average, 0.0);
    }
}
