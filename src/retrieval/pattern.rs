//! The closed catalog of retrieval patterns.
//!
//! Pattern identifiers are resolved at parse time; an unknown name is a
//! validation error before any store call is made.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Pattern identifiers, parsed case-insensitively with common aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    Basic,
    MetadataFiltering,
    ParentChild,
    Local,
    GraphEnhanced,
    CommunitySummary,
}

impl PatternKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::Basic => "basic",
            PatternKind::MetadataFiltering => "metadata_filtering",
            PatternKind::ParentChild => "parent_child",
            PatternKind::Local => "local",
            PatternKind::GraphEnhanced => "graph_enhanced",
            PatternKind::CommunitySummary => "community_summary",
        }
    }

    /// Whether the pattern needs graph-analytics support in the store.
    pub fn requires_graph_capability(&self) -> bool {
        matches!(
            self,
            PatternKind::Local | PatternKind::GraphEnhanced | PatternKind::CommunitySummary
        )
    }
}

impl std::fmt::Display for PatternKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PatternKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "basic" | "basic_retriever" | "naive" => Ok(PatternKind::Basic),
            "metadata_filtering" | "metadata" => Ok(PatternKind::MetadataFiltering),
            "parent_child" | "parent_child_retriever" | "parent_document" => {
                Ok(PatternKind::ParentChild)
            }
            "local" | "local_retriever" | "local_search" => Ok(PatternKind::Local),
            "graph_enhanced" | "graph_enhanced_vector" | "graph" => Ok(PatternKind::GraphEnhanced),
            "community_summary" | "community_summary_gds" | "community" => {
                Ok(PatternKind::CommunitySummary)
            }
            other => Err(Error::Validation(format!(
                "unknown retrieval pattern '{}'",
                other
            ))),
        }
    }
}

/// Default node labels for the parent/child pattern.
pub const DEFAULT_PARENT_LABEL: &str = "Document";
pub const DEFAULT_CHILD_LABEL: &str = "Chunk";
/// Default traversal depth for graph-enhanced search.
pub const DEFAULT_TRAVERSAL_DEPTH: usize = 2;
/// Default minimum community size for community-based patterns.
pub const DEFAULT_COMMUNITY_THRESHOLD: usize = 3;
/// Default neighbourhood depth for local search.
pub const DEFAULT_LOCAL_DEPTH: usize = 1;

/// A pattern with its pattern-specific parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RetrievalPattern {
    Basic,
    MetadataFiltering {
        filters: HashMap<String, String>,
    },
    ParentChild {
        parent_label: String,
        child_label: String,
    },
    Local {
        community_threshold: usize,
        max_depth: usize,
    },
    GraphEnhanced {
        max_traversal_depth: usize,
    },
    CommunitySummary {
        community_threshold: usize,
    },
}

impl RetrievalPattern {
    pub fn kind(&self) -> PatternKind {
        match self {
            RetrievalPattern::Basic => PatternKind::Basic,
            RetrievalPattern::MetadataFiltering { .. } => PatternKind::MetadataFiltering,
            RetrievalPattern::ParentChild { .. } => PatternKind::ParentChild,
            RetrievalPattern::Local { .. } => PatternKind::Local,
            RetrievalPattern::GraphEnhanced { .. } => PatternKind::GraphEnhanced,
            RetrievalPattern::CommunitySummary { .. } => PatternKind::CommunitySummary,
        }
    }

    /// Build a pattern from a parsed kind with default parameters, attaching
    /// filters where the pattern takes them.
    pub fn from_kind(kind: PatternKind, filters: HashMap<String, String>) -> Result<Self> {
        match kind {
            PatternKind::MetadataFiltering => Ok(RetrievalPattern::MetadataFiltering { filters }),
            _ if !filters.is_empty() => Err(Error::Validation(format!(
                "pattern '{}' does not accept metadata filters",
                kind
            ))),
            PatternKind::Basic => Ok(RetrievalPattern::Basic),
            PatternKind::ParentChild => Ok(RetrievalPattern::ParentChild {
                parent_label: DEFAULT_PARENT_LABEL.to_string(),
                child_label: DEFAULT_CHILD_LABEL.to_string(),
            }),
            PatternKind::Local => Ok(RetrievalPattern::Local {
                community_threshold: DEFAULT_COMMUNITY_THRESHOLD,
                max_depth: DEFAULT_LOCAL_DEPTH,
            }),
            PatternKind::GraphEnhanced => Ok(RetrievalPattern::GraphEnhanced {
                max_traversal_depth: DEFAULT_TRAVERSAL_DEPTH,
            }),
            PatternKind::CommunitySummary => Ok(RetrievalPattern::CommunitySummary {
                community_threshold: DEFAULT_COMMUNITY_THRESHOLD,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_patterns() {
        assert_eq!("basic".parse::<PatternKind>().unwrap(), PatternKind::Basic);
        assert_eq!(
            "Parent-Child".parse::<PatternKind>().unwrap(),
            PatternKind::ParentChild
        );
        assert_eq!(
            "METADATA".parse::<PatternKind>().unwrap(),
            PatternKind::MetadataFiltering
        );
        assert_eq!(
            "community".parse::<PatternKind>().unwrap(),
            PatternKind::CommunitySummary
        );
    }

    #[test]
    fn test_parse_retriever_aliases() {
        assert_eq!(
            "basic_retriever".parse::<PatternKind>().unwrap(),
            PatternKind::Basic
        );
        assert_eq!(
            "parent_child_retriever".parse::<PatternKind>().unwrap(),
            PatternKind::ParentChild
        );
        assert_eq!(
            "local_retriever".parse::<PatternKind>().unwrap(),
            PatternKind::Local
        );
        assert_eq!(
            "graph_enhanced_vector".parse::<PatternKind>().unwrap(),
            PatternKind::GraphEnhanced
        );
        assert_eq!(
            "community_summary_gds".parse::<PatternKind>().unwrap(),
            PatternKind::CommunitySummary
        );
    }

    #[test]
    fn test_from_kind_fills_default_parameters() {
        match RetrievalPattern::from_kind(PatternKind::ParentChild, HashMap::new()).unwrap() {
            RetrievalPattern::ParentChild {
                parent_label,
                child_label,
            } => {
                assert_eq!(parent_label, DEFAULT_PARENT_LABEL);
                assert_eq!(child_label, DEFAULT_CHILD_LABEL);
            }
            other => panic!("expected parent_child, got {:?}", other),
        }
        assert!(matches!(
            RetrievalPattern::from_kind(PatternKind::GraphEnhanced, HashMap::new()).unwrap(),
            RetrievalPattern::GraphEnhanced {
                max_traversal_depth: DEFAULT_TRAVERSAL_DEPTH
            }
        ));
        assert!(matches!(
            RetrievalPattern::from_kind(PatternKind::Local, HashMap::new()).unwrap(),
            RetrievalPattern::Local {
                community_threshold: DEFAULT_COMMUNITY_THRESHOLD,
                max_depth: DEFAULT_LOCAL_DEPTH
            }
        ));
    }

    #[test]
    fn test_unknown_pattern_fails_at_parse_time() {
        let err = "vector_magic".parse::<PatternKind>().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("vector_magic"));
    }

    #[test]
    fn test_graph_capability_requirement() {
        assert!(!PatternKind::Basic.requires_graph_capability());
        assert!(!PatternKind::ParentChild.requires_graph_capability());
        assert!(PatternKind::Local.requires_graph_capability());
        assert!(PatternKind::GraphEnhanced.requires_graph_capability());
        assert!(PatternKind::CommunitySummary.requires_graph_capability());
    }

    #[test]
    fn test_filters_only_accepted_by_metadata_pattern() {
        let mut filters = HashMap::new();
        filters.insert("lang".to_string(), "en".to_string());
        assert!(RetrievalPattern::from_kind(PatternKind::MetadataFiltering, filters.clone()).is_ok());
        assert!(RetrievalPattern::from_kind(PatternKind::Basic, filters).is_err());
        assert!(RetrievalPattern::from_kind(PatternKind::Basic, HashMap::new()).is_ok());
    }
}
