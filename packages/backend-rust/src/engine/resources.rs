use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use skillpath_algo::ValidationError;

use crate::content::{ContentStore, RankedDocument};

/// Preferred way of studying; steers which resources are retrieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LearningStyle {
    Visual,
    Auditory,
    #[serde(alias = "read/write", alias = "read_write")]
    ReadWrite,
    Kinesthetic,
}

impl LearningStyle {
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            LearningStyle::Visual => &["diagrams", "videos", "interactive"],
            LearningStyle::Auditory => &["podcasts", "explanations", "audio"],
            LearningStyle::ReadWrite => &["text", "notes", "exercises"],
            LearningStyle::Kinesthetic => &["coding", "practice", "projects"],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LearningStyle::Visual => "visual",
            LearningStyle::Auditory => "auditory",
            LearningStyle::ReadWrite => "read-write",
            LearningStyle::Kinesthetic => "kinesthetic",
        }
    }
}

impl fmt::Display for LearningStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LearningStyle {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "visual" => Ok(LearningStyle::Visual),
            "auditory" => Ok(LearningStyle::Auditory),
            "read-write" | "read/write" | "read_write" => Ok(LearningStyle::ReadWrite),
            "kinesthetic" => Ok(LearningStyle::Kinesthetic),
            other => Err(ValidationError::UnknownLearningStyle(other.to_string())),
        }
    }
}

fn study_query(competency: &str) -> String {
    format!("{competency} fundamentals examples")
}

fn remediation_query(competency: &str) -> String {
    format!("explain {competency} step by step")
}

fn styled(query: String, style: Option<LearningStyle>) -> String {
    match style {
        Some(style) => format!("{query} {}", style.keywords().join(" ")),
        None => query,
    }
}

/// Up to `k` resources for one path step.
///
/// Competency-filtered retrieval first: the study query for regular steps, the
/// remediation query for gaps. When that returns nothing, the other query is
/// tried before giving up.
pub(crate) fn recommend(
    content: &dyn ContentStore,
    competency: &str,
    is_gap: bool,
    style: Option<LearningStyle>,
    k: usize,
) -> Vec<RankedDocument> {
    if k == 0 {
        return Vec::new();
    }

    let (primary, fallback) = if is_gap {
        (remediation_query(competency), study_query(competency))
    } else {
        (study_query(competency), remediation_query(competency))
    };

    let hits = content.query(&styled(primary, style), Some(competency), k);
    if !hits.is_empty() {
        return hits;
    }
    content.query(&styled(fallback, style), Some(competency), k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentDocument, KeywordContentStore, NoContent};

    #[test]
    fn test_style_parsing() {
        assert_eq!("Visual".parse::<LearningStyle>().unwrap(), LearningStyle::Visual);
        assert_eq!(
            "read/write".parse::<LearningStyle>().unwrap(),
            LearningStyle::ReadWrite
        );
        assert!("smell".parse::<LearningStyle>().is_err());
    }

    #[test]
    fn test_falls_back_to_other_query() {
        let store = KeywordContentStore::new(vec![ContentDocument {
            source_id: "trees-stepwise".into(),
            text: "Explain step by step how rotations work".into(),
            competencies: vec!["trees".into()],
        }]);

        let hits = recommend(&store, "trees", false, None, 3);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].source_id, "trees-stepwise");

        assert!(recommend(&store, "graphs", true, None, 3).is_empty());
        assert!(recommend(&NoContent, "trees", false, None, 3).is_empty());
        assert!(recommend(&store, "trees", false, None, 0).is_empty());
    }

    #[test]
    fn test_style_keywords_join_query() {
        assert_eq!(
            styled(study_query("arrays"), Some(LearningStyle::Kinesthetic)),
            "arrays fundamentals examples coding practice projects"
        );
    }
}
