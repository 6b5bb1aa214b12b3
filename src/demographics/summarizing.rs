//! Reconciliation of the mentions of one document
//!
//! [`summarize`] turns every mention read from a document into one profile:
//!
//! 1. A lone mention is kept as is.
//! 2. Otherwise only sections are considered, and within them only mentions
//!    with details. Each mention is typed (healthy, patient or unknown) and a
//!    section is valid when no type repeats and unknown is never mixed with a
//!    known type. The valid section with the most types wins; among equals
//!    the last one encountered.
//! 3. Every mention whose type and count match a kept group corroborates it;
//!    the others are discarded.
//!
//! Group figures come from the anchor mention's details only. Document
//! figures combine the groups and are absent as soon as one group lacks them.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use tracing::debug;

use super::ast::{format_float, DetailedParticipantsGroup, Node, ParticipantsDetailsEntry};

static FEMALES_NAMES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:females?|women|woman|girls?)\b").expect("females pattern is valid")
});
static MALES_NAMES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:males?|men|man|boys?)\b").expect("males pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipantType {
    Healthy,
    Patient,
    Unknown,
}

impl ParticipantType {
    /// Type implied by a mention's name and adjectives.
    pub fn of(mention: &DetailedParticipantsGroup) -> Self {
        if matches!(mention.name(), "hcs" | "controls" | "students") {
            return ParticipantType::Healthy;
        }
        if mention
            .adjectives()
            .iter()
            .any(|adjective| matches!(adjective.value.as_str(), "healthy" | "control"))
        {
            return ParticipantType::Healthy;
        }
        if mention.name() == "patients" {
            return ParticipantType::Patient;
        }
        ParticipantType::Unknown
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantType::Healthy => "HEALTHY",
            ParticipantType::Patient => "PATIENT",
            ParticipantType::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ParticipantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reconciled sub-population.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticipantsGroupInfo {
    pub name: String,
    pub participant_type: ParticipantType,
    pub count: u64,
    pub females_count: Option<u64>,
    pub males_count: Option<u64>,
    pub age_mean: Option<f64>,
    pub age_range: Option<(f64, f64)>,
    /// Anchor mention first, then corroborating duplicates
    #[serde(skip)]
    pub mentions: Vec<DetailedParticipantsGroup>,
}

impl ParticipantsGroupInfo {
    fn from_anchor(participant_type: ParticipantType, anchor: &DetailedParticipantsGroup) -> Self {
        let count = anchor.count();
        let mut females: Option<u64> = None;
        let mut males: Option<u64> = None;
        let mut age_means = Vec::new();
        let mut age_ranges = Vec::new();

        for detail in &anchor.details {
            match detail {
                ParticipantsDetailsEntry::SubGroup(sub_group) => {
                    if FEMALES_NAMES.is_match(&sub_group.name) {
                        *females.get_or_insert(0) += sub_group.count;
                    } else if MALES_NAMES.is_match(&sub_group.name) {
                        *males.get_or_insert(0) += sub_group.count;
                    }
                }
                ParticipantsDetailsEntry::AgeMoments(moments) => age_means.push(moments.mean),
                ParticipantsDetailsEntry::AgeRange(range) => age_ranges.push((range.low, range.high)),
                ParticipantsDetailsEntry::AgeMedian(_) => {}
            }
        }

        let (females_count, males_count) = sex_counts(count, females, males);
        Self {
            name: anchor.name().to_string(),
            participant_type,
            count,
            females_count,
            males_count,
            age_mean: single(age_means),
            age_range: single(age_ranges),
            mentions: vec![anchor.clone()],
        }
    }

    /// The mention that seeded the group.
    pub fn anchor(&self) -> Option<&DetailedParticipantsGroup> {
        self.mentions.first()
    }
}

/// Completes a single known sex from the count and drops inconsistent pairs.
fn sex_counts(count: u64, females: Option<u64>, males: Option<u64>) -> (Option<u64>, Option<u64>) {
    let (females, males) = match (females, males) {
        (Some(females), None) => (Some(females), count.checked_sub(females)),
        (None, Some(males)) => (count.checked_sub(males), Some(males)),
        known => known,
    };
    match (females, males) {
        (Some(f), Some(m)) if f.checked_add(m) == Some(count) => (Some(f), Some(m)),
        _ => (None, None),
    }
}

/// The value of a one-element list; several statements are ambiguous.
fn single<T>(mut values: Vec<T>) -> Option<T> {
    if values.len() == 1 {
        values.pop()
    } else {
        None
    }
}

impl fmt::Display for ParticipantsGroupInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut details = Vec::new();
        if let (Some(females), Some(males)) = (self.females_count, self.males_count) {
            details.push(format!("{} females", females));
            details.push(format!("{} males", males));
        }
        if let Some(age_mean) = self.age_mean {
            details.push(format!("mean age = {}", format_float(age_mean)));
        }
        if let Some((low, high)) = self.age_range {
            details.push(format!(
                "age range = {} – {}",
                format_float(low),
                format_float(high)
            ));
        }
        write!(f, "<{} {}", self.count, self.name)?;
        if self.participant_type != ParticipantType::Unknown {
            write!(f, " ({})", self.participant_type)?;
        }
        write!(f, " ({})>", details.join(", "))
    }
}

/// Demographics of one document.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ParticipantsInfo {
    pub count: Option<u64>,
    pub females_count: Option<u64>,
    pub males_count: Option<u64>,
    pub age_mean: Option<f64>,
    pub age_range: Option<(f64, f64)>,
    pub groups: Vec<ParticipantsGroupInfo>,
    /// Mentions that matched no kept group
    #[serde(skip)]
    pub discarded_group_mentions: Vec<DetailedParticipantsGroup>,
}

impl ParticipantsInfo {
    fn from_groups(
        groups: Vec<ParticipantsGroupInfo>,
        discarded_group_mentions: Vec<DetailedParticipantsGroup>,
    ) -> Self {
        if groups.is_empty() {
            return Self {
                discarded_group_mentions,
                ..Self::default()
            };
        }

        let count: u64 = groups.iter().map(|group| group.count).sum();
        let females_count: Option<u64> = groups.iter().map(|group| group.females_count).sum();
        let males_count: Option<u64> = groups.iter().map(|group| group.males_count).sum();
        let age_mean = groups
            .iter()
            .map(|group| group.age_mean.map(|mean| mean * group.count as f64))
            .sum::<Option<f64>>()
            .filter(|_| count > 0)
            .map(|weighted| weighted / count as f64);
        let age_range = groups
            .iter()
            .map(|group| group.age_range)
            .collect::<Option<Vec<_>>>()
            .and_then(|ranges| {
                ranges.into_iter().reduce(|(low, high), (other_low, other_high)| {
                    (low.min(other_low), high.max(other_high))
                })
            });

        Self {
            count: Some(count),
            females_count,
            males_count,
            age_mean,
            age_range,
            groups,
            discarded_group_mentions,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count.is_none()
    }
}

impl fmt::Display for ParticipantsInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(count) = self.count else {
            return f.write_str("<Empty participants info>");
        };
        let groups: Vec<String> = self.groups.iter().map(ToString::to_string).collect();
        write!(f, "<{} participants: [{}]>", count, groups.join(", "))
    }
}

/// Mentions with details, grouped by section in order of first appearance.
fn group_by_section(
    mentions: &[DetailedParticipantsGroup],
) -> Vec<Vec<&DetailedParticipantsGroup>> {
    let mut sections: Vec<(&str, Vec<&DetailedParticipantsGroup>)> = Vec::new();
    for mention in mentions.iter().filter(|mention| !mention.details.is_empty()) {
        match sections
            .iter_mut()
            .find(|(name, _)| *name == mention.section_name)
        {
            Some((_, section)) => section.push(mention),
            None => sections.push((mention.section_name.as_str(), vec![mention])),
        }
    }
    sections.into_iter().map(|(_, section)| section).collect()
}

/// One mention per type, or `None` when the section's population is ambiguous.
fn summarize_section<'a>(
    section: &[&'a DetailedParticipantsGroup],
) -> Option<Vec<(ParticipantType, &'a DetailedParticipantsGroup)>> {
    let mut by_type: Vec<(ParticipantType, &DetailedParticipantsGroup)> = Vec::new();
    for &mention in section {
        let participant_type = ParticipantType::of(mention);
        if by_type.iter().any(|(seen, _)| *seen == participant_type) {
            return None;
        }
        by_type.push((participant_type, mention));
    }
    let has_unknown = by_type
        .iter()
        .any(|(participant_type, _)| *participant_type == ParticipantType::Unknown);
    if by_type.is_empty() || (has_unknown && by_type.len() > 1) {
        return None;
    }
    Some(by_type)
}

/// Reconcile the mentions of one document into its demographics.
pub fn summarize(mentions: &[DetailedParticipantsGroup]) -> ParticipantsInfo {
    let kept: Vec<(ParticipantType, &DetailedParticipantsGroup)> = match mentions {
        [only] => vec![(ParticipantType::of(only), only)],
        _ => group_by_section(mentions)
            .iter()
            .filter_map(|section| summarize_section(section))
            // max_by_key returns the last of equal elements
            .max_by_key(|section| section.len())
            .unwrap_or_default(),
    };
    debug!(
        mentions = mentions.len(),
        groups = kept.len(),
        "summarizing mentions"
    );

    let mut groups: Vec<ParticipantsGroupInfo> = kept
        .iter()
        .map(|(participant_type, anchor)| ParticipantsGroupInfo::from_anchor(*participant_type, anchor))
        .collect();

    let mut discarded = Vec::new();
    for mention in mentions {
        let participant_type = ParticipantType::of(mention);
        let matching = groups.iter_mut().find(|group| {
            group.participant_type == participant_type && group.count == mention.count()
        });
        match matching {
            Some(group) => {
                let is_anchor = group
                    .anchor()
                    .is_some_and(|anchor| anchor.abs_start_pos() == mention.abs_start_pos());
                if !is_anchor {
                    group.mentions.push(mention.clone());
                }
            }
            None => discarded.push(mention.clone()),
        }
    }

    ParticipantsInfo::from_groups(groups, discarded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demographics::ast::{
        AgeMoments, AgeRange, NodeSpan, Number, ParticipantsGroup, ParticipantsSubGroup, Word,
        WordKind,
    };

    fn mention(
        section: &str,
        start: usize,
        count: u64,
        adjectives: &[&str],
        name: &str,
        details: Vec<ParticipantsDetailsEntry>,
    ) -> DetailedParticipantsGroup {
        let count_node = Number::new(NodeSpan::new(start, 0, 2), count);
        let adjectives: Vec<Word> = adjectives
            .iter()
            .map(|adjective| Word::new(NodeSpan::new(start, 3, 4), adjective, WordKind::Adjective))
            .collect();
        let name_node = Word::new(NodeSpan::new(start, 5, 10), name, WordKind::ParticipantsName);
        let group = ParticipantsGroup {
            span: count_node.span.cover(&name_node.span),
            count: count_node,
            adjectives,
            name: name_node,
        };
        DetailedParticipantsGroup::new(group, details, section)
    }

    fn sub_group(count: u64, name: &str) -> ParticipantsDetailsEntry {
        ParticipantsDetailsEntry::SubGroup(ParticipantsSubGroup {
            span: NodeSpan::new(0, 0, 1),
            count,
            name: name.to_string(),
        })
    }

    fn age_mean(mean: f64) -> ParticipantsDetailsEntry {
        ParticipantsDetailsEntry::AgeMoments(AgeMoments {
            span: NodeSpan::new(0, 0, 1),
            mean,
            std: None,
        })
    }

    fn age_range(low: f64, high: f64) -> ParticipantsDetailsEntry {
        ParticipantsDetailsEntry::AgeRange(AgeRange {
            span: NodeSpan::new(0, 0, 1),
            low,
            high,
        })
    }

    #[test]
    fn test_participant_types() {
        let of = |adjectives: &[&str], name: &str| {
            ParticipantType::of(&mention("s", 0, 1, adjectives, name, vec![]))
        };
        assert_eq!(of(&[], "controls"), ParticipantType::Healthy);
        assert_eq!(of(&[], "hcs"), ParticipantType::Healthy);
        assert_eq!(of(&["healthy"], "adults"), ParticipantType::Healthy);
        assert_eq!(of(&["healthy"], "patients"), ParticipantType::Healthy);
        assert_eq!(of(&[], "patients"), ParticipantType::Patient);
        assert_eq!(of(&["young"], "participants"), ParticipantType::Unknown);
    }

    #[test]
    fn test_single_mention_is_kept_without_details() {
        let info = summarize(&[mention("Abstract", 0, 20, &[], "participants", vec![])]);
        assert_eq!(info.count, Some(20));
        assert_eq!(info.groups.len(), 1);
        assert_eq!(info.groups[0].participant_type, ParticipantType::Unknown);
        assert!(info.discarded_group_mentions.is_empty());
    }

    #[test]
    fn test_colliding_types_invalidate_the_section() {
        let mentions = [
            mention("Abstract", 0, 20, &[], "participants", vec![age_mean(30.0)]),
            mention("Abstract", 50, 45, &[], "subjects", vec![age_mean(31.0)]),
        ];
        let info = summarize(&mentions);
        assert!(info.is_empty());
        assert!(info.groups.is_empty());
        assert_eq!(info.discarded_group_mentions.len(), 2);
    }

    #[test]
    fn test_unknown_mixed_with_known_invalidates_the_section() {
        let mentions = [
            mention("Methods", 0, 20, &[], "patients", vec![sub_group(10, "females")]),
            mention("Methods", 50, 30, &[], "adults", vec![sub_group(10, "females")]),
        ];
        assert!(summarize(&mentions).is_empty());
    }

    #[test]
    fn test_section_with_most_types_wins() {
        let mentions = [
            mention("Abstract", 0, 30, &[], "participants", vec![age_mean(40.0)]),
            mention("Participants", 100, 15, &["healthy"], "controls", vec![sub_group(8, "females")]),
            mention("Participants", 150, 20, &[], "patients", vec![sub_group(10, "females")]),
        ];
        let info = summarize(&mentions);
        assert_eq!(info.count, Some(35));
        let types: Vec<ParticipantType> = info.groups.iter().map(|g| g.participant_type).collect();
        assert_eq!(types, vec![ParticipantType::Healthy, ParticipantType::Patient]);
        assert_eq!(info.discarded_group_mentions.len(), 1);
        assert_eq!(info.discarded_group_mentions[0].count(), 30);
    }

    #[test]
    fn test_equal_sections_prefer_the_last() {
        let mentions = [
            mention("Abstract", 0, 30, &[], "patients", vec![age_mean(40.0)]),
            mention("Participants", 100, 28, &[], "patients", vec![age_mean(41.0)]),
        ];
        let info = summarize(&mentions);
        assert_eq!(info.count, Some(28));
    }

    #[test]
    fn test_duplicates_corroborate_the_group() {
        let mentions = [
            mention("Abstract", 0, 20, &[], "patients", vec![]),
            mention("Participants", 100, 20, &[], "patients", vec![sub_group(5, "females")]),
            mention("Participants", 200, 20, &[], "patients", vec![]),
        ];
        let info = summarize(&mentions);
        assert_eq!(info.groups.len(), 1);
        let group = &info.groups[0];
        assert_eq!(group.mentions.len(), 3);
        assert_eq!(group.mentions[0].abs_start_pos(), 100);
        assert_eq!(group.mentions[1].abs_start_pos(), 0);
        assert!(info.discarded_group_mentions.is_empty());
    }

    #[test]
    fn test_missing_sex_is_inferred() {
        let info = summarize(&[mention(
            "Participants",
            0,
            21,
            &[],
            "participants",
            vec![age_range(12.0, 89.0), sub_group(8, "males")],
        )]);
        let group = &info.groups[0];
        assert_eq!(group.males_count, Some(8));
        assert_eq!(group.females_count, Some(13));
        assert_eq!(group.age_range, Some((12.0, 89.0)));
        assert_eq!(info.age_range, Some((12.0, 89.0)));
    }

    #[test]
    fn test_inconsistent_sex_counts_are_dropped() {
        let inconsistent = summarize(&[mention(
            "Participants",
            0,
            34,
            &[],
            "patients",
            vec![sub_group(5, "females"), sub_group(20, "males")],
        )]);
        assert_eq!(inconsistent.groups[0].females_count, None);
        assert_eq!(inconsistent.groups[0].males_count, None);

        let impossible = summarize(&[mention(
            "Participants",
            0,
            10,
            &[],
            "patients",
            vec![sub_group(12, "women")],
        )]);
        assert_eq!(impossible.groups[0].females_count, None);
        assert_eq!(impossible.groups[0].males_count, None);
    }

    #[test]
    fn test_sex_counts_are_summed_across_sub_groups() {
        assert_eq!(sex_counts(30, Some(10 + 5), Some(15)), (Some(15), Some(15)));
        assert_eq!(sex_counts(30, None, None), (None, None));
    }

    #[test]
    fn test_several_age_statements_are_ambiguous() {
        let info = summarize(&[mention(
            "Participants",
            0,
            20,
            &[],
            "patients",
            vec![age_mean(30.0), age_mean(32.0)],
        )]);
        assert_eq!(info.groups[0].age_mean, None);
    }

    #[test]
    fn test_document_aggregates() {
        let mentions = [
            mention(
                "Participants",
                0,
                10,
                &["healthy"],
                "adults",
                vec![sub_group(4, "females"), age_mean(20.0), age_range(18.0, 25.0)],
            ),
            mention(
                "Participants",
                100,
                30,
                &[],
                "patients",
                vec![sub_group(10, "men"), age_mean(40.0), age_range(30.0, 60.0)],
            ),
        ];
        let info = summarize(&mentions);
        assert_eq!(info.count, Some(40));
        assert_eq!(info.females_count, Some(4 + 20));
        assert_eq!(info.males_count, Some(6 + 10));
        assert_eq!(info.age_mean, Some(35.0));
        assert_eq!(info.age_range, Some((18.0, 60.0)));
    }

    #[test]
    fn test_missing_group_figure_makes_document_figure_absent() {
        let mentions = [
            mention("Participants", 0, 10, &["healthy"], "adults", vec![age_mean(20.0)]),
            mention("Participants", 100, 30, &[], "patients", vec![sub_group(10, "men")]),
        ];
        let info = summarize(&mentions);
        assert_eq!(info.count, Some(40));
        assert_eq!(info.females_count, None);
        assert_eq!(info.age_mean, None);
        assert_eq!(info.age_range, None);
    }

    #[test]
    fn test_zero_count_has_no_mean_age() {
        let info = summarize(&[mention(
            "Participants",
            0,
            0,
            &[],
            "patients",
            vec![age_mean(20.0)],
        )]);
        assert_eq!(info.count, Some(0));
        assert_eq!(info.age_mean, None);
    }

    #[test]
    fn test_no_mentions() {
        let info = summarize(&[]);
        assert!(info.is_empty());
        assert_eq!(info.to_string(), "<Empty participants info>");
    }

    #[test]
    fn test_display() {
        let mentions = [
            mention(
                "Participants",
                0,
                20,
                &[],
                "patients",
                vec![sub_group(5, "females"), age_mean(34.2), age_range(12.0, 89.0)],
            ),
            mention("Participants", 100, 15, &["healthy"], "controls", vec![age_mean(30.0)]),
        ];
        let info = summarize(&mentions);
        insta::assert_snapshot!(info.to_string(), @"<35 participants: [<20 patients (PATIENT) (5 females, 15 males, mean age = 34.2, age range = 12.0 – 89.0)>, <15 controls (HEALTHY) (mean age = 30.0)>]>");

        let unknown = summarize(&[mention("Abstract", 0, 12, &[], "adults", vec![])]);
        assert_eq!(unknown.groups[0].to_string(), "<12 adults ()>");
    }

    #[test]
    fn test_serialized_shape() {
        let info = summarize(&[mention(
            "Participants",
            0,
            34,
            &[],
            "patients",
            vec![sub_group(5, "females"), sub_group(29, "males")],
        )]);
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "count": 34,
                "females_count": 5,
                "males_count": 29,
                "age_mean": null,
                "age_range": null,
                "groups": [{
                    "name": "patients",
                    "participant_type": "PATIENT",
                    "count": 34,
                    "females_count": 5,
                    "males_count": 29,
                    "age_mean": null,
                    "age_range": null,
                }],
            })
        );
    }

    #[test]
    fn test_summarize_is_idempotent() {
        let mentions = [
            mention("Abstract", 0, 30, &[], "participants", vec![age_mean(40.0)]),
            mention("Participants", 100, 15, &["healthy"], "controls", vec![sub_group(8, "females")]),
            mention("Participants", 150, 20, &[], "patients", vec![sub_group(10, "females")]),
        ];
        assert_eq!(summarize(&mentions), summarize(&mentions));
    }
}
