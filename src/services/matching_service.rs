//! Skill-overlap scoring between a candidate profile and an offer.

use std::collections::HashSet;

/// Score given to an offer that lists no skills at all.
pub const NEUTRAL_SCORE: f64 = 50.0;

fn skill_set(skills: &[String]) -> HashSet<String> {
    skills
        .iter()
        .map(|skill| skill.trim().to_lowercase())
        .filter(|skill| !skill.is_empty())
        .collect()
}

/// Percentage of the offer's skills the candidate has, rounded to a whole
/// number and kept within `0..=100`.
pub fn matching_score(candidate_skills: &[String], offer_skills: &[String]) -> f64 {
    let wanted = skill_set(offer_skills);
    if wanted.is_empty() {
        return NEUTRAL_SCORE;
    }
    let held = skill_set(candidate_skills);
    let matched = wanted.intersection(&held).count();
    clamp_score((100.0 * matched as f64 / wanted.len() as f64).round())
}

pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn full_overlap_scores_one_hundred() {
        assert_eq!(
            matching_score(&skills(&["Rust", "SQL", "Docker"]), &skills(&["rust", " sql "])),
            100.0
        );
    }

    #[test]
    fn partial_overlap_is_rounded() {
        assert_eq!(
            matching_score(&skills(&["rust"]), &skills(&["Rust", "Go", "Kafka"])),
            33.0
        );
        assert_eq!(
            matching_score(&skills(&["rust", "go"]), &skills(&["Rust", "Go", "Kafka"])),
            67.0
        );
    }

    #[test]
    fn no_candidate_skills_scores_zero() {
        assert_eq!(matching_score(&[], &skills(&["Rust"])), 0.0);
    }

    #[test]
    fn offer_without_skills_is_neutral() {
        assert_eq!(matching_score(&skills(&["Rust"]), &[]), NEUTRAL_SCORE);
        assert_eq!(matching_score(&skills(&["Rust"]), &skills(&["  "])), NEUTRAL_SCORE);
    }

    #[test]
    fn duplicates_do_not_inflate_the_score() {
        assert_eq!(
            matching_score(&skills(&["rust", "RUST"]), &skills(&["Rust", "rust", "Go"])),
            50.0
        );
    }

    #[test]
    fn clamp_keeps_scores_in_range() {
        assert_eq!(clamp_score(140.0), 100.0);
        assert_eq!(clamp_score(-3.0), 0.0);
        assert_eq!(clamp_score(f64::NAN), 0.0);
    }
}
