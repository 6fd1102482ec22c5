//! Emotion taxonomy — the fixed palette used by the check-in flow.
//!
//! Eight categories of exactly seven member emotions each. The palette is
//! static data; the functions here classify a label (category, icon,
//! valence) and filter the palette for the expanded emotion search.

use serde::{Deserialize, Serialize};

use crate::models::Valence;

// ═══════════════════════════════════════════
// Constants — Categories and members
// ═══════════════════════════════════════════

/// One row of the palette: display name, colour asset id, members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmotionCategory {
    pub name: &'static str,
    pub color: &'static str,
    pub emotions: [&'static str; 7],
}

pub const CATEGORIES: [EmotionCategory; 8] = [
    EmotionCategory {
        name: "Happy",
        color: "Happy",
        emotions: ["Happy", "Joyful", "Curious", "Interested", "Creative", "Hopeful", "Inspired"],
    },
    EmotionCategory {
        name: "Calm",
        color: "Calm",
        emotions: ["Calm", "Content", "Loving", "Peaceful", "Satisfied", "Trusting", "Free"],
    },
    EmotionCategory {
        name: "Grateful",
        color: "Grateful",
        emotions: ["Grateful", "Accepted", "Loved", "Respected", "Valued", "Proud", "Powerful"],
    },
    EmotionCategory {
        name: "Excited",
        color: "Startled",
        emotions: ["Startled", "Amazed", "Excited", "Astonished", "Awed", "Eager", "Energetic"],
    },
    EmotionCategory {
        name: "Sad",
        color: "Sad",
        emotions: ["Sad", "Lonely", "Vulnerable", "Guilty", "Stressed", "Depressed", "Hurt"],
    },
    EmotionCategory {
        name: "Disgusted",
        color: "Disgusted",
        emotions: [
            "Disgusted", "Disappointed", "Disapproving", "Repelled",
            "Judgmental", "Embarrassed", "Appalled",
        ],
    },
    EmotionCategory {
        name: "Fearful",
        color: "Fearful",
        emotions: ["Fearful", "Insecure", "Weak", "Anxious", "Rejected", "Threatened", "Overwhelmed"],
    },
    EmotionCategory {
        name: "Angry",
        color: "Angry",
        emotions: ["Angry", "Frustrated", "Critical", "Let down", "Distant", "Frustated", "Bitter"],
    },
];

/// Substrings that mark a label as positive. Checked before the negative set.
const POSITIVE_KEYWORDS: &[&str] = &[
    "happy", "joyful", "calm", "grateful", "excited",
    "hopeful", "inspired", "content", "loved", "proud",
];

const NEGATIVE_KEYWORDS: &[&str] = &[
    "sad", "angry", "fearful", "disgusted", "anxious",
    "stressed", "lonely", "depressed", "hurt",
];

/// Icon shown for emotions outside the palette.
pub const DEFAULT_ICON: &str = "startled";

// ═══════════════════════════════════════════
// View types — serialised to frontend
// ═══════════════════════════════════════════

/// Category info with its (possibly filtered) emotions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub name: String,
    pub color: String,
    pub emotions: Vec<String>,
}

// ═══════════════════════════════════════════
// Lookups
// ═══════════════════════════════════════════

/// The emotions offered on the primary selection screen: the head of each category.
pub fn primary_emotions() -> Vec<&'static str> {
    CATEGORIES.iter().map(|c| c.emotions[0]).collect()
}

/// Returns the category containing `emotion` (exact label match).
pub fn category_for(emotion: &str) -> Option<&'static EmotionCategory> {
    CATEGORIES.iter().find(|c| c.emotions.contains(&emotion))
}

pub fn is_known_emotion(emotion: &str) -> bool {
    category_for(emotion).is_some()
}

/// Icon for an emotion, chosen by its category (case-insensitive).
pub fn icon_for(emotion: &str) -> &'static str {
    let lower = emotion.to_lowercase();
    let category = CATEGORIES
        .iter()
        .find(|c| c.emotions.iter().any(|e| e.to_lowercase() == lower));

    match category.map(|c| c.name) {
        Some("Happy") => "sun.max.fill",
        Some("Calm") => "leaf.fill",
        Some("Grateful") => "heart.circle.fill",
        Some("Excited") => "startled",
        Some("Sad") => "cloud.rain.fill",
        Some("Disgusted") => "xmark.octagon.fill",
        Some("Fearful") => "exclamationmark.triangle.fill",
        Some("Angry") => "flame.fill",
        _ => DEFAULT_ICON,
    }
}

/// Classifies an emotion label by substring match on its lower-cased form.
pub fn valence_of(emotion: &str) -> Valence {
    let lower = emotion.to_lowercase();
    if POSITIVE_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Valence::Positive
    } else if NEGATIVE_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Valence::Negative
    } else {
        Valence::Neutral
    }
}

/// Emotions of one category matching `search` (case-insensitive substring).
/// An empty search returns the whole category.
pub fn filter_category(category: &EmotionCategory, search: &str) -> Vec<&'static str> {
    let needle = search.to_lowercase();
    if needle.is_empty() {
        return category.emotions.to_vec();
    }
    category
        .emotions
        .iter()
        .copied()
        .filter(|e| e.to_lowercase().contains(&needle))
        .collect()
}

/// All categories with their emotions filtered by `search`.
/// Categories left without a match are dropped.
pub fn search(search: &str) -> Vec<CategoryInfo> {
    CATEGORIES
        .iter()
        .filter_map(|cat| {
            let emotions = filter_category(cat, search);
            if emotions.is_empty() {
                return None;
            }
            Some(CategoryInfo {
                name: cat.name.to_string(),
                color: cat.color.to_string(),
                emotions: emotions.iter().map(|e| e.to_string()).collect(),
            })
        })
        .collect()
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
