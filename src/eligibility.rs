//! Dashboard recency rules.
//!
//! Decides, per dashboard card, whether the latest persisted record is
//! fresh enough to show or whether the user should be invited to start a
//! new session. Pure functions of (latest record, now); nothing is stored.
//!
//! Two freshness definitions coexist for the mood card:
//! - `has_checked_in_today`: same calendar day in the caller's time zone.
//!   Decides the card content.
//! - `mood_card_initially_flipped`: fewer than 24 elapsed hours. Only
//!   applies to a check-in that already counts for today, so a card that
//!   prompts a check-in never starts flipped.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{EPDS_VALIDITY_DAYS, MOOD_CARD_FLIP_HOURS};
use crate::emotion;
use crate::models::{DailyCheckIn, EpdsAssessment};

/// Label shown when a check-in today carries no emotion.
pub const CHECKED_IN_FALLBACK_LABEL: &str = "Checked in";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EpdsCard {
    /// No assessment, or the latest one is stale.
    StartAssessment,
    Score { total_score: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MoodCard {
    /// No check-in on today's calendar day.
    CheckIn,
    CheckedIn { label: String, icon: Option<String> },
}

/// Everything the dashboard needs to render both cards.
/// Derived on every refresh, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilitySnapshot {
    pub epds: EpdsCard,
    pub mood: MoodCard,
    pub epds_card_flipped: bool,
    pub mood_card_flipped: bool,
}

// ---------------------------------------------------------------------------
// Time helpers
// ---------------------------------------------------------------------------

/// Whole days elapsed from `then` to `now` (truncated toward zero).
pub fn whole_days_between<Tz: TimeZone>(then: &DateTime<Utc>, now: &DateTime<Tz>) -> i64 {
    now.with_timezone(&Utc).signed_duration_since(*then).num_days()
}

/// Whole hours elapsed from `then` to `now` (truncated toward zero).
pub fn whole_hours_between<Tz: TimeZone>(then: &DateTime<Utc>, now: &DateTime<Tz>) -> i64 {
    now.with_timezone(&Utc).signed_duration_since(*then).num_hours()
}

/// Same year/month/day once `then` is viewed in `now`'s time zone.
pub fn is_same_calendar_day<Tz: TimeZone>(then: &DateTime<Utc>, now: &DateTime<Tz>) -> bool {
    then.with_timezone(&now.timezone()).date_naive() == now.date_naive()
}

// ---------------------------------------------------------------------------
// EPDS rule
// ---------------------------------------------------------------------------

/// An assessment is stale once `EPDS_VALIDITY_DAYS` whole days have passed.
/// Exactly seven days counts as stale.
pub fn is_assessment_stale<Tz: TimeZone>(assessment: &EpdsAssessment, now: &DateTime<Tz>) -> bool {
    whole_days_between(&assessment.created_at, now) >= EPDS_VALIDITY_DAYS
}

/// Score to display, or `None` when the card should invite a new assessment.
pub fn epds_score_to_show<Tz: TimeZone>(
    latest: Option<&EpdsAssessment>,
    now: &DateTime<Tz>,
) -> Option<u32> {
    let assessment = latest?;
    if is_assessment_stale(assessment, now) {
        return None;
    }
    Some(assessment.total_score)
}

pub fn epds_card<Tz: TimeZone>(latest: Option<&EpdsAssessment>, now: &DateTime<Tz>) -> EpdsCard {
    match epds_score_to_show(latest, now) {
        Some(total_score) => EpdsCard::Score { total_score },
        None => EpdsCard::StartAssessment,
    }
}

// ---------------------------------------------------------------------------
// Mood rules
// ---------------------------------------------------------------------------

/// Business rule: a check-in counts for today only on the same calendar day.
pub fn has_checked_in_today<Tz: TimeZone>(latest: Option<&DailyCheckIn>, now: &DateTime<Tz>) -> bool {
    latest.is_some_and(|c| is_same_calendar_day(&c.created_at, now))
}

pub fn mood_card<Tz: TimeZone>(latest: Option<&DailyCheckIn>, now: &DateTime<Tz>) -> MoodCard {
    match latest {
        Some(checkin) if has_checked_in_today(Some(checkin), now) => MoodCard::CheckedIn {
            label: checkin
                .mood_name()
                .unwrap_or(CHECKED_IN_FALLBACK_LABEL)
                .to_string(),
            icon: checkin.mood_name().map(|m| emotion::icon_for(m).to_string()),
        },
        _ => MoodCard::CheckIn,
    }
}

/// Presentation rule: the mood card starts flipped (showing the emotion)
/// when the latest check-in counts for today, has an emotion and is under
/// 24 elapsed hours old.
pub fn mood_card_initially_flipped<Tz: TimeZone>(
    latest: Option<&DailyCheckIn>,
    now: &DateTime<Tz>,
) -> bool {
    latest.is_some_and(|c| {
        c.selected_emotion.is_some()
            && is_same_calendar_day(&c.created_at, now)
            && whole_hours_between(&c.created_at, now) < MOOD_CARD_FLIP_HOURS
    })
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

pub fn snapshot<Tz: TimeZone>(
    latest_assessment: Option<&EpdsAssessment>,
    latest_checkin: Option<&DailyCheckIn>,
    now: &DateTime<Tz>,
) -> EligibilitySnapshot {
    let epds = epds_card(latest_assessment, now);
    let epds_card_flipped = matches!(epds, EpdsCard::Score { .. });
    EligibilitySnapshot {
        epds,
        mood: mood_card(latest_checkin, now),
        epds_card_flipped,
        mood_card_flipped: mood_card_initially_flipped(latest_checkin, now),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
