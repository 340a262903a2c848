// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Insight rule tables.
//!
//! Each table is an ordered list of rules evaluated top to bottom; the first
//! rule whose predicate holds supplies the insight. Predicates treat a
//! missing metric as "does not match".

use crate::models::{Insight, RecoveryBand};

/// Sleep efficiency below this percentage triggers the efficiency insight.
pub const SLEEP_EFFICIENCY_THRESHOLD: f64 = 85.0;
/// Sleep consistency below this percentage triggers the consistency insight.
pub const SLEEP_CONSISTENCY_THRESHOLD: f64 = 70.0;
/// Sleep performance below this percentage triggers the duration insight.
pub const SLEEP_PERFORMANCE_THRESHOLD: f64 = 70.0;

/// One row of a rule table.
pub struct Rule<I> {
    pub insight: Insight,
    pub applies: fn(&I) -> bool,
}

/// First matching rule's insight, or `fallback`.
pub fn select<I>(rules: &[Rule<I>], input: &I, fallback: Insight) -> Insight {
    rules
        .iter()
        .find(|rule| (rule.applies)(input))
        .map(|rule| rule.insight)
        .unwrap_or(fallback)
}

fn below(value: Option<f64>, threshold: f64) -> bool {
    value.is_some_and(|v| v < threshold)
}

// ─── Sleep ───────────────────────────────────────────────────

/// Metrics the sleep rules look at.
#[derive(Debug, Clone, Copy, Default)]
pub struct SleepSignals {
    pub performance_pct: Option<f64>,
    pub efficiency_pct: Option<f64>,
    pub consistency_pct: Option<f64>,
}

pub const SLEEP_DEFAULT: Insight = Insight {
    key: "default",
    text: "Sleep is on track. Keep a steady bedtime to hold your performance.",
};

pub const SLEEP_RULES: &[Rule<SleepSignals>] = &[
    Rule {
        insight: Insight {
            key: "no_data",
            text: "No scored sleep was recorded for this day. Wear the strap overnight to get sleep insights.",
        },
        applies: |s| s.performance_pct.is_none() && s.efficiency_pct.is_none(),
    },
    Rule {
        insight: Insight {
            key: "efficiency",
            text: "Sleep efficiency was low: a lot of time in bed was spent awake. Limit screens and caffeine before bed and keep the room cool and dark.",
        },
        applies: |s| below(s.efficiency_pct, SLEEP_EFFICIENCY_THRESHOLD),
    },
    Rule {
        insight: Insight {
            key: "consistency",
            text: "Sleep timing was irregular. Going to bed and waking at consistent times improves recovery.",
        },
        applies: |s| below(s.consistency_pct, SLEEP_CONSISTENCY_THRESHOLD),
    },
    Rule {
        insight: Insight {
            key: "duration",
            text: "You slept well short of what your body needed. Plan an earlier bedtime tonight.",
        },
        applies: |s| below(s.performance_pct, SLEEP_PERFORMANCE_THRESHOLD),
    },
];

pub fn sleep_insight(signals: &SleepSignals) -> Insight {
    select(SLEEP_RULES, signals, SLEEP_DEFAULT)
}

// ─── Recovery ────────────────────────────────────────────────

/// Metrics the recovery rules look at.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecoverySignals {
    pub score: Option<f64>,
}

impl RecoverySignals {
    fn band(&self) -> Option<RecoveryBand> {
        self.score.map(RecoveryBand::from_score)
    }
}

pub const RECOVERY_NO_DATA: Insight = Insight {
    key: "no_data",
    text: "No recovery score is available for this day yet. Recovery is calculated after your main sleep.",
};

pub const RECOVERY_RULES: &[Rule<RecoverySignals>] = &[
    Rule {
        insight: RECOVERY_NO_DATA,
        applies: |s| s.score.is_none(),
    },
    Rule {
        insight: Insight {
            key: "red",
            text: "Red recovery: your body is under strain. Prioritize rest, hydration and an early night over hard training.",
        },
        applies: |s| s.band() == Some(RecoveryBand::Red),
    },
    Rule {
        insight: Insight {
            key: "yellow",
            text: "Yellow recovery: you are maintaining. Moderate training is fine; save maximal efforts for a greener day.",
        },
        applies: |s| s.band() == Some(RecoveryBand::Yellow),
    },
    Rule {
        insight: Insight {
            key: "green",
            text: "Green recovery: you are ready to perform. A good day to push intensity.",
        },
        applies: |s| s.band() == Some(RecoveryBand::Green),
    },
];

pub fn recovery_insight(signals: &RecoverySignals) -> Insight {
    select(RECOVERY_RULES, signals, RECOVERY_NO_DATA)
}
