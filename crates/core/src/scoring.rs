//! Scoring module - line clear, T-Spin, combo and Perfect Clear rules
//!
//! Rules in brief:
//! - Clear points come from the line table, the Tetris values or the T-Spin
//!   tables, then get multiplied by the level in effect before the clear.
//! - Back-to-back (a prior Tetris or T-Spin clear with no ordinary clear in
//!   between) upgrades a Tetris to 1200 and multiplies T-Spin points by 3/2.
//! - Combo bonus is `combo * 50 * level`, using the combo count before this
//!   clear.
//! - Perfect Clear bonus is flat and added last.

use serde::{Deserialize, Serialize};

use crate::types::{
    TSpinKind, B2B_DENOMINATOR, B2B_NUMERATOR, BASE_DROP_MS, COMBO_BASE,
    DROP_INTERVAL_MIN_MS, DROP_SPEEDUP_PER_LEVEL_MS, HARD_DROP_POINTS, LINES_PER_LEVEL,
    LINE_SCORES, PERFECT_CLEAR_BONUS, PERFECT_CLEAR_BONUS_FALLBACK, SOFT_DROP_POINTS,
    TETRIS_B2B_POINTS, TETRIS_POINTS, TSPIN_MINI_SCORES, TSPIN_SCORES,
};

/// Score calculation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    /// Table points after the back-to-back adjustment, before the level.
    pub base_points: u32,
    /// `base_points * level`.
    pub line_clear_score: u32,
    /// Combo bonus added on top of `line_clear_score`.
    pub combo_bonus: u32,
    /// Flat Perfect Clear bonus (0 when the board is not empty).
    pub perfect_clear_bonus: u32,
    pub total: u32,
    /// Whether this clear keeps (or starts) a back-to-back chain.
    pub qualifies_for_b2b: bool,
    /// Whether a back-to-back bonus was applied to this clear.
    pub b2b_applied: bool,
}

/// Calculate line clear base points (no level)
pub fn calculate_line_points(lines: u32, back_to_back_active: bool) -> u32 {
    match lines {
        4 if back_to_back_active => TETRIS_B2B_POINTS,
        4 => TETRIS_POINTS,
        1..=3 => LINE_SCORES[lines as usize],
        _ => 0,
    }
}

/// Calculate T-Spin base points (no level, no back-to-back)
pub fn calculate_tspin_points(tspin: TSpinKind, lines: u32) -> u32 {
    match (tspin, lines) {
        (TSpinKind::Mini, 1) => TSPIN_MINI_SCORES[0],
        (TSpinKind::Mini, _) => TSPIN_MINI_SCORES[1],
        (TSpinKind::Normal, 1..=3) => TSPIN_SCORES[lines as usize - 1],
        _ => 0,
    }
}

/// Combo bonus for a clear, given the combo count before it
pub fn calculate_combo_bonus(combo: u32, level: u32) -> u32 {
    combo.saturating_mul(COMBO_BASE).saturating_mul(level)
}

/// Flat bonus when a clear empties the board
pub fn perfect_clear_bonus(lines: u32) -> u32 {
    match lines {
        1..=4 => PERFECT_CLEAR_BONUS[lines as usize - 1],
        _ => PERFECT_CLEAR_BONUS_FALLBACK,
    }
}

/// Check if this clear keeps the back-to-back chain going
/// Any T-Spin clear (mini included) or a Tetris qualifies
pub fn qualifies_for_b2b(tspin: TSpinKind, lines: u32) -> bool {
    lines > 0 && (tspin.is_spin() || lines == 4)
}

/// Apply the B2B multiplier (3/2, floored) to a point value.
pub fn apply_b2b_multiplier(points: u32) -> u32 {
    points.saturating_mul(B2B_NUMERATOR) / B2B_DENOMINATOR
}

/// Calculate the complete score for a clearing lock.
///
/// `combo` and `back_to_back` are the counters before this clear; `level`
/// is the level in effect before the cleared lines are counted.
pub fn calculate_score(
    lines: u32,
    level: u32,
    tspin: TSpinKind,
    combo: u32,
    back_to_back: u32,
    perfect_clear: bool,
) -> ScoreResult {
    if lines == 0 {
        return ScoreResult::default();
    }

    let b2b_active = back_to_back > 0;
    let (base_points, b2b_applied) = if tspin.is_spin() {
        let points = calculate_tspin_points(tspin, lines);
        if b2b_active {
            (apply_b2b_multiplier(points), true)
        } else {
            (points, false)
        }
    } else {
        (calculate_line_points(lines, b2b_active), lines == 4 && b2b_active)
    };

    let line_clear_score = base_points.saturating_mul(level);
    let combo_bonus = calculate_combo_bonus(combo, level);
    let perfect_clear_bonus = if perfect_clear {
        perfect_clear_bonus(lines)
    } else {
        0
    };

    ScoreResult {
        base_points,
        line_clear_score,
        combo_bonus,
        perfect_clear_bonus,
        total: line_clear_score
            .saturating_add(combo_bonus)
            .saturating_add(perfect_clear_bonus),
        qualifies_for_b2b: qualifies_for_b2b(tspin, lines),
        b2b_applied,
    }
}

/// Presentation name of a clear, e.g. "Back-to-Back T-Spin Double"
pub fn clear_label(lines: u32, tspin: TSpinKind, b2b_applied: bool) -> String {
    let name = match (tspin, lines) {
        (TSpinKind::Mini, 1) => "T-Spin Mini Single",
        (TSpinKind::Mini, _) => "T-Spin Mini",
        (TSpinKind::Normal, 1) => "T-Spin Single",
        (TSpinKind::Normal, 2) => "T-Spin Double",
        (TSpinKind::Normal, 3) => "T-Spin Triple",
        (TSpinKind::Normal, _) => "T-Spin",
        (TSpinKind::None, 1) => "Single",
        (TSpinKind::None, 2) => "Double",
        (TSpinKind::None, 3) => "Triple",
        (TSpinKind::None, 4) => "Tetris",
        (TSpinKind::None, _) => "",
    };
    if b2b_applied {
        format!("Back-to-Back {}", name)
    } else {
        name.to_string()
    }
}

/// Calculate drop score
/// soft_drop: +1 per cell
/// hard_drop: +2 per cell
pub fn calculate_drop_score(cells: u32, is_hard_drop: bool) -> u32 {
    if is_hard_drop {
        cells.saturating_mul(HARD_DROP_POINTS)
    } else {
        cells.saturating_mul(SOFT_DROP_POINTS)
    }
}

/// Level for a line total: one step every 10 lines above the start level
pub fn calculate_level(total_lines: u32, start_level: u32) -> u32 {
    start_level.saturating_add(total_lines / LINES_PER_LEVEL)
}

/// Get gravity interval for a level (in milliseconds)
pub fn get_drop_interval_ms(level: u32) -> u32 {
    BASE_DROP_MS
        .saturating_sub(level.saturating_mul(DROP_SPEEDUP_PER_LEVEL_MS))
        .max(DROP_INTERVAL_MIN_MS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_points() {
        assert_eq!(calculate_line_points(0, false), 0);
        assert_eq!(calculate_line_points(1, false), 100);
        assert_eq!(calculate_line_points(2, false), 300);
        assert_eq!(calculate_line_points(3, false), 500);
        assert_eq!(calculate_line_points(4, false), 800);
        assert_eq!(calculate_line_points(4, true), 1200);
        // Only Tetrises care about back-to-back.
        assert_eq!(calculate_line_points(2, true), 300);
    }

    #[test]
    fn test_tspin_points() {
        assert_eq!(calculate_tspin_points(TSpinKind::Mini, 1), 200);
        assert_eq!(calculate_tspin_points(TSpinKind::Mini, 2), 400);
        assert_eq!(calculate_tspin_points(TSpinKind::Normal, 1), 800);
        assert_eq!(calculate_tspin_points(TSpinKind::Normal, 2), 1200);
        assert_eq!(calculate_tspin_points(TSpinKind::Normal, 3), 1600);
        assert_eq!(calculate_tspin_points(TSpinKind::Normal, 4), 0);
    }

    #[test]
    fn test_combo_bonus_scales_with_level() {
        assert_eq!(calculate_combo_bonus(0, 5), 0);
        assert_eq!(calculate_combo_bonus(1, 1), 50);
        assert_eq!(calculate_combo_bonus(3, 2), 300);
    }

    #[test]
    fn test_perfect_clear_bonus_table() {
        assert_eq!(perfect_clear_bonus(1), 800);
        assert_eq!(perfect_clear_bonus(2), 1200);
        assert_eq!(perfect_clear_bonus(3), 1800);
        assert_eq!(perfect_clear_bonus(4), 2000);
        assert_eq!(perfect_clear_bonus(5), 3500);
    }

    #[test]
    fn test_b2b_qualification() {
        assert!(qualifies_for_b2b(TSpinKind::None, 4));
        assert!(qualifies_for_b2b(TSpinKind::Normal, 1));
        assert!(qualifies_for_b2b(TSpinKind::Mini, 1));
        assert!(!qualifies_for_b2b(TSpinKind::None, 3));
        assert!(!qualifies_for_b2b(TSpinKind::Normal, 0));
    }

    #[test]
    fn test_b2b_multiplier_floors() {
        assert_eq!(apply_b2b_multiplier(800), 1200);
        assert_eq!(apply_b2b_multiplier(200), 300);
        assert_eq!(apply_b2b_multiplier(1), 1);
    }

    #[test]
    fn test_back_to_back_tspin_single() {
        let result = calculate_score(1, 2, TSpinKind::Normal, 0, 1, false);
        assert_eq!(result.base_points, 1200);
        assert_eq!(result.line_clear_score, 2400);
        assert!(result.b2b_applied);
        assert!(result.qualifies_for_b2b);
    }

    #[test]
    fn test_full_score_calculation() {
        // Triple at level 3 with a running combo of 2.
        let result = calculate_score(3, 3, TSpinKind::None, 2, 0, false);
        assert_eq!(result.line_clear_score, 1500);
        assert_eq!(result.combo_bonus, 300);
        assert_eq!(result.total, 1800);
        assert!(!result.qualifies_for_b2b);

        // Perfect Clear bonus is not level-scaled.
        let result = calculate_score(4, 5, TSpinKind::None, 0, 0, true);
        assert_eq!(result.line_clear_score, 4000);
        assert_eq!(result.perfect_clear_bonus, 2000);
        assert_eq!(result.total, 6000);
    }

    #[test]
    fn test_zero_lines_scores_nothing() {
        assert_eq!(calculate_score(0, 9, TSpinKind::Normal, 4, 2, true), ScoreResult::default());
    }

    #[test]
    fn test_clear_labels() {
        assert_eq!(clear_label(1, TSpinKind::None, false), "Single");
        assert_eq!(clear_label(4, TSpinKind::None, true), "Back-to-Back Tetris");
        assert_eq!(clear_label(2, TSpinKind::Normal, true), "Back-to-Back T-Spin Double");
        assert_eq!(clear_label(1, TSpinKind::Mini, false), "T-Spin Mini Single");
    }

    #[test]
    fn test_drop_scores() {
        assert_eq!(calculate_drop_score(10, false), 10);
        assert_eq!(calculate_drop_score(10, true), 20);
    }

    #[test]
    fn test_level_calculation() {
        assert_eq!(calculate_level(0, 1), 1);
        assert_eq!(calculate_level(9, 1), 1);
        assert_eq!(calculate_level(10, 1), 2);
        assert_eq!(calculate_level(29, 1), 3);
        assert_eq!(calculate_level(25, 5), 7);
    }

    #[test]
    fn test_drop_intervals() {
        assert_eq!(get_drop_interval_ms(1), 950);
        assert_eq!(get_drop_interval_ms(10), 500);
        assert_eq!(get_drop_interval_ms(18), 100);
        assert_eq!(get_drop_interval_ms(40), 100);
    }
}
