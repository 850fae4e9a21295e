use rand::Rng;

// Home sides average more goals than away sides; the split of the two
// coefficients is the whole home advantage in this model.
pub const HOME_GOAL_COEF: f64 = 2.0;
pub const AWAY_GOAL_COEF: f64 = 1.8;

/// Expected goals for each side before any randomness.
pub fn expected_goals(home_strength: u32, away_strength: u32) -> (f64, f64) {
    let total = home_strength as f64 + away_strength as f64;
    if total <= 0.0 {
        return (0.0, 0.0);
    }
    (
        home_strength as f64 / total * HOME_GOAL_COEF,
        away_strength as f64 / total * AWAY_GOAL_COEF,
    )
}

pub fn simulate_match(home_strength: u32, away_strength: u32, rng: &mut impl Rng) -> (u32, u32) {
    let (expected_home, expected_away) = expected_goals(home_strength, away_strength);
    let home = simulate_goals(expected_home, rng);
    let away = simulate_goals(expected_away, rng);
    (home, away)
}

pub fn simulate_goals(expected: f64, rng: &mut impl Rng) -> u32 {
    let p = rng.gen_range(0.0..1.0);
    goals_for_draw(expected, p, rng)
}

fn goals_for_draw(expected: f64, p: f64, rng: &mut impl Rng) -> u32 {
    let base = expected.max(0.0).floor() as u32;
    if p < 0.40 {
        base
    } else if p < 0.65 {
        base + 1
    } else if p < 0.80 {
        base + 2
    } else if p < 0.90 {
        base + 3
    } else {
        // Upset tail.
        base + rng.gen_range(0..=4)
    }
}
