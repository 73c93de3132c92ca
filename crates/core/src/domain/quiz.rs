//! Next-question selection for the quiz game.
//!
//! The eligible set is computed once and sampled once, so selection always
//! terminates no matter how much of the pool has already been served.

use std::collections::HashSet;

use super::lenient::LenientInt;
use super::question::Question;
use super::DomainError;
use crate::ports::random::RandomSource;

/// Which pool the quiz draws from. Id `0` and `"all"` mean every category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategorySelector {
    All,
    Category(i64),
}

impl CategorySelector {
    pub fn parse(raw: &LenientInt) -> Result<Self, DomainError> {
        if let LenientInt::Text(s) = raw {
            if s.trim().eq_ignore_ascii_case("all") {
                return Ok(CategorySelector::All);
            }
        }
        match raw.value() {
            Some(0) => Ok(CategorySelector::All),
            Some(id) if id > 0 => Ok(CategorySelector::Category(id)),
            _ => Err(DomainError::InvalidCategory(match raw {
                LenientInt::Int(n) => n.to_string(),
                LenientInt::Text(s) => s.clone(),
            })),
        }
    }
}

/// Questions from `pool` whose ids are not in `previous`, in pool order.
pub fn eligible<'a>(pool: &'a [Question], previous: &[i64]) -> Vec<&'a Question> {
    let seen: HashSet<i64> = previous.iter().copied().collect();
    pool.iter().filter(|q| !seen.contains(&q.id)).collect()
}

/// Maps a draw in `[0,1)` onto an index below `len`. `len` must be non-zero.
pub fn index_for(r: f64, len: usize) -> usize {
    let r = if r.is_finite() { r.clamp(0.0, 1.0) } else { 0.0 };
    ((r * len as f64) as usize).min(len - 1)
}

/// Picks one unseen question uniformly at random.
///
/// Returns `None` once every pool question is in `previous`; that is the
/// normal end of a quiz round, not an error.
pub async fn select_next(
    pool: &[Question],
    previous: &[i64],
    rng: &dyn RandomSource,
) -> Option<Question> {
    let candidates = eligible(pool, previous);
    if candidates.is_empty() {
        return None;
    }
    let r = rng.next_f64().await;
    Some(candidates[index_for(r, candidates.len())].clone())
}
