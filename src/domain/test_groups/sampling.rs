use rand::Rng;

pub const PROBABILITY_TOTAL: u32 = 100;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SamplingError {
    #[error("configuration has no test groups")]
    NoGroups,
    #[error("the sum of all group probabilities should be 100, got {0}")]
    InvalidTotal(u32),
}

pub fn probability_total<I: IntoIterator<Item = u8>>(probabilities: I) -> u32 {
    probabilities.into_iter().map(u32::from).sum()
}

/// Picks the first item whose cumulative probability exceeds `roll` (0..100).
pub fn pick_by_roll<'a, T, F>(items: &'a [T], probability: F, roll: u32) -> Result<&'a T, SamplingError>
where
    F: Fn(&T) -> u8,
{
    if items.is_empty() {
        return Err(SamplingError::NoGroups);
    }
    let total = probability_total(items.iter().map(&probability));
    if total != PROBABILITY_TOTAL {
        return Err(SamplingError::InvalidTotal(total));
    }
    let mut cumulative = 0u32;
    for item in items {
        cumulative += u32::from(probability(item));
        if roll < cumulative {
            return Ok(item);
        }
    }
    Err(SamplingError::InvalidTotal(total))
}

pub fn sample<'a, T, F, R>(items: &'a [T], probability: F, rng: &mut R) -> Result<&'a T, SamplingError>
where
    F: Fn(&T) -> u8,
    R: Rng + ?Sized,
{
    let roll = rng.gen_range(0..PROBABILITY_TOTAL);
    pick_by_roll(items, probability, roll)
}
