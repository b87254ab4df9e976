use rand::Rng;

/// Normalize `num` to 0..1 within `min..max`, clamping out-of-range input.
pub fn scale(num: f64, min: f64, max: f64) -> f64 {
    if num < min {
        return 0.0;
    }
    if num > max {
        return 1.0;
    }
    (num - min) / (max - min)
}

/// Re-map `num` from `min_num..max_num` into `min_out..max_out`.
///
/// Clamping happens in normalized space first (via [`scale`]), so inputs
/// outside the source range land exactly on the output edges.
pub fn remap(num: f64, min_num: f64, max_num: f64, min_out: f64, max_out: f64) -> f64 {
    let range = max_out - min_out;

    scale(num, min_num, max_num) * range + min_out
}

/// Deterministic unit-interval value derived from a seed.
///
/// Characters carry a fixed `seed`; renderers use this to derive stable
/// per-character layout jitter without the engine storing more fields.
pub fn seeded_unit(seed: f64) -> f64 {
    let x = seed.sin() * 10_000.0;

    x - x.floor()
}

/// Pick a random element from a slice, or None if it is empty.
pub fn pick<'a, T, R: Rng>(rng: &mut R, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    Some(&items[rng.gen_range(0..items.len())])
}
