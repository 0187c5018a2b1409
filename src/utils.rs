use crate::Complex;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::ops::Add;

/// Sort by key and sum together the values of equal keys.
pub(crate) fn consolidate_vec<K: Ord, V: Add<Output = V>>(mut v: Vec<(K, V)>) -> Vec<(K, V)> {
    v.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));
    v.into_iter().fold(vec![], |mut acc, (key, val)| {
        match acc.pop() {
            Some((last_key, last_val)) if last_key == key => acc.push((last_key, last_val + val)),
            Some(last) => {
                acc.push(last);
                acc.push((key, val));
            }
            None => acc.push((key, val)),
        }
        acc
    })
}

/// Bits of `x` with `-0.0` folded into `0.0`, so equal floats hash equally.
pub(crate) fn canonical_bits(x: f64) -> u64 {
    if x == 0.0 {
        0
    } else {
        x.to_bits()
    }
}

pub(crate) fn hash_complex<H: Hasher>(c: &Complex<f64>, state: &mut H) {
    state.write_u64(canonical_bits(c.re));
    state.write_u64(canonical_bits(c.im));
}

/// Hash of a single value, for combining into order-independent hashes.
pub(crate) fn hash_one<T: Hash + ?Sized>(t: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    t.hash(&mut hasher);
    hasher.finish()
}
