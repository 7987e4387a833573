//! Searches over the sorted key arrays of the keyed node shapes.

#[cfg(all(feature = "simd_keys", target_arch = "x86_64", target_feature = "sse2"))]
#[inline]
fn x86_64_sse_find_key(key: u8, keys: &[u8; 16], num_children: usize) -> Option<usize> {
    use std::arch::x86_64::{
        __m128i, _mm_cmpeq_epi8, _mm_loadu_si128, _mm_movemask_epi8, _mm_set1_epi8,
    };

    // SAFETY: sse2 is statically enabled and `keys` is exactly one 128-bit lane.
    let bitfield = unsafe {
        let key_vec = _mm_set1_epi8(key as i8);
        let results = _mm_cmpeq_epi8(key_vec, _mm_loadu_si128(keys.as_ptr() as *const __m128i));
        let mask = (1i32 << num_children) - 1;
        _mm_movemask_epi8(results) & mask
    };
    (bitfield != 0).then(|| bitfield.trailing_zeros() as usize)
}

#[cfg(all(feature = "simd_keys", target_arch = "x86_64", target_feature = "sse2"))]
#[inline]
fn x86_64_sse_seek_insert_pos(key: u8, keys: &[u8; 16], num_children: usize) -> usize {
    use std::arch::x86_64::{
        __m128i, _mm_cmplt_epi8, _mm_loadu_si128, _mm_movemask_epi8, _mm_set1_epi8,
        _mm_xor_si128,
    };

    // SSE2 only has signed byte compares, so both sides get their top bit flipped first.
    // SAFETY: sse2 is statically enabled and `keys` is exactly one 128-bit lane.
    let bitfield = unsafe {
        let flip = _mm_set1_epi8(i8::MIN);
        let key_vec = _mm_set1_epi8((key ^ 0x80) as i8);
        let keys_vec = _mm_xor_si128(_mm_loadu_si128(keys.as_ptr() as *const __m128i), flip);
        let cmp = _mm_cmplt_epi8(key_vec, keys_vec);
        let mask = (1i32 << num_children) - 1;
        _mm_movemask_epi8(cmp) & mask
    };
    if bitfield != 0 {
        bitfield.trailing_zeros() as usize
    } else {
        num_children
    }
}

/// Position of `key` among the first `num_children` entries of `keys`.
pub fn u8_keys_find_key_position<const WIDTH: usize>(
    key: u8,
    keys: &[u8; WIDTH],
    num_children: usize,
) -> Option<usize> {
    #[cfg(all(feature = "simd_keys", target_arch = "x86_64", target_feature = "sse2"))]
    if let Ok(lane) = <&[u8; 16]>::try_from(&keys[..]) {
        return x86_64_sse_find_key(key, lane, num_children);
    }

    // Linear search beats binary search at these widths.
    keys[..num_children].iter().position(|&k| k == key)
}

/// Index of the first key strictly greater than `key`, which is where `key` goes to keep the
/// array sorted.
pub fn u8_keys_find_insert_position<const WIDTH: usize>(
    key: u8,
    keys: &[u8; WIDTH],
    num_children: usize,
) -> usize {
    #[cfg(all(feature = "simd_keys", target_arch = "x86_64", target_feature = "sse2"))]
    if let Ok(lane) = <&[u8; 16]>::try_from(&keys[..]) {
        return x86_64_sse_seek_insert_pos(key, lane, num_children);
    }

    keys[..num_children].partition_point(|&k| k <= key)
}
