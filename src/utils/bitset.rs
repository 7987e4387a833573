use num_traits::PrimInt;

pub trait BitsetTrait: Default {
    fn first_empty(&self) -> Option<usize>;
    fn set(&mut self, pos: usize);
    fn unset(&mut self, pos: usize);
    fn check(&self, pos: usize) -> bool;
    fn clear(&mut self);
    fn is_empty(&self) -> bool;
    fn size(&self) -> usize;
    fn capacity(&self) -> usize;
}

// TODO: SHIFT and STORAGE_WIDTH can be derived from BIT_WIDTH once generic_const_exprs is
// stable.
pub struct Bitset<
    StorageType,
    const BIT_WIDTH: usize,
    const SHIFT: usize,
    const STORAGE_WIDTH: usize,
> where
    StorageType: PrimInt,
{
    bitset: [StorageType; STORAGE_WIDTH],
}

impl<StorageType, const BIT_WIDTH: usize, const SHIFT: usize, const STORAGE_WIDTH: usize>
    Bitset<StorageType, BIT_WIDTH, SHIFT, STORAGE_WIDTH>
where
    StorageType: PrimInt,
{
    pub fn new() -> Self {
        Self {
            bitset: [StorageType::zero(); STORAGE_WIDTH],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.bitset.iter().enumerate().flat_map(|(i, b)| {
            (0..BIT_WIDTH).filter_map(move |j| {
                let bit = (*b >> j) & StorageType::one();
                (!bit.is_zero()).then_some((i << SHIFT) + j)
            })
        })
    }
}

impl<StorageType, const BIT_WIDTH: usize, const SHIFT: usize, const STORAGE_WIDTH: usize>
    BitsetTrait for Bitset<StorageType, BIT_WIDTH, SHIFT, STORAGE_WIDTH>
where
    StorageType: PrimInt,
{
    fn first_empty(&self) -> Option<usize> {
        for (i, b) in self.bitset.iter().enumerate() {
            if b.is_zero() {
                return Some(i << SHIFT);
            }
            if *b != StorageType::max_value() {
                return Some((i << SHIFT) + b.trailing_ones() as usize);
            }
        }
        None
    }

    #[inline]
    fn set(&mut self, pos: usize) {
        assert!(pos < STORAGE_WIDTH * BIT_WIDTH);
        let shift = StorageType::one() << (pos % BIT_WIDTH);
        self.bitset[pos >> SHIFT] = self.bitset[pos >> SHIFT] | shift;
    }

    #[inline]
    fn unset(&mut self, pos: usize) {
        assert!(pos < STORAGE_WIDTH * BIT_WIDTH);
        let shift = StorageType::one() << (pos % BIT_WIDTH);
        self.bitset[pos >> SHIFT] = self.bitset[pos >> SHIFT] & !shift;
    }

    #[inline]
    fn check(&self, pos: usize) -> bool {
        assert!(pos < STORAGE_WIDTH * BIT_WIDTH);
        let shift = StorageType::one() << (pos % BIT_WIDTH);
        !(self.bitset[pos >> SHIFT] & shift).is_zero()
    }

    #[inline]
    fn clear(&mut self) {
        self.bitset.fill(StorageType::zero());
    }

    fn is_empty(&self) -> bool {
        self.bitset.iter().all(|x| x.is_zero())
    }

    fn size(&self) -> usize {
        self.bitset.iter().map(|x| x.count_ones() as usize).sum()
    }

    fn capacity(&self) -> usize {
        STORAGE_WIDTH * BIT_WIDTH
    }
}

impl<StorageType, const BIT_WIDTH: usize, const SHIFT: usize, const STORAGE_WIDTH: usize> Default
    for Bitset<StorageType, BIT_WIDTH, SHIFT, STORAGE_WIDTH>
where
    StorageType: PrimInt,
{
    fn default() -> Self {
        Self::new()
    }
}

pub type Bitset64<const STORAGE_WIDTH_U64: usize> = Bitset<u64, 64, 6, STORAGE_WIDTH_U64>;

#[cfg(test)]
mod tests {
    use crate::utils::bitset::{Bitset64, BitsetTrait};

    #[test]
    fn test_first_free_64s() {
        let mut bs = Bitset64::<1>::new();
        bs.set(1);
        bs.set(3);
        assert_eq!(bs.first_empty(), Some(0));
        bs.set(0);
        assert_eq!(bs.first_empty(), Some(2));

        for i in 0..bs.capacity() {
            bs.set(i);
        }
        assert_eq!(bs.first_empty(), None);
        assert_eq!(bs.size(), 64);

        bs.unset(47);
        assert_eq!(bs.first_empty(), Some(47));
        bs.clear();
        assert!(bs.is_empty());
    }

    #[test]
    fn test_iter_64s() {
        let mut bs = Bitset64::<4>::new();
        for i in [0, 1, 2, 4, 8, 16, 32, 47, 48, 49, 127, 200] {
            bs.set(i);
        }
        let v: Vec<usize> = bs.iter().collect();
        assert_eq!(v, vec![0, 1, 2, 4, 8, 16, 32, 47, 48, 49, 127, 200]);
        assert!(bs.check(200));
        assert!(!bs.check(201));
    }
}
