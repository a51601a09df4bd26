//! Partitioning rows into insertion chunks.

/// Number of partitions for `len` rows with roughly `chunk_size` rows each
/// (never zero).
pub fn partition_count(len: usize, chunk_size: usize) -> usize {
    (len / chunk_size.max(1)).max(1)
}

/// Split `items` into `sections` contiguous slices whose lengths differ by at
/// most one; the longer slices come first.
pub fn array_split<T>(items: &[T], sections: usize) -> Vec<&[T]> {
    let sections = sections.max(1);
    let base = items.len() / sections;
    let extra = items.len() % sections;

    let mut out = Vec::with_capacity(sections);
    let mut start = 0;
    for i in 0..sections {
        let len = base + usize::from(i < extra);
        out.push(&items[start..start + len]);
        start += len;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partition_count() {
        assert_eq!(partition_count(0, 10), 1);
        assert_eq!(partition_count(9, 10), 1);
        assert_eq!(partition_count(25, 10), 2);
        assert_eq!(partition_count(100, 10), 10);
    }

    #[test]
    fn test_array_split_uneven() {
        let rows: Vec<u32> = (0..25).collect();
        let parts = array_split(&rows, 2);
        assert_eq!(parts.iter().map(|p| p.len()).collect::<Vec<_>>(), vec![13, 12]);
        assert_eq!(parts[1][0], 13);

        let parts = array_split(&rows[..7], 3);
        assert_eq!(parts.iter().map(|p| p.len()).collect::<Vec<_>>(), vec![3, 2, 2]);
    }

    #[test]
    fn test_array_split_keeps_every_row_in_order() {
        let rows: Vec<u32> = (0..103).collect();
        let joined: Vec<u32> = array_split(&rows, partition_count(rows.len(), 10))
            .into_iter()
            .flatten()
            .copied()
            .collect();
        assert_eq!(joined, rows);
    }
}
