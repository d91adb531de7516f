/// Move a ring cursor one item back, wrapping to the last item.
pub fn ring_prev(selected: usize, item_count: usize) -> usize {
    if item_count == 0 {
        return 0;
    }
    if selected == 0 {
        item_count - 1
    } else {
        (selected - 1).min(item_count - 1)
    }
}

/// Move a ring cursor one item forward, wrapping to the first item.
pub fn ring_next(selected: usize, item_count: usize) -> usize {
    if item_count == 0 {
        return 0;
    }
    (selected + 1) % item_count
}

/// Step a grid index by one, clamped to `0..len`.
pub fn step_clamped(index: u8, forward: bool, len: usize) -> u8 {
    if forward {
        if (index as usize) + 1 < len {
            index + 1
        } else {
            index
        }
    } else {
        index.saturating_sub(1)
    }
}
