//! Rating protocols for like-style sites.
//!
//! Ratings use a 0-5 scale. A liked item reads back as 5, a disliked one as
//! 1 and an unrated one as 0. A requested rating of 3 or more means "liked".

/// Rating reported for a liked item
pub const LIKED: i64 = 5;

/// Rating reported for a disliked item
pub const DISLIKED: i64 = 1;

/// Requested ratings at or above this mean "like"
pub const LIKE_THRESHOLD: u8 = 3;

/// Requested ratings at or above this (and below [`LIKE_THRESHOLD`]) mean
/// "dislike"; below it means "neutral"
pub const DISLIKE_THRESHOLD: u8 = 1;

/// Single like toggle. Fires `toggle_like` only when the liked state has to
/// flip. Returns whether it fired.
pub fn like<F>(current: i64, requested: u8, toggle_like: F) -> bool
where
    F: FnOnce(),
{
    let want_liked = requested >= LIKE_THRESHOLD;
    let is_liked = current == LIKED;

    if want_liked != is_liked {
        toggle_like();
        true
    } else {
        false
    }
}

/// Like and dislike toggles. Ratings in `[DISLIKE_THRESHOLD, LIKE_THRESHOLD)`
/// ask for a dislike; 0 clears whichever toggle is set.
pub fn like_dislike<L, D>(current: i64, requested: u8, toggle_like: L, toggle_dislike: D) -> bool
where
    L: FnOnce(),
    D: FnOnce(),
{
    if requested >= LIKE_THRESHOLD {
        if current != LIKED {
            toggle_like();
            return true;
        }
    } else if requested >= DISLIKE_THRESHOLD {
        if current != DISLIKED {
            toggle_dislike();
            return true;
        }
    } else if current == LIKED {
        toggle_like();
        return true;
    } else if current == DISLIKED {
        toggle_dislike();
        return true;
    }
    false
}
