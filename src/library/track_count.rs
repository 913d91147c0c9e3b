//! Per-disc track counts.
//!
//! Tag "track total" values are unreliable across rips, so the count is
//! derived from what is actually on disk: tracks sharing album artist, album
//! title and disc number form one disc, and each gets the size of its disc.

use std::collections::HashMap;

use crate::model::Track;

fn disc_key(track: &Track) -> (&str, &str, u32) {
    (
        track.album_artist.as_str(),
        track.album_title.as_str(),
        track.disc_number,
    )
}

/// Set every track's `track_count` to the number of tracks on its
/// (album artist, album title, disc number) group. Input order does not matter.
pub fn fill_track_counts(tracks: &mut [Track]) {
    let counts: Vec<u32> = {
        let mut per_disc: HashMap<(&str, &str, u32), u32> = HashMap::new();
        for track in tracks.iter() {
            *per_disc.entry(disc_key(track)).or_default() += 1;
        }
        tracks.iter().map(|t| per_disc[&disc_key(t)]).collect()
    };

    for (track, count) in tracks.iter_mut().zip(counts) {
        track.track_count = count;
    }
}
